// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus Parking API Server
//!
//! Serves the parking spot catalog, Google sign-in and student profiles.

use campus_parking::{
    config::{Config, StoreBackend},
    db::{Db, FirestoreDb, MemoryDb},
    services::{seed, GoogleOAuthClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        store = ?config.store_backend,
        "Starting Campus Parking API"
    );

    let db = match config.store_backend {
        StoreBackend::Firestore => Db::Firestore(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-process store; data is lost on restart");
            Db::Memory(MemoryDb::new())
        }
    };

    // Malformed seed data aborts startup
    if let Some(path) = &config.seed_spots_path {
        tracing::info!(path = %path.display(), "Loading seed parking spots");
        let spots = seed::load_spots_from_file(path)?;
        seed::seed_spots(&db, &spots).await?;
    }

    let oauth = GoogleOAuthClient::new(&config)?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        oauth,
    });

    // Build router
    let app = campus_parking::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("campus_parking=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
