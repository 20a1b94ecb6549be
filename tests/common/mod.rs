// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::Response;
use campus_parking::config::Config;
use campus_parking::db::{Db, FirestoreDb, MemoryDb};
use campus_parking::models::{ParkingSpot, User};
use campus_parking::routes::create_router;
use campus_parking::services::GoogleOAuthClient;
use campus_parking::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
pub fn spot(id: &str, name: Option<&str>, campus: &str, kind: &str, cost: f64) -> ParkingSpot {
    ParkingSpot {
        id: id.to_string(),
        name: name.map(str::to_string),
        campus_location: campus.to_string(),
        parking_type: kind.to_string(),
        cost,
        latitude: None,
        longitude: None,
    }
}

/// Catalog loaded into every test app.
#[allow(dead_code)]
pub fn test_catalog() -> Vec<ParkingSpot> {
    vec![
        spot("spot-1", Some("North Lot A"), "North", "lot", 5.0),
        spot("spot-2", Some("North Garage"), "North", "garage", 10.0),
        spot("spot-3", Some("South Lot"), "South", "lot", 3.0),
        spot("spot-4", Some("South Garage"), "South", "garage", 7.5),
        spot("spot-5", None, "East", "street", 0.0),
    ]
}

/// User with an incomplete profile.
#[allow(dead_code)]
pub fn test_user(google_id: &str) -> User {
    User {
        google_id: google_id.to_string(),
        email: format!("{}@example.edu", google_id),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        profile_pic: None,
        major: None,
        grade_level: None,
        graduation_year: None,
        housing_type: None,
        preferred_parking_types: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        last_login: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// Create a test app over a seeded in-process store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let memory = MemoryDb::new();
    let db = Db::Memory(memory);
    for spot in test_catalog() {
        db.set_spot(&spot).await.unwrap();
    }

    let oauth = GoogleOAuthClient::new(&config).unwrap();
    let state = Arc::new(AppState { config, db, oauth });

    (create_router(state.clone()), state)
}

/// The in-process store behind a test app.
#[allow(dead_code)]
pub fn memory_db(state: &AppState) -> &MemoryDb {
    match &state.db {
        Db::Memory(db) => db,
        Db::Firestore(_) => panic!("test app must use the in-process store"),
    }
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(google_id: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: google_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Session cookie header value for `google_id`.
#[allow(dead_code)]
pub fn session_cookie_header(google_id: &str, state: &AppState) -> String {
    format!(
        "campus_parking_session={}",
        create_test_jwt(google_id, &state.config.session_signing_key)
    )
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// IDs of the spots in a `{status, count, data}` response body.
#[allow(dead_code)]
pub fn spot_ids(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect()
}
