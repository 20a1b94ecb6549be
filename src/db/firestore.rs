// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, keyed by Google subject id)
//! - Parking spots (catalog, keyed by spot id)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ParkingSpot, ProfilePatch, User};
use crate::services::filter::SpotFilter;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Google subject id.
    pub async fn get_user(&self, google_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(google_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.google_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically apply a partial profile update and return the merged record.
    ///
    /// The merged document is written in a single transaction; on any failure
    /// before commit the transaction is rolled back and the stored record is
    /// left as it was.
    pub async fn update_profile(
        &self,
        google_id: &str,
        patch: ProfilePatch,
    ) -> Result<User, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<User> = match client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(google_id)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(AppError::Database(format!(
                    "Failed to read user in transaction: {}",
                    e
                )));
            }
        };

        let Some(mut user) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("User {}", google_id)));
        };

        user.apply_patch(patch);

        if let Err(e) = client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(google_id)
            .object(&user)
            .add_to_transaction(&mut transaction)
        {
            let _ = transaction.rollback().await;
            return Err(AppError::Database(format!(
                "Failed to add user to transaction: {}",
                e
            )));
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(user)
    }

    // ─── Parking Spot Operations ─────────────────────────────────

    /// Get a spot by ID.
    pub async fn get_spot(&self, spot_id: &str) -> Result<Option<ParkingSpot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PARKING_SPOTS)
            .obj()
            .one(spot_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get spots matching every constraint in `filter`, ordered by ID.
    ///
    /// Constraints are pushed down to Firestore. Equality filters alone are
    /// served by single-field indexes, but either equality filter combined
    /// with the `cost` range needs a composite index; those are declared in
    /// `firestore.indexes.json` and must be deployed with the database.
    /// Sorting by ID happens here, so no index covers `id` ordering.
    pub async fn find_spots(&self, filter: &SpotFilter) -> Result<Vec<ParkingSpot>, AppError> {
        let campus = filter.campus_location.clone();
        let parking_type = filter.parking_type.clone();
        let max_cost = filter.max_cost;

        let mut spots: Vec<ParkingSpot> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PARKING_SPOTS)
            .filter(move |q| {
                q.for_all([
                    campus
                        .clone()
                        .and_then(|c| q.field("campus_location").eq(c)),
                    parking_type
                        .clone()
                        .and_then(|t| q.field("parking_type").eq(t)),
                    max_cost.and_then(|m| q.field("cost").less_than_or_equal(m)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        spots.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(spots)
    }

    /// Store a spot (overwrites an existing document with the same ID).
    pub async fn set_spot(&self, spot: &ParkingSpot) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PARKING_SPOTS)
            .document_id(&spot.id)
            .object(spot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
