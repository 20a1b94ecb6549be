// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, or an in-process store for development).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{ParkingSpot, ProfilePatch, User};
use crate::services::filter::SpotFilter;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PARKING_SPOTS: &str = "parking_spots";
}

/// Store handle shared by all handlers.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Google subject id.
    pub async fn get_user(&self, google_id: &str) -> Result<Option<User>, AppError> {
        match self {
            Db::Firestore(db) => db.get_user(google_id).await,
            Db::Memory(db) => db.get_user(google_id).await,
        }
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.upsert_user(user).await,
            Db::Memory(db) => db.upsert_user(user).await,
        }
    }

    /// Apply a partial profile update atomically and return the merged user.
    pub async fn update_profile(
        &self,
        google_id: &str,
        patch: ProfilePatch,
    ) -> Result<User, AppError> {
        match self {
            Db::Firestore(db) => db.update_profile(google_id, patch).await,
            Db::Memory(db) => db.update_profile(google_id, patch).await,
        }
    }

    // ─── Parking Spot Operations ─────────────────────────────────

    pub async fn get_spot(&self, spot_id: &str) -> Result<Option<ParkingSpot>, AppError> {
        match self {
            Db::Firestore(db) => db.get_spot(spot_id).await,
            Db::Memory(db) => db.get_spot(spot_id).await,
        }
    }

    /// Spots satisfying every constraint in `filter`, ordered by ID.
    pub async fn find_spots(&self, filter: &SpotFilter) -> Result<Vec<ParkingSpot>, AppError> {
        match self {
            Db::Firestore(db) => db.find_spots(filter).await,
            Db::Memory(db) => db.find_spots(filter).await,
        }
    }

    /// The full catalog, ordered by ID.
    pub async fn list_spots(&self) -> Result<Vec<ParkingSpot>, AppError> {
        self.find_spots(&SpotFilter::default()).await
    }

    pub async fn set_spot(&self, spot: &ParkingSpot) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.set_spot(spot).await,
            Db::Memory(db) => db.set_spot(spot).await,
        }
    }
}
