// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Mirrors the Firestore document model: one map per collection, keyed by
//! document ID. Each entry is guarded by its shard lock, so a profile update
//! is atomic with respect to other writers of the same user.

use crate::error::AppError;
use crate::models::{ParkingSpot, ProfilePatch, User};
use crate::services::filter::SpotFilter;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    users: DashMap<String, User>,
    spots: DashMap<String, ParkingSpot>,
    /// When set, every write fails at its commit point.
    fail_writes: AtomicBool,
    /// When set, every read fails before touching the maps.
    fail_reads: AtomicBool,
}

/// In-memory database; clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a store outage: while enabled, all writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Simulate a store outage: while enabled, all reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_readable(&self) -> Result<(), AppError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "Read rejected: store unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "Write rejected: store unavailable".to_string(),
            ));
        }
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, google_id: &str) -> Result<Option<User>, AppError> {
        self.check_readable()?;
        Ok(self.inner.users.get(google_id).map(|u| u.clone()))
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.check_writable()?;
        self.inner
            .users
            .insert(user.google_id.clone(), user.clone());
        Ok(())
    }

    pub async fn update_profile(
        &self,
        google_id: &str,
        patch: ProfilePatch,
    ) -> Result<User, AppError> {
        self.check_readable()?;
        let mut entry = self
            .inner
            .users
            .get_mut(google_id)
            .ok_or_else(|| AppError::NotFound(format!("User {}", google_id)))?;

        // Build the merged record on the side; the stored one is replaced
        // only once the commit succeeds.
        let mut updated = entry.clone();
        updated.apply_patch(patch);

        self.check_writable()?;
        *entry = updated.clone();
        Ok(updated)
    }

    // ─── Parking Spot Operations ─────────────────────────────────

    pub async fn get_spot(&self, spot_id: &str) -> Result<Option<ParkingSpot>, AppError> {
        self.check_readable()?;
        Ok(self.inner.spots.get(spot_id).map(|s| s.clone()))
    }

    pub async fn find_spots(&self, filter: &SpotFilter) -> Result<Vec<ParkingSpot>, AppError> {
        self.check_readable()?;
        let mut spots: Vec<ParkingSpot> = self
            .inner
            .spots
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        spots.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(spots)
    }

    pub async fn set_spot(&self, spot: &ParkingSpot) -> Result<(), AppError> {
        self.check_writable()?;
        self.inner.spots.insert(spot.id.clone(), spot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            google_id: id.to_string(),
            email: format!("{}@example.edu", id),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            profile_pic: None,
            major: Some("Biology".to_string()),
            grade_level: None,
            graduation_year: Some(2027),
            housing_type: None,
            preferred_parking_types: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            last_login: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_profile_merges_fields() {
        let db = MemoryDb::new();
        db.upsert_user(&user("u1")).await.unwrap();

        let patch: ProfilePatch = serde_json::from_str(r#"{"grade_level": "Senior"}"#).unwrap();
        let updated = db.update_profile("u1", patch).await.unwrap();

        assert_eq!(updated.grade_level.as_deref(), Some("Senior"));
        assert_eq!(updated.major.as_deref(), Some("Biology"));
        assert_eq!(db.get_user("u1").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_record_untouched() {
        let db = MemoryDb::new();
        let original = user("u1");
        db.upsert_user(&original).await.unwrap();

        db.set_fail_writes(true);
        let patch: ProfilePatch =
            serde_json::from_str(r#"{"major": "Chemistry", "graduation_year": 2030}"#).unwrap();
        let err = db.update_profile("u1", patch).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        db.set_fail_writes(false);
        assert_eq!(db.get_user("u1").await.unwrap(), Some(original));
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let db = MemoryDb::new();
        let err = db
            .update_profile("missing", ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_reads_report_database_error() {
        let db = MemoryDb::new();
        db.upsert_user(&user("u1")).await.unwrap();

        db.set_fail_reads(true);
        assert!(matches!(
            db.get_user("u1").await,
            Err(AppError::Database(_))
        ));
        assert!(matches!(
            db.find_spots(&SpotFilter::default()).await,
            Err(AppError::Database(_))
        ));
        assert!(matches!(
            db.get_spot("any").await,
            Err(AppError::Database(_))
        ));

        db.set_fail_reads(false);
        assert!(db.get_user("u1").await.unwrap().is_some());
    }
}
