// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parking spot catalog loading from a JSON seed file.

use crate::db::Db;
use crate::error::AppError;
use crate::models::{NewParkingSpot, ParkingSpot};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use validator::Validate;

/// Parse and validate seed spots from a file.
pub fn load_spots_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<ParkingSpot>, SeedError> {
    let json_data =
        fs::read_to_string(path.as_ref()).map_err(|e| SeedError::IoError(e.to_string()))?;
    load_spots_from_json(&json_data)
}

/// Parse and validate seed spots from a JSON array.
///
/// Every entry must carry a unique ID so reseeding on each boot finds
/// the spots it inserted last time.
pub fn load_spots_from_json(json_data: &str) -> Result<Vec<ParkingSpot>, SeedError> {
    let entries: Vec<NewParkingSpot> =
        serde_json::from_str(json_data).map_err(|e| SeedError::ParseError(e.to_string()))?;

    let mut seen = HashSet::new();
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .validate()
                .map_err(|e| SeedError::InvalidEntry(index, e.to_string()))?;
            let id = entry
                .id
                .clone()
                .ok_or_else(|| SeedError::InvalidEntry(index, "missing id".to_string()))?;
            if !seen.insert(id.clone()) {
                return Err(SeedError::InvalidEntry(index, format!("duplicate id {}", id)));
            }
            Ok(entry.into_spot(id))
        })
        .collect()
}

/// Insert each spot whose ID is not already in the store.
///
/// Returns the number of spots inserted.
pub async fn seed_spots(db: &Db, spots: &[ParkingSpot]) -> Result<usize, AppError> {
    let mut inserted = 0;
    for spot in spots {
        if db.get_spot(&spot.id).await?.is_some() {
            tracing::debug!(spot_id = %spot.id, "Seed spot already present, skipping");
            continue;
        }
        db.set_spot(spot).await?;
        inserted += 1;
    }

    tracing::info!(total = spots.len(), inserted, "Seeded parking spots");
    Ok(inserted)
}

/// Errors from seed loading.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse seed JSON: {0}")]
    ParseError(String),

    #[error("Invalid seed entry at index {0}: {1}")]
    InvalidEntry(usize, String),
}
