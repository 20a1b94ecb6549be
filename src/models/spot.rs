// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parking spot model for storage and API.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A parking spot in the `parking_spots` collection.
///
/// Serialized as-is for API responses (the flat "SpotDict" shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ParkingSpot {
    /// Spot ID (also used as document ID)
    pub id: String,
    /// Display name (e.g. "Fourth Street Ramp")
    #[serde(default)]
    pub name: Option<String>,
    /// Campus area (e.g. "East Bank")
    pub campus_location: String,
    /// "garage", "lot", "street", ...
    pub parking_type: String,
    /// Dollars per hour
    pub cost: f64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Request body for creating a spot; also the shape of seed file entries.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewParkingSpot {
    /// Required in seed files. The API ignores it and assigns a fresh one.
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub campus_location: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub parking_type: String,
    #[validate(custom(function = "valid_cost"))]
    pub cost: f64,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl NewParkingSpot {
    /// Build the stored record, trimming categorical fields.
    pub fn into_spot(self, id: String) -> ParkingSpot {
        ParkingSpot {
            id,
            name: self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            campus_location: self.campus_location.trim().to_string(),
            parking_type: self.parking_type.trim().to_string(),
            cost: self.cost,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn valid_cost(cost: f64) -> Result<(), ValidationError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(ValidationError::new("cost_must_be_non_negative"));
    }
    Ok(())
}
