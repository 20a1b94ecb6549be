// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parking spot filter construction and matching.

use crate::error::AppError;
use crate::models::ParkingSpot;
use serde::Deserialize;

/// Raw query parameters for `/api/parking-spots/filter`.
///
/// Everything is taken as a string so malformed numbers surface as
/// `InvalidArgument` rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub campus: Option<String>,
    #[serde(rename = "type")]
    pub parking_type: Option<String>,
    pub max_cost: Option<String>,
}

/// Conjunction of optional constraints over parking spots.
///
/// An absent constraint matches everything, so the default filter selects
/// the whole catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotFilter {
    /// Exact match on `campus_location`
    pub campus_location: Option<String>,
    /// Exact match on `parking_type`
    pub parking_type: Option<String>,
    /// Inclusive upper bound on `cost`
    pub max_cost: Option<f64>,
}

/// Treat empty or whitespace-only parameters as absent.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl TryFrom<FilterParams> for SpotFilter {
    type Error = AppError;

    fn try_from(params: FilterParams) -> Result<Self, Self::Error> {
        let max_cost = non_empty(params.max_cost.as_deref())
            .map(|raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|cost| cost.is_finite())
                    .ok_or_else(|| {
                        AppError::InvalidArgument(format!(
                            "'max_cost' must be a number, got '{}'",
                            raw
                        ))
                    })
            })
            .transpose()?;

        Ok(Self {
            campus_location: non_empty(params.campus.as_deref()).map(str::to_string),
            parking_type: non_empty(params.parking_type.as_deref()).map(str::to_string),
            max_cost,
        })
    }
}

impl SpotFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.campus_location.is_none() && self.parking_type.is_none() && self.max_cost.is_none()
    }

    /// Whether `spot` satisfies every supplied constraint.
    pub fn matches(&self, spot: &ParkingSpot) -> bool {
        self.campus_location
            .as_deref()
            .map_or(true, |campus| spot.campus_location == campus)
            && self
                .parking_type
                .as_deref()
                .map_or(true, |kind| spot.parking_type == kind)
            && self.max_cost.map_or(true, |max| spot.cost <= max)
    }
}
