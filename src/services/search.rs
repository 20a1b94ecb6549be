// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Free-text search over the parking spot catalog.

use crate::models::ParkingSpot;

/// Longest accepted query, in bytes.
pub const MAX_QUERY_LEN: usize = 200;

/// Parsed search query: lowercase whitespace-separated terms.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        Self {
            terms: raw.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Every term must appear in the spot's name, campus, or type.
    pub fn matches(&self, spot: &ParkingSpot) -> bool {
        let fields = [
            spot.name.as_deref().unwrap_or("").to_lowercase(),
            spot.campus_location.to_lowercase(),
            spot.parking_type.to_lowercase(),
        ];

        self.terms
            .iter()
            .all(|term| fields.iter().any(|field| field.contains(term.as_str())))
    }
}

/// Keep the spots matching `query`, preserving their order.
pub fn search_spots(spots: Vec<ParkingSpot>, query: &SearchQuery) -> Vec<ParkingSpot> {
    if query.is_empty() {
        return spots;
    }
    spots.into_iter().filter(|s| query.matches(s)).collect()
}
