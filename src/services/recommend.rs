// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Preference-driven ranking of parking spots.

use crate::models::{ParkingSpot, User};
use std::collections::HashSet;

/// Ranking inputs taken from a user's profile.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    /// Normalized (trimmed, lowercase) preferred parking types
    preferred_types: HashSet<String>,
    /// Housing type as reported; not weighted in the ranking.
    housing_type: Option<String>,
}

fn normalize(kind: &str) -> String {
    kind.trim().to_lowercase()
}

impl Preferences {
    pub fn new<I, S>(preferred_types: I, housing_type: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            preferred_types: preferred_types
                .into_iter()
                .map(|kind| normalize(kind.as_ref()))
                .filter(|kind| !kind.is_empty())
                .collect(),
            housing_type,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self::new(user.preferred_types(), user.housing_type.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.preferred_types.is_empty()
    }

    pub fn housing_type(&self) -> Option<&str> {
        self.housing_type.as_deref()
    }

    fn prefers(&self, spot: &ParkingSpot) -> bool {
        self.preferred_types.contains(&normalize(&spot.parking_type))
    }
}

/// Rank `spots` for the given preferences.
///
/// Spots of a preferred type come first; within each group spots are
/// ordered by ascending cost, then by ID. With no preferences the input
/// order is returned unchanged.
pub fn rank_spots(mut spots: Vec<ParkingSpot>, prefs: &Preferences) -> Vec<ParkingSpot> {
    if prefs.is_empty() {
        return spots;
    }

    spots.sort_by(|a, b| {
        prefs
            .prefers(b)
            .cmp(&prefs.prefers(a))
            .then_with(|| a.cost.total_cmp(&b.cost))
            .then_with(|| a.id.cmp(&b.id))
    });
    spots
}
