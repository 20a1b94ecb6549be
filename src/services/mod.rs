// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod filter;
pub mod google_oauth;
pub mod recommend;
pub mod search;
pub mod seed;

pub use filter::{FilterParams, SpotFilter};
pub use google_oauth::{ExternalIdentity, GoogleOAuthClient};
pub use recommend::{rank_spots, Preferences};
pub use search::SearchQuery;
