// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus Parking: find, filter and recommend parking spots on campus
//!
//! This crate provides the web backend: Google sign-in, student profile
//! preferences, and the parking spot catalog API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::GoogleOAuthClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub oauth: GoogleOAuthClient,
}
