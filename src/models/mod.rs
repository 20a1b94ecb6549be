// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod spot;
pub mod user;

pub use spot::{NewParkingSpot, ParkingSpot};
pub use user::{ProfilePatch, User, UserDict};
