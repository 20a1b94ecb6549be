// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Just-in-time user provisioning on sign-in.

use crate::db::Db;
use crate::error::AppError;
use crate::models::User;
use crate::services::google_oauth::ExternalIdentity;
use crate::time_utils::now_rfc3339;

/// Look up or create the user for a verified identity.
///
/// Returning users get their provider display data and `last_login`
/// refreshed; their profile fields are left alone.
pub async fn provision_user(db: &Db, identity: &ExternalIdentity) -> Result<User, AppError> {
    let now = now_rfc3339();
    let (first_name, last_name) = split_name(identity);

    let user = match db.get_user(&identity.id).await? {
        Some(mut existing) => {
            existing.email = identity.email.clone();
            existing.first_name = first_name;
            existing.last_name = last_name;
            existing.profile_pic = identity.picture.clone();
            existing.last_login = now;
            existing
        }
        None => {
            tracing::info!(google_id = %identity.id, "Creating new user on first sign-in");
            User {
                google_id: identity.id.clone(),
                email: identity.email.clone(),
                first_name,
                last_name,
                profile_pic: identity.picture.clone(),
                major: None,
                grade_level: None,
                graduation_year: None,
                housing_type: None,
                preferred_parking_types: None,
                created_at: now.clone(),
                last_login: now,
            }
        }
    };

    db.upsert_user(&user).await?;
    Ok(user)
}

/// First/last name from the identity, splitting the full name when the
/// provider did not supply the parts.
fn split_name(identity: &ExternalIdentity) -> (String, String) {
    if let Some(given) = &identity.given_name {
        return (
            given.clone(),
            identity.family_name.clone().unwrap_or_default(),
        );
    }

    match identity.name.trim().split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (identity.name.trim().to_string(), String::new()),
    }
}
