// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{resolve_session, AuthUser};
use crate::models::{NewParkingSpot, ParkingSpot, ProfilePatch, UserDict};
use crate::services::search::{search_spots, MAX_QUERY_LEN};
use crate::services::{rank_spots, FilterParams, Preferences, SearchQuery, SpotFilter};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes open to anonymous callers.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/current-user", get(current_user))
        .route("/api/parking-spots", get(list_parking_spots))
        .route("/api/parking-spots/filter", get(filter_parking_spots))
        .route("/api/search-logic", get(search_parking_spots))
        .route("/api/add-parking-spot", post(add_parking_spot))
}

/// API routes that require a session.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/update-profile", post(update_profile))
        .route("/api/recommendations", get(recommendations))
}

// ─── Users ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CurrentUserResponse {
    pub authenticated: bool,
    pub user: Option<UserDict>,
}

/// Session status for the page script. Never fails on a bad session.
async fn current_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<CurrentUserResponse>> {
    let Some(auth) = resolve_session(&jar, &headers, &state.config.session_signing_key) else {
        return Ok(Json(CurrentUserResponse {
            authenticated: false,
            user: None,
        }));
    };

    let user = state.db.get_user(&auth.google_id).await?;
    if user.is_none() {
        tracing::debug!(google_id = %auth.google_id, "Session for unknown user");
    }

    Ok(Json(CurrentUserResponse {
        authenticated: user.is_some(),
        user: user.as_ref().map(UserDict::from),
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileUpdateResponse {
    pub status: String,
    pub user: UserDict,
}

/// Merge a partial profile into the signed-in user's record.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: std::result::Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<ProfileUpdateResponse>> {
    let Json(patch) = payload.map_err(|e| AppError::InvalidArgument(e.body_text()))?;
    patch.validate()?;

    tracing::debug!(
        google_id = %auth.google_id,
        empty = patch.is_empty(),
        "Updating profile"
    );

    let user = state
        .db
        .update_profile(&auth.google_id, patch)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::Unauthorized,
            other => other,
        })?;

    tracing::info!(
        google_id = %user.google_id,
        profile_complete = user.is_profile_complete(),
        "Profile updated"
    );

    Ok(Json(ProfileUpdateResponse {
        status: "success".to_string(),
        user: UserDict::from(&user),
    }))
}

// ─── Parking Spots ───────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SpotListResponse {
    pub status: String,
    pub count: usize,
    pub data: Vec<ParkingSpot>,
}

impl From<Vec<ParkingSpot>> for SpotListResponse {
    fn from(data: Vec<ParkingSpot>) -> Self {
        Self {
            status: "success".to_string(),
            count: data.len(),
            data,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SpotCreatedResponse {
    pub status: String,
    pub data: ParkingSpot,
}

async fn list_parking_spots(State(state): State<Arc<AppState>>) -> Result<Json<SpotListResponse>> {
    let spots = state.db.list_spots().await?;
    tracing::debug!(count = spots.len(), "Listing parking spots");
    Ok(Json(spots.into()))
}

async fn filter_parking_spots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<SpotListResponse>> {
    let filter = SpotFilter::try_from(params)?;
    let spots = state.db.find_spots(&filter).await?;

    tracing::debug!(
        campus = ?filter.campus_location,
        parking_type = ?filter.parking_type,
        max_cost = ?filter.max_cost,
        count = spots.len(),
        "Filtered parking spots"
    );

    Ok(Json(spots.into()))
}

/// Whole catalog, the user's preferred types first.
async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SpotListResponse>> {
    let user = state
        .db
        .get_user(&auth.google_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let prefs = Preferences::from_user(&user);
    let spots = rank_spots(state.db.list_spots().await?, &prefs);

    tracing::debug!(
        google_id = %auth.google_id,
        preferred = !prefs.is_empty(),
        housing_type = ?prefs.housing_type(),
        count = spots.len(),
        "Ranked recommendations"
    );

    Ok(Json(spots.into()))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_parking_spots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SpotListResponse>> {
    if params.q.len() > MAX_QUERY_LEN {
        return Err(AppError::InvalidArgument(format!(
            "Search query longer than {} characters",
            MAX_QUERY_LEN
        )));
    }

    let query = SearchQuery::parse(&params.q);
    let spots = search_spots(state.db.list_spots().await?, &query);
    tracing::debug!(count = spots.len(), "Searched parking spots");

    Ok(Json(spots.into()))
}

async fn add_parking_spot(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewParkingSpot>, JsonRejection>,
) -> Result<(StatusCode, Json<SpotCreatedResponse>)> {
    let Json(new_spot) = payload.map_err(|e| AppError::InvalidArgument(e.body_text()))?;
    new_spot.validate()?;

    // Caller-chosen IDs could overwrite existing spots.
    let spot = new_spot.into_spot(uuid::Uuid::new_v4().to_string());
    state.db.set_spot(&spot).await?;

    tracing::info!(
        spot_id = %spot.id,
        campus = %spot.campus_location,
        parking_type = %spot.parking_type,
        "Parking spot added"
    );

    Ok((
        StatusCode::CREATED,
        Json(SpotCreatedResponse {
            status: "success".to_string(),
            data: spot,
        }),
    ))
}
