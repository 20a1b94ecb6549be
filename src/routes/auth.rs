// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, session_cookie, session_removal_cookie, AuthUser};
use crate::services::accounts::provision_user;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const NONCE_COOKIE: &str = "campus_parking_oauth_nonce";
const NONCE_COOKIE_PATH: &str = "/login/callback";

/// How long a login attempt may take from redirect to callback.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;
/// Tolerated clock skew for state timestamps from the future.
const STATE_MAX_SKEW_MS: u128 = 60 * 1000;

/// Routes that need no session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/login/callback", get(login_callback))
}

/// Routes behind the page auth middleware.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/logout", get(logout))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Build the signed OAuth state: base64("nonce|timestamp_hex|signature_hex").
pub fn sign_state(nonce: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", nonce, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify signature and freshness of an OAuth state, returning its nonce.
pub fn verify_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let mut parts = state_str.splitn(3, '|');
    let (nonce, timestamp_hex, signature_hex) = (parts.next()?, parts.next()?, parts.next()?);
    if nonce.is_empty() {
        return None;
    }

    let signature = hex::decode(signature_hex).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", nonce, timestamp_hex).as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::warn!("OAuth state signature mismatch");
        return None;
    }

    let timestamp = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if timestamp > now_ms + STATE_MAX_SKEW_MS || now_ms.saturating_sub(timestamp) > STATE_MAX_AGE_MS
    {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}

fn nonce_cookie(nonce: String, secure: bool) -> Cookie<'static> {
    Cookie::build((NONCE_COOKIE, nonce))
        .path(NONCE_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::minutes(10))
        .build()
}

fn nonce_removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((NONCE_COOKIE, ""))
        .path(NONCE_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Start sign-in: remember a nonce and send the browser to Google.
async fn login(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<(CookieJar, Redirect)> {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let oauth_state = sign_state(&nonce, now_millis()?, &state.config.oauth_state_key)?;

    tracing::info!("Starting Google sign-in");

    let jar = jar.add(nonce_cookie(nonce, state.config.is_https()));
    Ok((jar, Redirect::temporary(&state.oauth.authorize_url(&oauth_state))))
}

/// Query parameters Google sends back to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Finish sign-in. Any failure is reported as a bare 400.
async fn login_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let secure = state.config.is_https();
    let jar_after = jar.clone().add(nonce_removal_cookie(secure));

    match finish_login(&state, &jar, params).await {
        Ok((token, profile_complete)) => {
            let target = if profile_complete {
                "/"
            } else {
                "/complete-profile"
            };
            let jar_after = jar_after.add(session_cookie(token, secure));
            (jar_after, Redirect::temporary(target)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            (jar_after, (StatusCode::BAD_REQUEST, "Login failed")).into_response()
        }
    }
}

/// Verify the callback, provision the user and mint a session token.
async fn finish_login(
    state: &AppState,
    jar: &CookieJar,
    params: CallbackParams,
) -> Result<(String, bool)> {
    if let Some(error) = params.error {
        return Err(AppError::UpstreamAuth(format!(
            "Google returned error: {}",
            error
        )));
    }

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::InvalidArgument("Missing state".to_string()))?;
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidArgument("Missing code".to_string()))?;

    let nonce = verify_state(&oauth_state, &state.config.oauth_state_key, now_millis()?)
        .ok_or_else(|| AppError::InvalidArgument("Invalid state".to_string()))?;

    match jar.get(NONCE_COOKIE) {
        Some(cookie) if cookie.value() == nonce => {}
        _ => {
            return Err(AppError::InvalidArgument(
                "State does not match this browser".to_string(),
            ))
        }
    }

    let identity = state.oauth.complete_login(&code).await?;
    let user = provision_user(&state.db, &identity).await?;

    let token = create_jwt(&user.google_id, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(
        google_id = %user.google_id,
        profile_complete = user.is_profile_complete(),
        "Sign-in successful"
    );

    Ok((token, user.is_profile_complete()))
}

/// Logout: drop the session cookie and go home.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    tracing::info!(google_id = %user.google_id, "User logged out");
    let jar = jar.add(session_removal_cookie(state.config.is_https()));
    (jar, Redirect::temporary("/"))
}
