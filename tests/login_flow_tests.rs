// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in flow against a fake provider on a loopback port.

use axum::{
    body::Body,
    extract::Form,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use campus_parking::config::Config;
use campus_parking::routes::auth::{sign_state, NONCE_COOKIE};
use campus_parking::AppState;
use serde_json::json;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

mod common;
use common::{body_text, create_test_app_with_config, test_user};

const FAKE_CODE: &str = "fake-auth-code";

/// Serve a token endpoint accepting only `FAKE_CODE` and a userinfo
/// endpoint returning `userinfo`. Returns the base URL.
async fn start_fake_google(userinfo: serde_json::Value) -> String {
    let app = Router::new()
        .route(
            "/token",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                if form.get("code").map(String::as_str) != Some(FAKE_CODE)
                    || form.get("grant_type").map(String::as_str) != Some("authorization_code")
                {
                    return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"})));
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "access_token": "fake-access-token",
                        "token_type": "Bearer",
                        "expires_in": 3599
                    })),
                )
            }),
        )
        .route(
            "/userinfo",
            get(move |headers: axum::http::HeaderMap| {
                let userinfo = userinfo.clone();
                async move {
                    let authorized = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|h| h.to_str().ok())
                        == Some("Bearer fake-access-token");
                    if authorized {
                        (StatusCode::OK, Json(userinfo))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({})))
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn verified_userinfo(sub: &str) -> serde_json::Value {
    json!({
        "sub": sub,
        "email": "student@example.edu",
        "email_verified": true,
        "name": "Grace Hopper",
        "given_name": "Grace",
        "family_name": "Hopper",
        "picture": "https://example.com/grace.png"
    })
}

async fn app_with_fake_google(userinfo: serde_json::Value) -> (Router, std::sync::Arc<AppState>) {
    let base = start_fake_google(userinfo).await;
    let mut config = Config::test_default();
    config.google_token_url = format!("{}/token", base);
    config.google_userinfo_url = format!("{}/userinfo", base);
    create_test_app_with_config(config).await
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis()
}

fn callback_request(code: &str, state: &str, nonce_cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!(
        "/login/callback?code={}&state={}",
        code, state
    ));
    if let Some(nonce) = nonce_cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", NONCE_COOKIE, nonce));
    }
    builder.body(Body::empty()).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

async fn assert_login_failed(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("campus_parking_session=")));
    assert_eq!(body_text(response).await, "Login failed");
}

#[tokio::test]
async fn test_login_redirects_to_google_with_state() {
    let (app, _) = app_with_fake_google(verified_userinfo("sub-1")).await;

    let response = app
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(location.contains("client_id=test_client_id"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("&state="));

    let cookies = set_cookies(&response);
    let nonce = cookies
        .iter()
        .find(|c| c.starts_with(&format!("{}=", NONCE_COOKIE)))
        .expect("nonce cookie set");
    assert!(nonce.contains("Path=/login/callback"));
    assert!(nonce.contains("HttpOnly"));
}

#[tokio::test]
async fn test_first_login_creates_user_and_asks_for_profile() {
    let (app, state) = app_with_fake_google(verified_userinfo("sub-new")).await;
    let oauth_state = sign_state("nonce-1", now_ms(), &state.config.oauth_state_key).unwrap();

    let response = app
        .oneshot(callback_request(FAKE_CODE, &oauth_state, Some("nonce-1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/complete-profile"
    );

    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("campus_parking_session=") && c.contains("HttpOnly")));
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", NONCE_COOKIE)) && c.contains("Max-Age=0")));

    let user = state.db.get_user("sub-new").await.unwrap().unwrap();
    assert_eq!(user.email, "student@example.edu");
    assert_eq!(user.first_name, "Grace");
    assert_eq!(user.last_name, "Hopper");
    assert_eq!(user.profile_pic.as_deref(), Some("https://example.com/grace.png"));
    assert!(!user.is_profile_complete());
}

#[tokio::test]
async fn test_returning_complete_user_goes_home() {
    let (app, state) = app_with_fake_google(verified_userinfo("sub-done")).await;

    let mut existing = test_user("sub-done");
    existing.major = Some("CS".to_string());
    existing.grade_level = Some("Senior".to_string());
    existing.housing_type = Some("Apartment".to_string());
    state.db.upsert_user(&existing).await.unwrap();

    let oauth_state = sign_state("nonce-2", now_ms(), &state.config.oauth_state_key).unwrap();
    let response = app
        .oneshot(callback_request(FAKE_CODE, &oauth_state, Some("nonce-2")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let user = state.db.get_user("sub-done").await.unwrap().unwrap();
    assert_eq!(user.major.as_deref(), Some("CS"));
    assert_eq!(user.created_at, existing.created_at);
    assert_ne!(user.last_login, existing.last_login);
}

#[tokio::test]
async fn test_callback_without_nonce_cookie_fails() {
    let (app, state) = app_with_fake_google(verified_userinfo("sub-x")).await;
    let oauth_state = sign_state("nonce-3", now_ms(), &state.config.oauth_state_key).unwrap();

    let response = app
        .clone()
        .oneshot(callback_request(FAKE_CODE, &oauth_state, None))
        .await
        .unwrap();
    assert_login_failed(response).await;

    let response = app
        .oneshot(callback_request(FAKE_CODE, &oauth_state, Some("other-nonce")))
        .await
        .unwrap();
    assert_login_failed(response).await;

    assert_eq!(state.db.get_user("sub-x").await.unwrap(), None);
}

#[tokio::test]
async fn test_callback_with_forged_or_stale_state_fails() {
    let (app, state) = app_with_fake_google(verified_userinfo("sub-y")).await;

    let forged = sign_state("nonce-4", now_ms(), b"attacker key").unwrap();
    let response = app
        .clone()
        .oneshot(callback_request(FAKE_CODE, &forged, Some("nonce-4")))
        .await
        .unwrap();
    assert_login_failed(response).await;

    let stale = sign_state(
        "nonce-5",
        now_ms() - 11 * 60 * 1000,
        &state.config.oauth_state_key,
    )
    .unwrap();
    let response = app
        .oneshot(callback_request(FAKE_CODE, &stale, Some("nonce-5")))
        .await
        .unwrap();
    assert_login_failed(response).await;

    assert_eq!(state.db.get_user("sub-y").await.unwrap(), None);
}

#[tokio::test]
async fn test_callback_with_rejected_code_fails() {
    let (app, state) = app_with_fake_google(verified_userinfo("sub-z")).await;
    let oauth_state = sign_state("nonce-6", now_ms(), &state.config.oauth_state_key).unwrap();

    let response = app
        .oneshot(callback_request("wrong-code", &oauth_state, Some("nonce-6")))
        .await
        .unwrap();
    assert_login_failed(response).await;
    assert_eq!(state.db.get_user("sub-z").await.unwrap(), None);
}

#[tokio::test]
async fn test_unverified_email_fails() {
    let mut userinfo = verified_userinfo("sub-unverified");
    userinfo["email_verified"] = json!(false);
    let (app, state) = app_with_fake_google(userinfo).await;
    let oauth_state = sign_state("nonce-7", now_ms(), &state.config.oauth_state_key).unwrap();

    let response = app
        .oneshot(callback_request(FAKE_CODE, &oauth_state, Some("nonce-7")))
        .await
        .unwrap();
    assert_login_failed(response).await;
    assert_eq!(state.db.get_user("sub-unverified").await.unwrap(), None);
}

#[tokio::test]
async fn test_provider_error_fails() {
    let (app, _) = app_with_fake_google(verified_userinfo("sub-e")).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/login/callback?error=access_denied")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_login_failed(response).await;
}

#[tokio::test]
async fn test_unreachable_provider_fails() {
    let mut config = Config::test_default();
    config.google_token_url = "http://127.0.0.1:9/token".to_string();
    let (app, state) = create_test_app_with_config(config).await;
    let oauth_state = sign_state("nonce-8", now_ms(), &state.config.oauth_state_key).unwrap();

    let response = app
        .oneshot(callback_request(FAKE_CODE, &oauth_state, Some("nonce-8")))
        .await
        .unwrap();
    assert_login_failed(response).await;
}
