// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser pages. The HTML shell is compiled into the binary.

use crate::AppState;
use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const APP_JS: &str = include_str!("../../static/app.js");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/static/app.js", get(app_js))
}

/// Pages behind the page auth middleware.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/complete-profile", get(complete_profile))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Same shell as the home page; the script opens the profile form.
async fn complete_profile() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_JS,
    )
}
