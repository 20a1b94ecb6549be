// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth 2.0 client for the sign-in flow.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization code exchange
//! - Userinfo lookup and conversion into [`ExternalIdentity`]

use crate::config::Config;
use crate::error::AppError;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const SCOPES: &str = "openid email profile";

/// Verified identity handed to the rest of the application.
///
/// Nothing else from the provider's responses crosses this boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    /// Provider subject id
    pub id: String,
    pub email: String,
    pub name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

/// Userinfo document as returned by Google's OIDC userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

impl TryFrom<GoogleUserInfo> for ExternalIdentity {
    type Error = AppError;

    fn try_from(info: GoogleUserInfo) -> Result<Self, Self::Error> {
        if info.sub.trim().is_empty() {
            return Err(AppError::UpstreamAuth("userinfo missing subject".to_string()));
        }

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::UpstreamAuth("userinfo missing email".to_string()))?;

        if info.email_verified != Some(true) {
            return Err(AppError::UpstreamAuth(format!(
                "email {} is not verified",
                email
            )));
        }

        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        Ok(Self {
            id: info.sub,
            email,
            name,
            given_name: info.given_name,
            family_name: info.family_name,
            picture: info.picture,
        })
    }
}

/// Token endpoint response (only the field we use).
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.callback_url(),
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            userinfo_url: config.google_userinfo_url.clone(),
        })
    }

    /// URL of Google's consent screen for the given signed state.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a verified identity.
    pub async fn complete_login(&self, code: &str) -> Result<ExternalIdentity, AppError> {
        let tokens = self.exchange_code(code).await?;
        let info = self.fetch_userinfo(&tokens.access_token).await?;
        ExternalIdentity::try_from(info)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::UpstreamAuth(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Failed to parse token response: {}", e)))
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamAuth(format!(
                "Userinfo request failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Failed to parse userinfo: {}", e)))
    }
}
