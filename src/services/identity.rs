// SPDX-License-Identifier: MIT

//! Identity provider client.
//!
//! The provider owns sessions, password verification and OAuth code
//! exchange. We talk to its GoTrue-style REST API and never handle
//! credentials or token cryptography ourselves. A credential rejection is
//! distinguished from transport/protocol failures so the login handler
//! can pass the provider's own message through to the client.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::session::{SessionCookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// Provider default cookie lifetime (~400 days).
const SESSION_COOKIE_MAX_AGE_SECS: i64 = 400 * 24 * 60 * 60;

/// Identity errors surfaced by the provider client.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider rejected the credentials or the OAuth code.
    /// The message is the provider's own text.
    #[error("{0}")]
    Rejected(String),

    /// Request never reached the provider or failed in transit
    #[error("Identity provider request failed: {0}")]
    Transport(String),

    /// Unexpected response shape or status
    #[error("Identity provider protocol error: {0}")]
    Protocol(String),
}

/// A user identity as issued by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,
}

impl ProviderUser {
    /// Display name from provider metadata: `full_name`, then `name`,
    /// then a literal fallback.
    pub fn display_name(&self) -> String {
        ["full_name", "name"]
            .iter()
            .find_map(|key| self.user_metadata.get(*key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "User".to_string())
    }
}

/// A provider session. Tokens travel only via cookies, never in bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl Session {
    /// The cookie set the provider wants written for this session,
    /// before attribute correction by the propagation adapter.
    pub fn to_cookies(&self, prefix: &str) -> Vec<SessionCookie> {
        vec![
            SessionCookie {
                name: format!("{prefix}{ACCESS_TOKEN_COOKIE}"),
                value: self.access_token.clone(),
                http_only: true,
                max_age_secs: SESSION_COOKIE_MAX_AGE_SECS,
            },
            SessionCookie {
                name: format!("{prefix}{REFRESH_TOKEN_COOKIE}"),
                value: self.refresh_token.clone(),
                http_only: true,
                max_age_secs: SESSION_COOKIE_MAX_AGE_SECS,
            },
        ]
    }
}

/// Outcome of a sign-in or code exchange.
///
/// The provider contract says a successful sign-in always carries a
/// session, but we treat both fields defensively.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub user: Option<ProviderUser>,
    pub session: Option<Session>,
}

/// External identity provider operations used by this crate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Password sign-in.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, IdentityError>;

    /// Exchange an OAuth authorization code for a session.
    async fn exchange_code(&self, code: &str) -> Result<SignInOutcome, IdentityError>;

    /// Resolve the user for an access token. `None` if the token is
    /// invalid, expired or revoked.
    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, IdentityError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ─────────────────────────────────────────────────────────────────────────────

/// REST client for the hosted identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: Option<ProviderUser>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(alias = "error_description", alias = "msg")]
    message: Option<String>,
}

impl IdentityClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key,
        }
    }

    async fn token_request(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<SignInOutcome, IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type={}", self.base_url, grant_type);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if response.status().is_client_error() {
            let message = Self::error_message(response).await;
            return Err(IdentityError::Rejected(message));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Protocol(format!("HTTP {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Protocol(format!("JSON parse error: {e}")))?;

        Ok(SignInOutcome {
            user: token.user,
            session: Some(Session {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_in: token.expires_in,
            }),
        })
    }

    /// Extract the provider's error message, falling back to raw text.
    async fn error_message(response: reqwest::Response) -> String {
        let raw = response.text().await.unwrap_or_default();
        serde_json::from_str::<ProviderErrorBody>(&raw)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(raw)
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, IdentityError> {
        self.token_request(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn exchange_code(&self, code: &str) -> Result<SignInOutcome, IdentityError> {
        self.token_request("authorization_code", serde_json::json!({ "code": code }))
            .await
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, IdentityError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        // Invalid/expired/revoked token is a normal outcome, not an error
        if response.status().as_u16() == 401 || response.status().as_u16() == 403 {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Protocol(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| IdentityError::Protocol(format!("JSON parse error: {e}")))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        // 401 here means the session is already gone; treat as signed out
        if response.status().is_success() || response.status().as_u16() == 401 {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Protocol(format!("HTTP {status}: {body}")))
    }
}
