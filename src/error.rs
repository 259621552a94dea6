// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Every variant maps to either a structured JSON body (login/onboarding
//! endpoints) or an `error` code on a redirect (OAuth callback, see
//! `routes::oauth`). Internal detail is logged here, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input shape (empty email/password, malformed body)
    #[error("{0}")]
    Validation(String),

    /// Credentials rejected by the identity provider. The message is the
    /// provider's own text, passed through verbatim to the client.
    #[error("{0}")]
    Credentials(String),

    /// Provider sign-in succeeded but returned no session object
    #[error("Sign-in succeeded but no session was issued")]
    SessionMissing,

    #[error("Authentication required")]
    Unauthorized,

    /// OAuth code exchange failed at the provider
    #[error("OAuth code exchange failed: {0}")]
    OAuthExchange(String),

    /// OAuth exchange returned a session without a user
    #[error("No user returned for OAuth session")]
    NoUser,

    /// OAuth login is rejected for admin accounts
    #[error("Admin accounts must sign in with a password")]
    AdminOauthBlocked,

    /// OAuth login attempted with no existing profile
    #[error("No account found for this identity")]
    AccountNotFound,

    /// Placeholder profile insert failed during OAuth registration
    #[error("Profile creation failed: {0}")]
    ProfileCreation(String),

    /// Profile store error (transport or protocol)
    #[error("Profile store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl AppError {
    /// Stable error code used in JSON bodies and redirect query strings.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_input",
            AppError::Credentials(_) => "invalid_credentials",
            AppError::SessionMissing => "no_session",
            AppError::Unauthorized => "unauthorized",
            AppError::OAuthExchange(_) => "oauth_exchange_failed",
            AppError::NoUser => "no_user",
            AppError::AdminOauthBlocked => "admin_oauth_blocked",
            AppError::AccountNotFound => "account_not_found",
            AppError::ProfileCreation(_) => "profile_creation_failed",
            AppError::Store(_) => "store_error",
            AppError::Internal(_) => "server_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            // Provider message passed through verbatim
            AppError::Credentials(msg) => (StatusCode::UNAUTHORIZED, Some(msg.clone())),
            AppError::SessionMissing => (StatusCode::UNAUTHORIZED, None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            AppError::OAuthExchange(msg) => {
                tracing::error!(error = %msg, "OAuth exchange error");
                (StatusCode::UNAUTHORIZED, None)
            }
            AppError::NoUser => (StatusCode::UNAUTHORIZED, None),
            AppError::AdminOauthBlocked => (StatusCode::FORBIDDEN, None),
            AppError::AccountNotFound => (StatusCode::NOT_FOUND, None),
            AppError::ProfileCreation(msg) => {
                tracing::error!(error = %msg, "Profile creation error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Profile store error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
