// SPDX-License-Identifier: MIT

//! Password login route.
//!
//! Tokens never appear in the response body; the session travels back to
//! the browser only via cookies, re-asserted by the propagation adapter.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::IdentityError;
use crate::session::propagate_session_cookies;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// Password sign-in via the identity provider.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    // Input validation happens before any provider call
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let outcome = state
        .identity
        .sign_in_with_password(&body.email, &body.password)
        .await
        .map_err(|e| match e {
            // Provider message passed through verbatim
            IdentityError::Rejected(msg) => AppError::Credentials(msg),
            other => AppError::Internal(anyhow::anyhow!("password sign-in failed: {other}")),
        })?;

    // Defensive: the provider contract says a successful sign-in always
    // carries a session, but don't trust that
    let session = outcome.session.ok_or(AppError::SessionMissing)?;
    let user = outcome.user.ok_or(AppError::SessionMissing)?;

    // Admin lookup is best-effort; a store failure does not fail login
    let is_admin = match state.profiles.get_profile(&user.id).await {
        Ok(profile) => profile.map(|p| p.is_admin).unwrap_or(false),
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Admin lookup failed, assuming non-admin");
            false
        }
    };

    let settings = state.config.cookie_settings();
    let cookies = session.to_cookies(&settings.session_prefix);
    let jar = propagate_session_cookies(jar, &cookies, &settings);

    tracing::info!(user_id = %user.id, is_admin, "Password login successful");

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user: UserSummary {
                id: user.id,
                email: user.email,
                is_admin,
            },
        }),
    ))
}
