// SPDX-License-Identifier: MIT

//! Session authentication middleware.
//!
//! Resolves the current user from the provider session cookie. The
//! provider is the source of truth for session validity; a revoked or
//! expired token resolves to no user and the request is rejected.

use crate::session::access_token_cookie_name;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Authenticated user extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}

/// Middleware that requires a valid provider session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let cookie_name = access_token_cookie_name(&state.config.cookie_settings());

    let token = jar
        .get(&cookie_name)
        .map(|c| c.value().to_string())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user = state
        .identity
        .get_user(&token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Session lookup failed");
            StatusCode::UNAUTHORIZED
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}
