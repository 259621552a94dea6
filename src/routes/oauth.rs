// SPDX-License-Identifier: MIT

//! OAuth callback route.
//!
//! Always answers with a redirect into the frontend; errors travel as
//! `error`/`message` query parameters on a page able to display them.
//! Branching is keyed by the `flow` query parameter (login vs register)
//! and by the state of the user's profile.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::NewProfile;
use crate::services::{ProviderUser, Session};
use crate::session::{propagate_session_cookies, remove_session_cookies, CookieSettings};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/callback", get(oauth_callback))
}

/// Frontend pages used as redirect targets.
const LOGIN_PAGE: &str = "/login";
const REGISTER_PAGE: &str = "/register";
const LANDING_PAGE: &str = "/dashboard";
const VERIFICATION_PAGE: &str = "/onboarding/verification";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    /// `"register"` triggers the register flow; anything else is login
    #[serde(default)]
    flow: Option<String>,
}

/// OAuth callback - exchange the code, branch on flow and profile state.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let settings = state.config.cookie_settings();

    match handle_callback(&state, jar.clone(), &settings, params).await {
        Ok(response) => response,
        Err(err) => {
            // Internal detail is logged; the user sees a generic message
            tracing::error!(error = %err, "OAuth callback failed unexpectedly");
            (
                jar,
                error_redirect(
                    &state.config.frontend_url,
                    LOGIN_PAGE,
                    "unexpected_error",
                    "Something went wrong during sign-in. Please try again.",
                ),
            )
        }
    }
}

async fn handle_callback(
    state: &Arc<AppState>,
    jar: CookieJar,
    settings: &CookieSettings,
    params: CallbackParams,
) -> Result<(CookieJar, Redirect)> {
    let frontend = &state.config.frontend_url;

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("OAuth callback without authorization code");
        return Ok((
            jar,
            error_redirect(
                frontend,
                LOGIN_PAGE,
                "oauth_failed",
                "The sign-in attempt was cancelled or failed.",
            ),
        ));
    };

    let outcome = match state.identity.exchange_code(&code).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            return Ok((
                jar,
                error_redirect(
                    frontend,
                    LOGIN_PAGE,
                    "oauth_exchange_failed",
                    "Could not verify the sign-in with the provider.",
                ),
            ));
        }
    };

    let (Some(user), Some(session)) = (outcome.user, outcome.session) else {
        tracing::warn!("OAuth exchange returned no user");
        return Ok((
            jar,
            error_redirect(
                frontend,
                LOGIN_PAGE,
                "no_user",
                "The provider did not return an account.",
            ),
        ));
    };

    let profile = state
        .profiles
        .get_profile(&user.id)
        .await
        .map_err(|e| crate::error::AppError::Store(e.to_string()))?;

    let register_flow = params.flow.as_deref() == Some("register");

    if !register_flow {
        // Admin check runs before the profile-absent check: admin status,
        // if known, always takes precedence
        if profile.as_ref().is_some_and(|p| p.is_admin) {
            tracing::warn!(user_id = %user.id, "OAuth login blocked for admin account");
            let jar = sign_out_and_clear(state, jar, settings, &session).await;
            return Ok((
                jar,
                error_redirect(
                    frontend,
                    LOGIN_PAGE,
                    "admin_oauth_blocked",
                    "Admin accounts must sign in with a password.",
                ),
            ));
        }

        if profile.is_none() {
            tracing::info!(user_id = %user.id, "OAuth login without an account");
            let jar = sign_out_and_clear(state, jar, settings, &session).await;
            return Ok((
                jar,
                error_redirect(
                    frontend,
                    LOGIN_PAGE,
                    "account_not_found",
                    "No account exists for this identity. Please register first.",
                ),
            ));
        }

        // Existing non-admin user: downstream routing decides whether
        // onboarding is still required, based on registered_at
        tracing::info!(user_id = %user.id, "OAuth login successful");
        let jar = propagate_session(jar, &session, settings);
        return Ok((jar, Redirect::to(&format!("{frontend}{LANDING_PAGE}"))));
    }

    // Register flow
    match profile {
        Some(p) if p.registered_at.is_some() => {
            // Already fully onboarded; register-via-OAuth is idempotent
            tracing::info!(user_id = %user.id, "Register flow for onboarded user");
            let jar = propagate_session(jar, &session, settings);
            Ok((jar, Redirect::to(&format!("{frontend}{LANDING_PAGE}"))))
        }
        Some(_) => {
            // Onboarding started but not finished: resume, not restart
            tracing::info!(user_id = %user.id, "Resuming onboarding");
            let jar = propagate_session(jar, &session, settings);
            Ok((jar, Redirect::to(&format!("{frontend}{VERIFICATION_PAGE}"))))
        }
        None => create_placeholder_profile(state, jar, settings, &user, &session).await,
    }
}

/// Insert the placeholder profile for a new OAuth registrant.
///
/// The insert uses the store's elevated write path: a user with no
/// profile row cannot yet pass row-level security. A concurrent callback
/// for the same user loses the store's uniqueness race and lands here as
/// a creation failure.
async fn create_placeholder_profile(
    state: &Arc<AppState>,
    jar: CookieJar,
    settings: &CookieSettings,
    user: &ProviderUser,
    session: &Session,
) -> Result<(CookieJar, Redirect)> {
    let frontend = &state.config.frontend_url;

    let new_profile = NewProfile {
        user_id: user.id.clone(),
        email: user.email.clone().unwrap_or_default(),
        full_name: user.display_name(),
    };

    match state.profiles.create_profile(&new_profile).await {
        Ok(_) => {
            tracing::info!(user_id = %user.id, "Placeholder profile created");
            let jar = propagate_session(jar, session, settings);
            Ok((jar, Redirect::to(&format!("{frontend}{VERIFICATION_PAGE}"))))
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Profile creation failed");
            let jar = sign_out_and_clear(state, jar, settings, session).await;
            Ok((
                jar,
                error_redirect(
                    frontend,
                    REGISTER_PAGE,
                    "profile_creation_failed",
                    "Your account could not be set up. Please try again.",
                ),
            ))
        }
    }
}

/// Apply the propagation adapter for a fresh session.
fn propagate_session(jar: CookieJar, session: &Session, settings: &CookieSettings) -> CookieJar {
    let cookies = session.to_cookies(&settings.session_prefix);
    propagate_session_cookies(jar, &cookies, settings)
}

/// Revoke the session at the provider and expire its cookies.
///
/// Best-effort: a failed revocation is logged, the redirect still
/// happens and no session cookies are handed to the browser.
async fn sign_out_and_clear(
    state: &Arc<AppState>,
    jar: CookieJar,
    settings: &CookieSettings,
    session: &Session,
) -> CookieJar {
    if let Err(e) = state.identity.sign_out(&session.access_token).await {
        tracing::warn!(error = %e, "Provider sign-out failed");
    }
    remove_session_cookies(jar, settings)
}

/// Build a redirect carrying an error code and a user-facing message.
fn error_redirect(frontend: &str, page: &str, code: &str, message: &str) -> Redirect {
    Redirect::to(&format!(
        "{frontend}{page}?error={code}&message={}",
        urlencoding::encode(message)
    ))
}
