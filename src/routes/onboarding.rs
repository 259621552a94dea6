// SPDX-License-Identifier: MIT

//! Onboarding status and completion routes.
//!
//! Both routes read the authenticated user from the session middleware.
//! The completion response tells the client to force a full reload of the
//! landing page so server-side gatekeeping re-evaluates the now-updated
//! profile state instead of serving a stale onboarding-incomplete view.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::OnboardingStatus;
use crate::services::{CompleteOutcome, OnboardingService};
use crate::AppState;

/// Onboarding routes (require a valid session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/complete", post(complete))
}

/// Completion response. `reload` asks the client for a full page load
/// (not a soft route transition) to the landing page.
#[derive(Serialize)]
pub struct CompleteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub reload: bool,
}

/// Current onboarding flags for the authenticated user.
async fn get_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<OnboardingStatus>> {
    let service = OnboardingService::new(state.profiles.clone());
    let status = service.status(&user.id).await?;
    Ok(Json(status))
}

/// Stamp `registered_at` for the authenticated user.
async fn complete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<CompleteResponse>> {
    let service = OnboardingService::new(state.profiles.clone());

    let response = match service.complete(&user.id).await? {
        CompleteOutcome::Completed | CompleteOutcome::AlreadyComplete => CompleteResponse {
            success: true,
            error: None,
            reload: true,
        },
        CompleteOutcome::Incomplete => CompleteResponse {
            success: false,
            error: Some("onboarding_incomplete".to_string()),
            reload: false,
        },
    };

    Ok(Json(response))
}
