// SPDX-License-Identifier: MIT

//! Onboarding state machine.
//!
//! Onboarding has two independently-tracked sub-steps (the 5-question
//! verification and a minimally-filled CV) followed by an explicit
//! completion action that stamps `registered_at` exactly once. The flags
//! are derived from the underlying records on every call; nothing here
//! caches state.

use chrono::Utc;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::OnboardingStatus;
use crate::services::ProfileStore;

/// Outcome of a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// `registered_at` was stamped by this call
    Completed,
    /// `registered_at` was already set; nothing changed
    AlreadyComplete,
    /// One or both sub-steps are still unfinished
    Incomplete,
}

/// Computes onboarding flags and performs the completion transition.
#[derive(Clone)]
pub struct OnboardingService {
    profiles: Arc<dyn ProfileStore>,
}

impl OnboardingService {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Compute the onboarding flags for a user. Read-only and safe to
    /// call repeatedly.
    pub async fn status(&self, user_id: &str) -> Result<OnboardingStatus> {
        let five_q = self
            .profiles
            .get_five_q(user_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
            .is_some_and(|s| s.committed);

        let cv_minimal = self
            .profiles
            .get_cv(user_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
            .is_some_and(|cv| cv.is_minimal());

        Ok(OnboardingStatus { five_q, cv_minimal })
    }

    /// Transition a profile from incomplete to complete.
    ///
    /// A second call after completion is a no-op success: `registered_at`
    /// carries "member since" semantics and must never be re-stamped.
    pub async fn complete(&self, user_id: &str) -> Result<CompleteOutcome> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
            .ok_or(AppError::AccountNotFound)?;

        if profile.registered_at.is_some() {
            tracing::info!(user_id = %user_id, "Onboarding already complete");
            return Ok(CompleteOutcome::AlreadyComplete);
        }

        let status = self.status(user_id).await?;
        if !status.ready_to_complete() {
            tracing::info!(
                user_id = %user_id,
                five_q = status.five_q,
                cv_minimal = status.cv_minimal,
                "Completion requested with unfinished steps"
            );
            return Ok(CompleteOutcome::Incomplete);
        }

        self.profiles
            .set_registered_at(user_id, Utc::now())
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        tracing::info!(user_id = %user_id, "Onboarding completed");
        Ok(CompleteOutcome::Completed)
    }
}
