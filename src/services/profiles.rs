// SPDX-License-Identifier: MIT

//! Profile store client.
//!
//! Profiles, 5Q submissions and CVs live in an external PostgREST-style
//! store. Reads and the placeholder-profile insert go through the
//! service-role key: a registrant with no profile row cannot yet pass the
//! store's row-level security, so the normal write path is locked until
//! the placeholder exists. The exactly-one-profile-per-user invariant is
//! the store's uniqueness constraint; a losing concurrent insert surfaces
//! as [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{CvRecord, FiveQSubmission, NewProfile, Profile};

/// Profile store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Uniqueness violation (profile already exists for this user)
    #[error("Conflict: a row already exists for this key")]
    Conflict,

    #[error("Profile store request failed: {0}")]
    Transport(String),

    #[error("Profile store protocol error: {0}")]
    Protocol(String),
}

/// External profile store operations used by this crate.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    /// Insert a placeholder profile with `registered_at = NULL`.
    /// Uses elevated write privileges (see module docs).
    async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, StoreError>;

    /// Stamp `registered_at`. The caller guards against re-stamping.
    async fn set_registered_at(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get_five_q(&self, user_id: &str) -> Result<Option<FiveQSubmission>, StoreError>;

    async fn get_cv(&self, user_id: &str) -> Result<Option<CvRecord>, StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ─────────────────────────────────────────────────────────────────────────────

/// REST client for the profile store.
#[derive(Clone)]
pub struct RestProfileStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_key: String,
}

impl RestProfileStore {
    pub fn new(base_url: String, anon_key: String, service_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key,
            service_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Fetch at most one row from `table` for `user_id`.
    async fn get_one<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        user_id: &str,
    ) -> Result<Option<T>, StoreError> {
        let response = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.service_key)
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let rows: Vec<T> = Self::check_response_json(response).await?;
        Ok(rows.into_iter().next())
    }

    /// Check response status and parse JSON body.
    async fn check_response_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // PostgREST maps unique violations to 409
            if status.as_u16() == 409 {
                return Err(StoreError::Conflict);
            }

            return Err(StoreError::Protocol(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(format!("JSON parse error: {e}")))
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.get_one("profiles", user_id).await
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, StoreError> {
        let response = self
            .http
            .post(self.table_url("profiles"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(profile)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let rows: Vec<Profile> = Self::check_response_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Protocol("insert returned no row".to_string()))
    }

    async fn set_registered_at(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .patch(self.table_url("profiles"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.service_key)
            .query(&[("user_id", format!("eq.{user_id}"))])
            .json(&serde_json::json!({
                "registered_at": at.to_rfc3339(),
                "updated_at": at.to_rfc3339(),
            }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Protocol(format!("HTTP {status}: {body}")));
        }

        Ok(())
    }

    async fn get_five_q(&self, user_id: &str) -> Result<Option<FiveQSubmission>, StoreError> {
        self.get_one("five_q_submissions", user_id).await
    }

    async fn get_cv(&self, user_id: &str) -> Result<Option<CvRecord>, StoreError> {
        self.get_one("cvs", user_id).await
    }
}
