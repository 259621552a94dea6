// SPDX-License-Identifier: MIT

//! Shared test fixtures: in-memory fakes for the identity provider and
//! the profile store, plus a router factory wired to them.

use async_trait::async_trait;
use axum::http::header;
use axum::response::Response;
use chrono::Utc;
use rishta_auth::config::Config;
use rishta_auth::models::{CvRecord, FiveQSubmission, NewProfile, Profile};
use rishta_auth::routes::create_router;
use rishta_auth::services::{
    IdentityError, IdentityProvider, ProfileStore, ProviderUser, Session, SignInOutcome,
    StoreError,
};
use rishta_auth::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ─── Identity provider fake ──────────────────────────────────

/// Scripted response for sign-in and code exchange.
#[derive(Clone)]
#[allow(dead_code)]
pub enum SignInScript {
    Reject(String),
    Success {
        user: Option<ProviderUser>,
        session: Option<Session>,
    },
}

pub struct FakeIdentity {
    pub password_script: Mutex<SignInScript>,
    pub exchange_scripts: Mutex<HashMap<String, SignInScript>>,
    /// Live sessions: access token -> user. `sign_out` removes entries,
    /// so a signed-out token no longer resolves.
    pub sessions: Mutex<HashMap<String, ProviderUser>>,
    pub sign_in_calls: AtomicUsize,
    pub sign_out_calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self {
            password_script: Mutex::new(SignInScript::Reject("not scripted".to_string())),
            exchange_scripts: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn script_password(&self, script: SignInScript) {
        *self.password_script.lock().unwrap() = script;
    }

    #[allow(dead_code)]
    pub fn script_exchange(&self, code: &str, script: SignInScript) {
        self.exchange_scripts
            .lock()
            .unwrap()
            .insert(code.to_string(), script);
    }

    /// Register a live session so `get_user` resolves its token.
    #[allow(dead_code)]
    pub fn register_session(&self, access_token: &str, user: ProviderUser) {
        self.sessions
            .lock()
            .unwrap()
            .insert(access_token.to_string(), user);
    }

    fn run_script(&self, script: SignInScript) -> Result<SignInOutcome, IdentityError> {
        match script {
            SignInScript::Reject(msg) => Err(IdentityError::Rejected(msg)),
            SignInScript::Success { user, session } => {
                // Successful sign-ins become live sessions
                if let (Some(user), Some(session)) = (&user, &session) {
                    self.register_session(&session.access_token, user.clone());
                }
                Ok(SignInOutcome { user, session })
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<SignInOutcome, IdentityError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.password_script.lock().unwrap().clone();
        self.run_script(script)
    }

    async fn exchange_code(&self, code: &str) -> Result<SignInOutcome, IdentityError> {
        let script = self
            .exchange_scripts
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or_else(|| SignInScript::Reject("invalid code".to_string()));
        self.run_script(script)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, IdentityError> {
        Ok(self.sessions.lock().unwrap().get(access_token).cloned())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.sessions.lock().unwrap().remove(access_token);
        self.sign_out_calls
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }
}

// ─── Profile store fake ──────────────────────────────────────

pub struct FakeProfileStore {
    pub profiles: Mutex<HashMap<String, Profile>>,
    pub five_q: Mutex<HashMap<String, FiveQSubmission>>,
    pub cvs: Mutex<HashMap<String, CvRecord>>,
    pub insert_count: AtomicUsize,
    /// Simulate losing the uniqueness race on insert
    pub fail_creates: AtomicBool,
    /// Simulate a store outage on reads (admin lookup best-effort test)
    pub fail_reads: AtomicBool,
}

impl FakeProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            five_q: Mutex::new(HashMap::new()),
            cvs: Mutex::new(HashMap::new()),
            insert_count: AtomicUsize::new(0),
            fail_creates: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    #[allow(dead_code)]
    pub fn insert_profile(&self, user_id: &str, is_admin: bool, registered: bool) {
        let now = Utc::now();
        self.profiles.lock().unwrap().insert(
            user_id.to_string(),
            Profile {
                user_id: user_id.to_string(),
                email: format!("{user_id}@example.test"),
                full_name: "Test User".to_string(),
                is_admin,
                registered_at: registered.then_some(now),
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.check_reads()?;
        Ok(self.profiles.lock().unwrap().get(user_id).cloned())
    }

    async fn create_profile(&self, new: &NewProfile) -> Result<Profile, StoreError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Conflict);
        }

        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(&new.user_id) {
            // Uniqueness constraint: exactly one row per user id
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let profile = Profile {
            user_id: new.user_id.clone(),
            email: new.email.clone(),
            full_name: new.full_name.clone(),
            is_admin: false,
            registered_at: None,
            created_at: now,
            updated_at: now,
        };
        profiles.insert(new.user_id.clone(), profile.clone());
        self.insert_count.fetch_add(1, Ordering::SeqCst);
        Ok(profile)
    }

    async fn set_registered_at(
        &self,
        user_id: &str,
        at: chrono::DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::Protocol("no such profile".to_string()))?;
        profile.registered_at = Some(at);
        profile.updated_at = at;
        Ok(())
    }

    async fn get_five_q(&self, user_id: &str) -> Result<Option<FiveQSubmission>, StoreError> {
        self.check_reads()?;
        Ok(self.five_q.lock().unwrap().get(user_id).cloned())
    }

    async fn get_cv(&self, user_id: &str) -> Result<Option<CvRecord>, StoreError> {
        self.check_reads()?;
        Ok(self.cvs.lock().unwrap().get(user_id).cloned())
    }
}

// ─── App factory and helpers ─────────────────────────────────

/// Create a test app wired to fresh fakes.
/// Returns the router plus handles to both fakes for scripting.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<FakeIdentity>, Arc<FakeProfileStore>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<FakeIdentity>, Arc<FakeProfileStore>) {
    let identity = Arc::new(FakeIdentity::new());
    let profiles = Arc::new(FakeProfileStore::new());

    let state = Arc::new(AppState {
        config,
        identity: identity.clone(),
        profiles: profiles.clone(),
    });

    (create_router(state), identity, profiles)
}

#[allow(dead_code)]
pub fn provider_user(id: &str, email: &str) -> ProviderUser {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": email,
        "user_metadata": {}
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn provider_user_with_metadata(id: &str, metadata: serde_json::Value) -> ProviderUser {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": format!("{id}@example.test"),
        "user_metadata": metadata
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn session(access_token: &str) -> Session {
    serde_json::from_value(serde_json::json!({
        "access_token": access_token,
        "refresh_token": format!("{access_token}-refresh"),
        "expires_in": 3600
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response<axum::body::Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn location(response: &Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn json_body(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
