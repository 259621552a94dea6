// SPDX-License-Identifier: MIT

//! Rishta auth backend: login, OAuth callback and onboarding glue.
//!
//! This crate sits between the frontend and two external collaborators:
//! an identity provider (sessions, credential/OAuth verification) and a
//! profile store (onboarding and role state). Its job is to sequence the
//! auth flows correctly and to make sure provider session cookies survive
//! the trip back to the browser with sane attributes.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use config::Config;
use services::{IdentityProvider, ProfileStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
}
