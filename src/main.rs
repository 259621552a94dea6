// SPDX-License-Identifier: MIT

//! Rishta Auth API Server
//!
//! Auth and onboarding backend for the Rishta matrimonial app: password
//! login, OAuth callback handling and the onboarding state machine, with
//! session cookies re-asserted on every response that issues them.

use rishta_auth::{
    config::Config,
    services::{IdentityClient, RestProfileStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        production = config.production,
        "Starting Rishta Auth API"
    );

    // External collaborators: identity provider and profile store
    let identity = Arc::new(IdentityClient::new(
        config.provider_url.clone(),
        config.provider_anon_key.clone(),
    ));
    let profiles = Arc::new(RestProfileStore::new(
        config.provider_url.clone(),
        config.provider_anon_key.clone(),
        config.provider_service_key.clone(),
    ));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        identity,
        profiles,
    });

    // Build router
    let app = rishta_auth::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rishta_auth=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
