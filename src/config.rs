//! Application configuration loaded from environment variables.
//!
//! The production flag is resolved here once and threaded into the cookie
//! adapter as explicit configuration, so cookie behavior is testable
//! without mutating process environment.

use std::env;

use crate::session::CookieSettings;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL for redirects (login/register/onboarding pages)
    pub frontend_url: String,
    /// Identity provider base URL (also hosts the profile store REST API)
    pub provider_url: String,
    /// Publishable API key sent on every provider request
    pub provider_anon_key: String,
    /// Service-role key for elevated profile writes (RLS bypass)
    pub provider_service_key: String,
    /// Session cookie name prefix used by the provider
    pub session_cookie_prefix: String,
    /// True when running in production (`APP_ENV=production`)
    pub production: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            provider_url: env::var("PROVIDER_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("PROVIDER_URL"))?,
            provider_anon_key: env::var("PROVIDER_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PROVIDER_ANON_KEY"))?,
            provider_service_key: env::var("PROVIDER_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PROVIDER_SERVICE_KEY"))?,
            session_cookie_prefix: env::var("SESSION_COOKIE_PREFIX")
                .unwrap_or_else(|_| "sb-".to_string()),
            production: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }

    /// Cookie settings derived from this configuration.
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            session_prefix: self.session_cookie_prefix.clone(),
            secure: self.production,
        }
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            provider_url: "http://localhost:54321".to_string(),
            provider_anon_key: "test_anon_key".to_string(),
            provider_service_key: "test_service_key".to_string(),
            session_cookie_prefix: "sb-".to_string(),
            production: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
