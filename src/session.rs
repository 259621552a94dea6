// SPDX-License-Identifier: MIT

//! Session cookie propagation.
//!
//! The identity provider issues session cookies with attributes that do
//! not survive same-site redirects on our hosting setup. Every session
//! cookie we hand back to the browser is therefore re-asserted with a
//! fixed attribute set: `Path=/`, `SameSite=Lax`, `Secure` only in
//! production, `HttpOnly` and `Max-Age` preserved from the provider.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie attribute policy, derived from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Name prefix identifying provider session cookies (e.g. `sb-`)
    pub session_prefix: String,
    /// Set the `Secure` attribute (production only)
    pub secure: bool,
}

/// A cookie as the identity provider wants it set, before attribute
/// correction.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub http_only: bool,
    pub max_age_secs: i64,
}

/// Re-assert provider session cookies on the outgoing response.
///
/// Cookies whose name does not carry the session prefix are ignored.
/// Applying this twice with the same input is a no-op in effect: the jar
/// keeps one delta entry per cookie name.
pub fn propagate_session_cookies(
    jar: CookieJar,
    cookies: &[SessionCookie],
    settings: &CookieSettings,
) -> CookieJar {
    cookies
        .iter()
        .filter(|c| c.name.starts_with(&settings.session_prefix))
        .fold(jar, |jar, c| {
            let cookie = Cookie::build((c.name.clone(), c.value.clone()))
                .path("/")
                .same_site(SameSite::Lax)
                .secure(settings.secure)
                .http_only(c.http_only)
                .max_age(time::Duration::seconds(c.max_age_secs))
                .build();
            jar.add(cookie)
        })
}

/// Expire the session cookies on the outgoing response.
///
/// Used on sign-out paths so a browser that already holds session cookies
/// drops them. Removal attributes must match the creation attributes or
/// the browser keeps the original cookie.
pub fn remove_session_cookies(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .iter()
        .fold(jar, |jar, suffix| {
            let cookie = Cookie::build((format!("{}{}", settings.session_prefix, suffix), ""))
                .path("/")
                .same_site(SameSite::Lax)
                .secure(settings.secure)
                .http_only(true)
                .max_age(time::Duration::ZERO)
                .build();
            jar.add(cookie)
        })
}

/// Cookie name suffixes used by the provider for session transport.
pub const ACCESS_TOKEN_COOKIE: &str = "access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";

/// Full name of the access token cookie for a given policy.
pub fn access_token_cookie_name(settings: &CookieSettings) -> String {
    format!("{}{}", settings.session_prefix, ACCESS_TOKEN_COOKIE)
}
