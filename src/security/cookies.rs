// ABOUTME: Cookie helpers for the admin session and CSRF double-submit cookies
// ABOUTME: Builds Set-Cookie values with strict attributes and reads cookies from request headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use http::{header, HeaderMap, HeaderValue};
use kartuli_core::errors::{AppError, AppResult};

/// Attributes applied to a cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    /// Hide from page scripts
    pub http_only: bool,
    /// Only send over HTTPS
    pub secure: bool,
    /// Lifetime in seconds
    pub max_age_secs: i64,
}

impl CookieOptions {
    /// Session cookie: `HttpOnly`, secure in production
    #[must_use]
    pub const fn session(secure: bool, max_age_secs: i64) -> Self {
        Self {
            http_only: true,
            secure,
            max_age_secs,
        }
    }
}

/// Build a `Set-Cookie` header value
///
/// Every cookie is `SameSite=Strict` and scoped to `/`.
///
/// # Errors
///
/// Returns an error if the name or value contains bytes not allowed in a header
pub fn build_set_cookie(name: &str, value: &str, options: CookieOptions) -> AppResult<HeaderValue> {
    let mut cookie = format!(
        "{name}={value}; Path=/; Max-Age={}; SameSite=Strict",
        options.max_age_secs.max(0)
    );
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid cookie header for {name}: {e}")))
}

/// Build a `Set-Cookie` value that deletes `name`
///
/// # Errors
///
/// Returns an error if the name contains bytes not allowed in a header
pub fn build_clear_cookie(name: &str, options: CookieOptions) -> AppResult<HeaderValue> {
    build_set_cookie(
        name,
        "",
        CookieOptions {
            max_age_secs: 0,
            ..options
        },
    )
}

/// Read the value of cookie `name` from the request `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}
