// ABOUTME: Security utilities for the admin gate HTTP surface
// ABOUTME: Groups CSRF tokens, cookie helpers and the response security-header policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! # Security
//!
//! Security headers applied to every response, plus the CSRF and cookie
//! submodules used by the admin routes.

/// Cookie building and parsing
pub mod cookies;
/// CSRF double-submit token service
pub mod csrf;

use crate::config::environment::Environment;
use http::{HeaderName, HeaderValue};

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Content Security Policy header value
    pub csp: &'static str,
    /// X-Frame-Options header value
    pub frame_options: &'static str,
    /// X-Content-Type-Options header value
    pub content_type_options: &'static str,
    /// Referrer-Policy header value
    pub referrer_policy: &'static str,
    /// Strict-Transport-Security header value (for HTTPS)
    pub hsts: Option<&'static str>,
}

impl SecurityConfig {
    /// Pick the policy for `environment`
    #[must_use]
    pub const fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Development | Environment::Testing => Self::development(),
        }
    }

    /// Development policy: no HSTS so plain HTTP keeps working
    #[must_use]
    pub const fn development() -> Self {
        Self {
            csp: "default-src 'none'; frame-ancestors 'none'",
            frame_options: "DENY",
            content_type_options: "nosniff",
            referrer_policy: "strict-origin-when-cross-origin",
            hsts: None,
        }
    }

    /// Production policy
    #[must_use]
    pub const fn production() -> Self {
        Self {
            hsts: Some("max-age=31536000; includeSubDomains"),
            ..Self::development()
        }
    }

    /// Headers to set on every response
    #[must_use]
    pub fn header_pairs(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (
                http::header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(self.csp),
            ),
            (
                http::header::X_FRAME_OPTIONS,
                HeaderValue::from_static(self.frame_options),
            ),
            (
                http::header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static(self.content_type_options),
            ),
            (
                http::header::REFERRER_POLICY,
                HeaderValue::from_static(self.referrer_policy),
            ),
        ];
        if let Some(hsts) = self.hsts {
            headers.push((
                http::header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(hsts),
            ));
        }
        headers
    }
}
