// ABOUTME: CSRF validation middleware for state-changing HTTP requests
// ABOUTME: Rejects POST/PUT/PATCH/DELETE unless the x-csrf-token header matches the csrf cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! CSRF validation middleware
//!
//! Runs before the handler on protected routes. Safe methods pass through;
//! everything else needs the `x-csrf-token` header to equal the `csrf_token`
//! cookie, otherwise the request ends with 403 and the handler never runs.

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::security::cookies::get_cookie_value;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use kartuli_core::constants::{cookies, csrf::HEADER_NAME};
use std::sync::Arc;
use tracing::{debug, warn};

/// Check if request requires CSRF validation
#[must_use]
pub const fn requires_csrf_validation(method: &Method) -> bool {
    matches!(
        method,
        &Method::POST | &Method::PUT | &Method::DELETE | &Method::PATCH
    )
}

/// Validate the double-submitted CSRF token
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` if the header or cookie is missing or they differ
pub async fn require_csrf(
    State(resources): State<Arc<ServerResources>>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if !requires_csrf_validation(request.method()) {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    let header_token = headers.get(HEADER_NAME).and_then(|h| h.to_str().ok());
    let cookie_token = get_cookie_value(headers, cookies::CSRF_TOKEN);

    if !resources
        .csrf
        .verify(header_token, cookie_token.as_deref())
    {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            header_present = header_token.is_some(),
            cookie_present = cookie_token.is_some(),
            "CSRF token validation failed"
        );
        return Err(AppError::forbidden("Invalid CSRF token"));
    }

    debug!(method = %request.method(), "CSRF token validated");
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_methods_are_exempt() {
        assert!(!requires_csrf_validation(&Method::GET));
        assert!(!requires_csrf_validation(&Method::HEAD));
        assert!(!requires_csrf_validation(&Method::OPTIONS));
        assert!(requires_csrf_validation(&Method::POST));
        assert!(requires_csrf_validation(&Method::PUT));
        assert!(requires_csrf_validation(&Method::PATCH));
        assert!(requires_csrf_validation(&Method::DELETE));
    }
}
