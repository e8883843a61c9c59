// ABOUTME: Admin session guard for routes requiring an authenticated admin
// ABOUTME: Verifies the admin_session cookie and exposes the claims to handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use crate::admin::SessionClaims;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::security::cookies::get_cookie_value;
use crate::utils::client_ip::extract_client_ip;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use kartuli_core::constants::cookies;
use std::sync::Arc;
use tracing::debug;

/// Verified admin session, inserted into request extensions
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Claims of the presented token
    pub claims: SessionClaims,
}

/// Require a valid `admin_session` cookie
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` if the cookie is absent and `AUTH_INVALID` if the
/// token fails verification
pub async fn require_admin_session(
    State(resources): State<Arc<ServerResources>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = get_cookie_value(request.headers(), cookies::ADMIN_SESSION)
        .ok_or_else(AppError::auth_required)?;

    let claims = resources.sessions.verify(&token).inspect_err(|_| {
        debug!(
            client_ip = %extract_client_ip(request.headers()),
            path = %request.uri().path(),
            "Rejected admin session"
        );
    })?;

    request.extensions_mut().insert(AdminSession { claims });
    Ok(next.run(request).await)
}
