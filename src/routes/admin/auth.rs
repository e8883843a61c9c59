// ABOUTME: Admin login, logout, session status and CSRF issuance handlers
// ABOUTME: Maps password outcomes to 200/401/429 and manages the session and csrf cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    admin::ValidationOutcome,
    errors::{AppError, AppResult, ErrorCode},
    resources::ServerResources,
    security::cookies::{build_clear_cookie, build_set_cookie, get_cookie_value, CookieOptions},
    utils::client_ip::extract_client_ip,
};
use kartuli_core::constants::cookies;

use super::invalid_body;
use super::types::{
    CsrfTokenResponse, LoginRequest, LoginResponse, LogoutResponse, SessionStatusResponse,
};

/// Handle `POST /api/admin/login`
pub async fn handle_login(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(invalid_body)?;
    request.validate()?;

    let client_ip = extract_client_ip(&headers);
    let outcome = resources
        .password_validator
        .validate(&request.password, &client_ip)
        .await;

    match outcome {
        ValidationOutcome::Valid => {
            let session = resources.sessions.issue()?;
            let cookie = build_set_cookie(
                cookies::ADMIN_SESSION,
                &session.token,
                resources.cookie_options(),
            )?;
            info!(client_ip = %client_ip, "Admin session issued");
            Ok((
                AppendHeaders([(SET_COOKIE, cookie)]),
                Json(LoginResponse {
                    success: true,
                    expires_at: session.expires_at,
                }),
            )
                .into_response())
        }
        ValidationOutcome::Invalid { remaining_attempts } => Err(AppError::auth_invalid(
            "Invalid password",
        )
        .with_details(json!({ "remainingAttempts": remaining_attempts }))),
        ValidationOutcome::Locked {
            lockout_remaining_seconds,
        } => Err(AppError::new(
            ErrorCode::RateLimitExceeded,
            "Too many failed login attempts",
        )
        .with_details(json!({ "lockoutRemaining": lockout_remaining_seconds }))
        .with_retry_after(lockout_remaining_seconds)),
    }
}

/// Handle `POST /api/admin/logout`
pub async fn handle_logout(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Response> {
    let options = resources.cookie_options();
    let clear_session = build_clear_cookie(cookies::ADMIN_SESSION, options)?;
    let clear_csrf = build_clear_cookie(cookies::CSRF_TOKEN, csrf_cookie_options(options))?;

    Ok((
        AppendHeaders([(SET_COOKIE, clear_session), (SET_COOKIE, clear_csrf)]),
        Json(LogoutResponse { success: true }),
    )
        .into_response())
}

/// Handle `GET /api/admin/session`
pub async fn handle_session_status(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse> {
    let claims = get_cookie_value(&headers, cookies::ADMIN_SESSION)
        .and_then(|token| resources.sessions.verify(&token).ok());

    Json(SessionStatusResponse {
        authenticated: claims.is_some(),
        expires_at: claims.and_then(|c| c.expires_at()),
    })
}

/// Handle `GET /api/admin/csrf`
pub async fn handle_issue_csrf(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Response> {
    let token = resources.csrf.generate();
    let cookie = build_set_cookie(
        cookies::CSRF_TOKEN,
        &token,
        csrf_cookie_options(resources.cookie_options()),
    )?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(CsrfTokenResponse { csrf_token: token }),
    )
        .into_response())
}

/// The CSRF cookie stays readable by page scripts; the session cookie does not
const fn csrf_cookie_options(session: CookieOptions) -> CookieOptions {
    CookieOptions {
        http_only: false,
        ..session
    }
}
