// ABOUTME: Admin API route handlers for the admin panel gate
// ABOUTME: Wires login, CSRF issuance, session-guarded short-code tools and content creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! Admin routes
//!
//! Three groups with different guards:
//!
//! - public: login, session status, CSRF issuance
//! - session: short-code proposal (read-only, so no CSRF)
//! - session + CSRF: every state-changing admin endpoint
//!
//! The session guard runs before the CSRF guard, so an anonymous mutation is
//! answered with 401 rather than 403.

mod auth;
mod short_ids;
mod types;

pub use types::{
    BackfillRequest, CreateContentRequest, CsrfTokenResponse, GenerateIdResponse, LoginRequest,
    LoginResponse, LogoutResponse, SessionStatusResponse,
};

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    errors::{AppError, ErrorCode},
    middleware::{require_admin_session, require_csrf},
    resources::ServerResources,
};

/// Admin routes implementation (Axum)
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes (Axum)
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .merge(Self::public_routes(resources.clone()))
            .merge(Self::session_routes(resources.clone()))
            .merge(Self::mutation_routes(resources))
    }

    /// Routes reachable without a session
    fn public_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/login", post(auth::handle_login))
            .route("/api/admin/session", get(auth::handle_session_status))
            .route("/api/admin/csrf", get(auth::handle_issue_csrf))
            .with_state(resources)
    }

    /// Read-only routes behind the session guard
    fn session_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/short-ids/generate",
                get(short_ids::handle_generate_id),
            )
            .route_layer(middleware::from_fn_with_state(
                resources.clone(),
                require_admin_session,
            ))
            .with_state(resources)
    }

    /// State-changing routes behind the session and CSRF guards
    fn mutation_routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/logout", post(auth::handle_logout))
            .route(
                "/api/admin/short-ids/backfill",
                post(short_ids::handle_backfill),
            )
            .route("/api/admin/articles", post(short_ids::handle_create_article))
            .route("/api/admin/prompts", post(short_ids::handle_create_prompt))
            .route_layer(middleware::from_fn_with_state(resources.clone(), require_csrf))
            .route_layer(middleware::from_fn_with_state(
                resources.clone(),
                require_admin_session,
            ))
            .with_state(resources)
    }
}

/// Convert a JSON extraction failure into the standard error envelope
fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::new(
        ErrorCode::InvalidInput,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}
