// ABOUTME: Route module organization for the admin gate HTTP endpoints
// ABOUTME: Assembles health, admin and short-link routers behind tracing and security headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! Route module
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the services in [`ServerResources`].

/// Admin API routes
pub mod admin;
/// Health check route
pub mod health;
/// Public short-link redirects
pub mod short_links;

pub use admin::AdminRoutes;
pub use health::HealthRoutes;
pub use short_links::ShortLinkRoutes;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::{apply_security_headers, create_request_span};
use crate::resources::ServerResources;

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AdminRoutes::routes(resources.clone()))
        .merge(ShortLinkRoutes::routes(resources.clone()))
        .layer(middleware::from_fn_with_state(
            resources,
            apply_security_headers,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
}
