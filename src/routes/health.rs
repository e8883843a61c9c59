// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports service name and version for load balancer and uptime checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use axum::{routing::get, Json, Router};
use kartuli_core::constants::service_names;
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes() -> Router {
        Router::new().route("/health", get(health_handler))
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": service_names::KARTULI_ADMIN,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
