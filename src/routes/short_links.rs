// ABOUTME: Public short-link redirect route
// ABOUTME: GET /s/{id} answers with a temporary redirect to the article or prompt path, or 404 JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Router,
};

use crate::{errors::AppResult, resources::ServerResources};

/// Short-link routes implementation
pub struct ShortLinkRoutes;

impl ShortLinkRoutes {
    /// Create the short-link routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/s/:id", get(handle_short_link))
            .with_state(resources)
    }
}

/// Handle `GET /s/{id}`
async fn handle_short_link(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let target = resources.short_links.resolve(&id).await?;
    Ok(Redirect::temporary(&target.location))
}
