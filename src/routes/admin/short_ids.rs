// ABOUTME: Admin short-code and content creation handlers
// ABOUTME: Exposes code proposal, backfill, and article/prompt creation with allocated codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;

use crate::{
    errors::AppResult,
    middleware::AdminSession,
    resources::ServerResources,
    short_ids::BackfillReport,
};
use kartuli_core::models::{ContentCollection, ContentRecord};

use super::invalid_body;
use super::types::{BackfillRequest, CreateContentRequest, GenerateIdResponse};

/// Handle `GET /api/admin/short-ids/generate`
pub async fn handle_generate_id(
    State(resources): State<Arc<ServerResources>>,
) -> AppResult<Json<GenerateIdResponse>> {
    let code = resources.short_ids.generate().await?;
    Ok(Json(GenerateIdResponse { code }))
}

/// Handle `POST /api/admin/short-ids/backfill`
pub async fn handle_backfill(
    State(resources): State<Arc<ServerResources>>,
    Extension(session): Extension<AdminSession>,
    payload: Result<Json<BackfillRequest>, JsonRejection>,
) -> AppResult<Json<BackfillReport>> {
    let Json(request) = payload.map_err(invalid_body)?;
    info!(
        collection = %request.collection,
        session = %session.claims.jti,
        "Short code backfill requested"
    );
    let report = resources.short_ids.backfill(request.collection).await?;
    Ok(Json(report))
}

/// Handle `POST /api/admin/articles`
pub async fn handle_create_article(
    State(resources): State<Arc<ServerResources>>,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    create_content(&resources, ContentCollection::Articles, payload).await
}

/// Handle `POST /api/admin/prompts`
pub async fn handle_create_prompt(
    State(resources): State<Arc<ServerResources>>,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    create_content(&resources, ContentCollection::Prompts, payload).await
}

async fn create_content(
    resources: &ServerResources,
    collection: ContentCollection,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ContentRecord>)> {
    let Json(request) = payload.map_err(invalid_body)?;
    let content = request.validate(collection)?;

    let record = resources.short_ids.create_with_short_code(&content).await?;
    info!(
        %collection,
        id = %record.id,
        slug = %record.slug,
        short_code = ?record.short_code.as_ref().map(ToString::to_string),
        "Content created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}
