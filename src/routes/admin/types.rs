// ABOUTME: Request and response types for admin routes
// ABOUTME: Typed login, CSRF, session, short-code and content DTOs validated at the HTTP boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! Admin request and response types
//!
//! Request bodies reject unknown fields, and each `validate` method turns the
//! raw body into the domain input before any service sees it.

use crate::errors::{AppError, AppResult, ErrorCode};
use chrono::{DateTime, Utc};
use kartuli_core::models::{ContentCollection, NewContent, ShortCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted title, in characters
pub const MAX_TITLE_CHARS: usize = 300;
/// Longest accepted slug, in characters
pub const MAX_SLUG_CHARS: usize = 200;

/// Admin login request
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Admin password
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginRequest {
    /// Reject an empty password before it reaches the validator
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` if the password is empty
    pub fn validate(&self) -> AppResult<()> {
        if self.password.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "Password is required",
            ));
        }
        Ok(())
    }
}

/// Successful login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Always true
    pub success: bool,
    /// When the issued session expires
    pub expires_at: DateTime<Utc>,
}

/// Logout acknowledgement
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true
    pub success: bool,
}

/// Session status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    /// Whether the request carries a valid admin session
    pub authenticated: bool,
    /// Expiry of that session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Freshly issued CSRF token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    /// Value to echo in the `x-csrf-token` header
    pub csrf_token: String,
}

/// Freshly proposed short code
#[derive(Debug, Serialize)]
pub struct GenerateIdResponse {
    /// Six-digit code
    pub code: ShortCode,
}

/// Backfill request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackfillRequest {
    /// Collection to backfill
    pub collection: ContentCollection,
}

/// Content creation request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateContentRequest {
    /// Display title
    pub title: String,
    /// URL slug
    pub slug: String,
}

impl CreateContentRequest {
    /// Validate and convert into a storage insert for `collection`
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` for blank fields and `INVALID_FORMAT`
    /// for over-long values or slugs that cannot appear in a path segment
    pub fn validate(self, collection: ContentCollection) -> AppResult<NewContent> {
        let title = self.title.trim();
        let slug = self.slug.trim();

        if title.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "Title is required",
            ));
        }
        if slug.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "Slug is required",
            ));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::new(
                ErrorCode::InvalidFormat,
                format!("Title must be at most {MAX_TITLE_CHARS} characters"),
            ));
        }
        if slug.chars().count() > MAX_SLUG_CHARS {
            return Err(AppError::new(
                ErrorCode::InvalidFormat,
                format!("Slug must be at most {MAX_SLUG_CHARS} characters"),
            ));
        }
        if slug
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err(AppError::new(
                ErrorCode::InvalidFormat,
                "Slug may not contain whitespace, '/', '?', '#' or '%'",
            ));
        }

        Ok(NewContent {
            collection,
            title: title.to_owned(),
            slug: slug.to_owned(),
        })
    }
}
