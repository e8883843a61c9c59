// ABOUTME: Structured error types for content storage operations
// ABOUTME: Separates uniqueness-constraint rejections from generic storage faults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use super::{AppError, ErrorCode};

/// Errors raised by content storage backends
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The short code is already held by some content item in either collection
    #[error("short code {code} is already assigned")]
    DuplicateShortCode {
        /// The rejected code
        code: String,
    },

    /// A content item with this slug already exists in the collection
    #[error("slug '{slug}' already exists in {collection}")]
    DuplicateSlug {
        /// Collection name
        collection: String,
        /// The rejected slug
        slug: String,
    },

    /// The content item already carries a short code; codes are never replaced
    #[error("{collection} {id} already has a short code")]
    ShortCodeAlreadyAssigned {
        /// Collection name
        collection: String,
        /// Content id
        id: String,
    },

    /// The addressed row does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Stored data could not be decoded into a domain type
    #[error("invalid stored value for {field}: {reason}")]
    InvalidData {
        /// Column name
        field: &'static str,
        /// Decoding failure
        reason: String,
    },

    /// Underlying driver failure
    #[cfg(feature = "database-errors")]
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Whether retrying with a fresh short code can succeed
    #[must_use]
    pub const fn is_short_code_conflict(&self) -> bool {
        matches!(self, Self::DuplicateShortCode { .. })
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::DuplicateShortCode { .. } => Self::new(
                ErrorCode::ResourceUnavailable,
                "Short code allocation collided, please retry",
            ),
            DatabaseError::DuplicateSlug { .. }
            | DatabaseError::ShortCodeAlreadyAssigned { .. } => {
                Self::new(ErrorCode::ResourceAlreadyExists, error.to_string())
            }
            DatabaseError::NotFound { entity, .. } => Self::not_found(entity),
            DatabaseError::InvalidData { .. } => {
                Self::database("Stored content is corrupted").with_source(error)
            }
            #[cfg(feature = "database-errors")]
            DatabaseError::Query(_) => {
                Self::database("Database operation failed").with_source(error)
            }
        }
    }
}
