// ABOUTME: Six-digit short-code generation that is unique across articles and prompts
// ABOUTME: Proposes free codes, then inserts with storage-level uniqueness and retries on collision
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! # Short Codes
//!
//! [`UniqueIdGenerator::generate`] draws random codes and checks both
//! collections concurrently, returning the first code neither holds. That
//! check is only a proposal: two requests can be handed the same code. The
//! storage layer rejects the second insert, and the `create_with_short_code`
//! / `assign_short_code` loops then propose again.

use crate::database_plugins::ContentStore;
use crate::errors::{AppError, AppResult, DatabaseError, ErrorCode};
use crate::logging::AppLogger;
use kartuli_core::constants::short_codes::{BACKFILL_BATCH_SIZE, MAX_CODE, MIN_CODE};
use kartuli_core::models::{ContentCollection, ContentRecord, NewContent, ShortCode};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a backfill run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    /// Collection that was processed
    pub collection: ContentCollection,
    /// Items that received a code
    pub assigned: usize,
}

/// Proposes and allocates short codes
#[derive(Clone)]
pub struct UniqueIdGenerator {
    store: Arc<dyn ContentStore>,
    max_attempts: u32,
}

impl UniqueIdGenerator {
    /// Create a generator over `store`
    ///
    /// `max_attempts` bounds both the draws per proposal and the inserts per allocation.
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Attempt bound in force
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Propose a code that no article or prompt currently holds
    ///
    /// # Errors
    ///
    /// Returns `IDENTIFIER_EXHAUSTED` if every draw was taken, or a database
    /// error if an existence check fails
    pub async fn generate(&self) -> AppResult<ShortCode> {
        self.generate_with(|| rand::thread_rng().gen_range(MIN_CODE..=MAX_CODE))
            .await
    }

    /// Propose a code using `draw` as the source of candidates
    ///
    /// # Errors
    ///
    /// Returns `IDENTIFIER_EXHAUSTED` if every draw was taken, `INVALID_INPUT`
    /// if `draw` yields a number outside the six-digit range, or a database
    /// error if an existence check fails
    pub async fn generate_with<F>(&self, mut draw: F) -> AppResult<ShortCode>
    where
        F: FnMut() -> u32 + Send,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = ShortCode::from_number(draw())?;
            let (in_articles, in_prompts) = tokio::try_join!(
                self.store
                    .short_code_exists(ContentCollection::Articles, &candidate),
                self.store
                    .short_code_exists(ContentCollection::Prompts, &candidate),
            )?;

            if !in_articles && !in_prompts {
                debug!(code = %candidate, attempt, "Proposed short code");
                return Ok(candidate);
            }
            debug!(code = %candidate, attempt, "Short code candidate already taken");
        }

        AppLogger::log_short_code_event("generate", "any", self.max_attempts, false);
        Err(AppError::new(
            ErrorCode::IdentifierExhausted,
            format!(
                "Failed to generate a unique short code after {} attempts",
                self.max_attempts
            ),
        ))
    }

    /// Insert `content` together with a freshly allocated code
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` if every insert collided, or the
    /// underlying error for exhaustion, duplicate slugs and storage faults
    pub async fn create_with_short_code(&self, content: &NewContent) -> AppResult<ContentRecord> {
        let mut last_conflict = None;

        for attempt in 1..=self.max_attempts {
            let code = self.generate().await?;
            match self.store.insert_content(content, Some(&code)).await {
                Ok(record) => {
                    AppLogger::log_short_code_event(
                        "create",
                        content.collection.as_str(),
                        attempt,
                        true,
                    );
                    return Ok(record);
                }
                Err(e) if e.is_short_code_conflict() => {
                    warn!(
                        code = %code,
                        attempt,
                        collection = %content.collection,
                        "Short code claimed concurrently, retrying"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        AppLogger::log_short_code_event(
            "create",
            content.collection.as_str(),
            self.max_attempts,
            false,
        );
        Err(self.conflict_error(last_conflict))
    }

    /// Give an existing item without a code a freshly allocated one
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_UNAVAILABLE` if every assignment collided,
    /// `RESOURCE_ALREADY_EXISTS` if the item already has a code, and
    /// `RESOURCE_NOT_FOUND` if it does not exist
    pub async fn assign_short_code(
        &self,
        collection: ContentCollection,
        id: Uuid,
    ) -> AppResult<ShortCode> {
        let mut last_conflict = None;

        for attempt in 1..=self.max_attempts {
            let code = self.generate().await?;
            match self.store.set_short_code(collection, id, &code).await {
                Ok(()) => {
                    AppLogger::log_short_code_event("assign", collection.as_str(), attempt, true);
                    return Ok(code);
                }
                Err(e) if e.is_short_code_conflict() => {
                    warn!(
                        code = %code,
                        attempt,
                        %collection,
                        %id,
                        "Short code claimed concurrently, retrying"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        AppLogger::log_short_code_event("assign", collection.as_str(), self.max_attempts, false);
        Err(self.conflict_error(last_conflict))
    }

    /// Assign codes to every item in `collection` that lacks one
    ///
    /// Items that gain a code concurrently are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first allocation or storage failure
    pub async fn backfill(&self, collection: ContentCollection) -> AppResult<BackfillReport> {
        let mut assigned = 0;

        loop {
            let batch = self
                .store
                .list_missing_short_codes(collection, BACKFILL_BATCH_SIZE)
                .await?;
            if batch.is_empty() {
                break;
            }

            for record in batch {
                match self.assign_short_code(collection, record.id).await {
                    Ok(_) => assigned += 1,
                    Err(e) if e.code == ErrorCode::ResourceAlreadyExists => {
                        debug!(id = %record.id, "Item gained a short code concurrently");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(%collection, assigned, "Short code backfill complete");
        Ok(BackfillReport {
            collection,
            assigned,
        })
    }

    fn conflict_error(&self, last_conflict: Option<DatabaseError>) -> AppError {
        let error: AppError = last_conflict
            .unwrap_or(DatabaseError::DuplicateShortCode {
                code: String::new(),
            })
            .into();
        error.with_details(serde_json::json!({ "attempts": self.max_attempts }))
    }
}
