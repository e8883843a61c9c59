// ABOUTME: Content storage abstraction for the articles and prompts collections
// ABOUTME: Async trait implemented by the SQLite backend and by in-memory test doubles

//! # Content Storage
//!
//! The admin gate only needs a thin slice of the content schema: titles,
//! slugs and the short codes that make up the shared short-link namespace.
//! Uniqueness of short codes across both collections is a storage-layer
//! guarantee; callers that propose codes must be ready for
//! [`DatabaseError::DuplicateShortCode`] and retry with a fresh code.

use async_trait::async_trait;
use kartuli_core::errors::DatabaseError;
use kartuli_core::models::{ContentCollection, ContentRecord, NewContent, ShortCode};
use uuid::Uuid;

pub mod sqlite;

pub use sqlite::SqliteContentStore;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, DatabaseError>;

/// Core content storage trait
///
/// All storage implementations must implement this trait so the generator,
/// resolver and routes stay backend-agnostic.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create tables and indexes if missing
    async fn migrate(&self) -> StoreResult<()>;

    /// Whether `code` is held by any item in `collection`
    async fn short_code_exists(
        &self,
        collection: ContentCollection,
        code: &ShortCode,
    ) -> StoreResult<bool>;

    /// Slug of the item in `collection` holding `code`
    async fn find_slug_by_short_code(
        &self,
        collection: ContentCollection,
        code: &ShortCode,
    ) -> StoreResult<Option<String>>;

    /// Insert a content item, optionally claiming `short_code` atomically with it
    ///
    /// Fails with `DuplicateShortCode` if the code is already held in either
    /// collection, and with `DuplicateSlug` if the slug is taken.
    async fn insert_content(
        &self,
        content: &NewContent,
        short_code: Option<&ShortCode>,
    ) -> StoreResult<ContentRecord>;

    /// Assign `code` to an item that has none yet
    ///
    /// Fails with `ShortCodeAlreadyAssigned` if the item already carries a code,
    /// `NotFound` if it does not exist, and `DuplicateShortCode` on collision.
    async fn set_short_code(
        &self,
        collection: ContentCollection,
        id: Uuid,
        code: &ShortCode,
    ) -> StoreResult<()>;

    /// Up to `limit` items in `collection` without a short code, oldest first
    async fn list_missing_short_codes(
        &self,
        collection: ContentCollection,
        limit: i64,
    ) -> StoreResult<Vec<ContentRecord>>;

    /// Fetch one item
    async fn get_content(
        &self,
        collection: ContentCollection,
        id: Uuid,
    ) -> StoreResult<Option<ContentRecord>>;
}
