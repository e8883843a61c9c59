// ABOUTME: SQLite content store built on sqlx with a cross-collection short-code registry
// ABOUTME: Claims codes and writes content in one transaction so uniqueness holds under races
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! SQLite content store
//!
//! Articles and prompts live in separate tables, each with a `UNIQUE`
//! `short_code` column. A third table, `short_codes`, has the code as its
//! primary key and records which collection claimed it; every code assignment
//! inserts there first inside the same transaction as the content write, so a
//! code can never be held by two items even across collections.

use super::{ContentStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use kartuli_core::errors::DatabaseError;
use kartuli_core::models::{ContentCollection, ContentRecord, NewContent, ShortCode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// SQLite implementation of [`ContentStore`]
#[derive(Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    /// Connect to `database_url`, creating the file if needed
    ///
    /// In-memory databases are pinned to a single long-lived connection so
    /// every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the connection fails
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        info!(in_memory, "Connected to SQLite content store");
        Ok(Self { pool })
    }

    /// Get a reference to the pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate_collection(&self, collection: ContentCollection) -> StoreResult<()> {
        let table = collection.as_str();
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                short_code TEXT UNIQUE REFERENCES short_codes(code),
                created_at TEXT NOT NULL
            )
            "
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at)"
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert the registry row that makes `code` globally taken
    async fn claim_code(
        tx: &mut Transaction<'_, Sqlite>,
        code: &ShortCode,
        collection: ContentCollection,
        content_id: Uuid,
    ) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO short_codes (code, collection, content_id, claimed_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(code.as_str())
        .bind(collection.as_str())
        .bind(content_id.to_string())
        .bind(timestamp(Utc::now()))
        .execute(&mut **tx)
        .await
        .map_err(|e| classify_write_error(e, collection, None, Some(code)))?;
        Ok(())
    }

    fn row_to_record(row: &SqliteRow, collection: ContentCollection) -> StoreResult<ContentRecord> {
        let id_str: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id_str).map_err(|e| DatabaseError::InvalidData {
            field: "id",
            reason: e.to_string(),
        })?;

        let short_code = row
            .try_get::<Option<String>, _>("short_code")?
            .map(|raw| {
                raw.parse::<ShortCode>()
                    .map_err(|e| DatabaseError::InvalidData {
                        field: "short_code",
                        reason: e.message,
                    })
            })
            .transpose()?;

        let created_raw: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_raw)
            .map_err(|e| DatabaseError::InvalidData {
                field: "created_at",
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(ContentRecord {
            id,
            collection,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            short_code,
            created_at,
        })
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS short_codes (
                code TEXT PRIMARY KEY,
                collection TEXT NOT NULL CHECK (collection IN ('articles', 'prompts')),
                content_id TEXT NOT NULL,
                claimed_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        for collection in ContentCollection::RESOLUTION_ORDER {
            self.migrate_collection(collection).await?;
        }

        debug!("Content store migrations applied");
        Ok(())
    }

    async fn short_code_exists(
        &self,
        collection: ContentCollection,
        code: &ShortCode,
    ) -> StoreResult<bool> {
        let exists: i64 = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE short_code = $1)",
            collection.as_str()
        ))
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }

    async fn find_slug_by_short_code(
        &self,
        collection: ContentCollection,
        code: &ShortCode,
    ) -> StoreResult<Option<String>> {
        let slug = sqlx::query_scalar(&format!(
            "SELECT slug FROM {} WHERE short_code = $1",
            collection.as_str()
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(slug)
    }

    async fn insert_content(
        &self,
        content: &NewContent,
        short_code: Option<&ShortCode>,
    ) -> StoreResult<ContentRecord> {
        let record = ContentRecord {
            id: Uuid::new_v4(),
            collection: content.collection,
            title: content.title.clone(),
            slug: content.slug.clone(),
            short_code: short_code.cloned(),
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        if let Some(code) = short_code {
            Self::claim_code(&mut tx, code, record.collection, record.id).await?;
        }

        sqlx::query(&format!(
            "INSERT INTO {} (id, title, slug, short_code, created_at) VALUES ($1, $2, $3, $4, $5)",
            record.collection.as_str()
        ))
        .bind(record.id.to_string())
        .bind(&record.title)
        .bind(&record.slug)
        .bind(short_code.map(ShortCode::as_str))
        .bind(timestamp(record.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| classify_write_error(e, record.collection, Some(&record.slug), short_code))?;

        tx.commit().await?;
        Ok(record)
    }

    async fn set_short_code(
        &self,
        collection: ContentCollection,
        id: Uuid,
        code: &ShortCode,
    ) -> StoreResult<()> {
        let table = collection.as_str();
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction holds the write lock from the start.
        Self::claim_code(&mut tx, code, collection, id).await?;

        let updated = sqlx::query(&format!(
            "UPDATE {table} SET short_code = $1 WHERE id = $2 AND short_code IS NULL"
        ))
        .bind(code.as_str())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| classify_write_error(e, collection, None, Some(code)))?;

        if updated.rows_affected() == 0 {
            let exists: i64 =
                sqlx::query_scalar(&format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)"))
                    .bind(id.to_string())
                    .fetch_one(&mut *tx)
                    .await?;
            // Dropping the transaction rolls the registry claim back.
            return Err(if exists == 0 {
                DatabaseError::NotFound {
                    entity: "Content item",
                    id: id.to_string(),
                }
            } else {
                DatabaseError::ShortCodeAlreadyAssigned {
                    collection: table.to_owned(),
                    id: id.to_string(),
                }
            });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_missing_short_codes(
        &self,
        collection: ContentCollection,
        limit: i64,
    ) -> StoreResult<Vec<ContentRecord>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT id, title, slug, short_code, created_at
            FROM {}
            WHERE short_code IS NULL
            ORDER BY created_at, id
            LIMIT $1
            ",
            collection.as_str()
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Self::row_to_record(row, collection))
            .collect()
    }

    async fn get_content(
        &self,
        collection: ContentCollection,
        id: Uuid,
    ) -> StoreResult<Option<ContentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT id, title, slug, short_code, created_at FROM {} WHERE id = $1",
            collection.as_str()
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_record(&row, collection))
            .transpose()
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Turn unique-constraint failures into the domain errors callers branch on
fn classify_write_error(
    error: sqlx::Error,
    collection: ContentCollection,
    slug: Option<&str>,
    code: Option<&ShortCode>,
) -> DatabaseError {
    let unique_column = match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => Some(db.message().to_owned()),
        _ => None,
    };

    match (unique_column, slug, code) {
        (Some(message), Some(slug), _) if message.contains(".slug") => {
            DatabaseError::DuplicateSlug {
                collection: collection.as_str().to_owned(),
                slug: slug.to_owned(),
            }
        }
        (Some(message), _, Some(code))
            if message.contains("short_codes.code") || message.contains(".short_code") =>
        {
            DatabaseError::DuplicateShortCode {
                code: code.as_str().to_owned(),
            }
        }
        _ => DatabaseError::Query(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteContentStore {
        let store = SqliteContentStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn article(slug: &str) -> NewContent {
        NewContent {
            collection: ContentCollection::Articles,
            title: format!("Title for {slug}"),
            slug: slug.to_owned(),
        }
    }

    fn prompt(slug: &str) -> NewContent {
        NewContent {
            collection: ContentCollection::Prompts,
            title: format!("Prompt {slug}"),
            slug: slug.to_owned(),
        }
    }

    fn code(raw: &str) -> ShortCode {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = store().await;
        let record = store
            .insert_content(&article("mtskheta"), Some(&code("482913")))
            .await
            .unwrap();

        assert!(store
            .short_code_exists(ContentCollection::Articles, &code("482913"))
            .await
            .unwrap());
        assert!(!store
            .short_code_exists(ContentCollection::Prompts, &code("482913"))
            .await
            .unwrap());
        assert_eq!(
            store
                .find_slug_by_short_code(ContentCollection::Articles, &code("482913"))
                .await
                .unwrap()
                .as_deref(),
            Some("mtskheta")
        );

        let fetched = store
            .get_content(ContentCollection::Articles, record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.slug, "mtskheta");
        assert_eq!(fetched.short_code, Some(code("482913")));
    }

    #[tokio::test]
    async fn test_code_is_unique_across_collections() {
        let store = store().await;
        store
            .insert_content(&article("batumi"), Some(&code("111111")))
            .await
            .unwrap();

        let err = store
            .insert_content(&prompt("batumi-guide"), Some(&code("111111")))
            .await
            .unwrap_err();
        assert!(err.is_short_code_conflict(), "got {err:?}");

        // The failed transaction left nothing behind.
        assert!(store
            .list_missing_short_codes(ContentCollection::Prompts, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_slug() {
        let store = store().await;
        store.insert_content(&article("kutaisi"), None).await.unwrap();
        let err = store.insert_content(&article("kutaisi"), None).await.unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateSlug { .. }), "got {err:?}");

        // Same slug in the other collection is fine.
        store.insert_content(&prompt("kutaisi"), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_short_code_once() {
        let store = store().await;
        let record = store.insert_content(&prompt("svaneti"), None).await.unwrap();

        store
            .set_short_code(ContentCollection::Prompts, record.id, &code("222222"))
            .await
            .unwrap();

        let err = store
            .set_short_code(ContentCollection::Prompts, record.id, &code("333333"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::ShortCodeAlreadyAssigned { .. }));

        // 333333 was not leaked into the registry by the failed attempt.
        let other = store.insert_content(&prompt("tusheti"), None).await.unwrap();
        store
            .set_short_code(ContentCollection::Prompts, other.id, &code("333333"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_short_code_collision_and_missing_row() {
        let store = store().await;
        store
            .insert_content(&article("gori"), Some(&code("444444")))
            .await
            .unwrap();
        let record = store.insert_content(&prompt("gori"), None).await.unwrap();

        let err = store
            .set_short_code(ContentCollection::Prompts, record.id, &code("444444"))
            .await
            .unwrap_err();
        assert!(err.is_short_code_conflict());

        let err = store
            .set_short_code(ContentCollection::Prompts, Uuid::new_v4(), &code("555555"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_missing_short_codes_respects_limit() {
        let store = store().await;
        for i in 0..3 {
            store
                .insert_content(&article(&format!("post-{i}")), None)
                .await
                .unwrap();
        }
        store
            .insert_content(&article("coded"), Some(&code("666666")))
            .await
            .unwrap();

        let missing = store
            .list_missing_short_codes(ContentCollection::Articles, 2)
            .await
            .unwrap();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|r| r.short_code.is_none()));
    }
}
