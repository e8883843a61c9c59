// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides test configuration, an in-memory content store with fault injection, and router helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `kartuli_admin`

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Response},
    Router,
};
use chrono::Utc;
use kartuli_admin::{
    config::ServerConfig,
    database_plugins::{ContentStore, SqliteContentStore, StoreResult},
    errors::DatabaseError,
    resources::ServerResources,
    routes::build_router,
};
use kartuli_core::models::{ContentCollection, ContentRecord, NewContent, ShortCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Admin password used by every test configuration
pub const TEST_ADMIN_PASSWORD: &str = "gamarjoba-admin-2025";

/// Session signing secret used by every test configuration
pub const TEST_SESSION_SECRET: &str = "test-session-secret-that-is-at-least-32-bytes";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Build a configuration from literal key/value pairs
pub fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    ServerConfig::from_lookup(|key| vars.get(key).cloned())
}

/// Standard test configuration
pub fn test_config() -> ServerConfig {
    config_from(&[
        ("ADMIN_PASSWORD", TEST_ADMIN_PASSWORD),
        ("ADMIN_SESSION_SECRET", TEST_SESSION_SECRET),
        ("ENVIRONMENT", "testing"),
    ])
    .expect("test configuration must load")
}

/// Fresh migrated in-memory SQLite store
pub async fn create_test_sqlite_store() -> Result<Arc<SqliteContentStore>> {
    init_test_logging();
    let store = SqliteContentStore::connect("sqlite::memory:").await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

/// Resources around `store` with the standard test configuration
pub fn create_test_resources(store: Arc<dyn ContentStore>) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::new(test_config(), store))
}

/// Router plus the resources behind it, backed by a mock store
pub fn create_test_app() -> (Router, Arc<ServerResources>, Arc<MockContentStore>) {
    let store = Arc::new(MockContentStore::new());
    let resources = create_test_resources(store.clone());
    (build_router(resources.clone()), resources, store)
}

/// Read a response body as JSON
pub async fn body_json(response: Response<Body>) -> Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Value of the `name` cookie set by `response`, if any
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            cookie
                .strip_prefix(&prefix)
                .and_then(|rest| rest.split(';').next())
                .map(str::to_owned)
        })
}

/// Every `Set-Cookie` header on `response`
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_owned))
        .collect()
}

#[derive(Default)]
struct MockState {
    records: HashMap<Uuid, ContentRecord>,
    claimed: HashMap<String, ContentCollection>,
}

/// In-memory [`ContentStore`] with hooks for forcing collisions
///
/// Codes are unique across both collections, like the SQLite registry.
#[derive(Default)]
pub struct MockContentStore {
    state: Mutex<MockState>,
    /// Writes still to be rejected as if another request claimed the code first
    forced_conflicts: AtomicU32,
    /// Report every code as taken
    saturated: AtomicBool,
    existence_checks: AtomicU32,
    write_attempts: AtomicU32,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` code-claiming writes with `DuplicateShortCode`
    pub fn force_conflicts(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    /// Make every existence check report the code as taken
    pub fn saturate(&self) {
        self.saturated.store(true, Ordering::SeqCst);
    }

    pub fn existence_checks(&self) -> u32 {
        self.existence_checks.load(Ordering::SeqCst)
    }

    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Insert an item directly, bypassing collision hooks
    pub fn seed(&self, collection: ContentCollection, slug: &str, code: Option<&str>) -> Uuid {
        let mut state = self.state.lock().unwrap();
        let short_code: Option<ShortCode> = code.map(|c| c.parse().unwrap());
        if let Some(code) = &short_code {
            state.claimed.insert(code.as_str().to_owned(), collection);
        }
        let record = ContentRecord {
            id: Uuid::new_v4(),
            collection,
            title: slug.replace('-', " "),
            slug: slug.to_owned(),
            short_code,
            created_at: Utc::now(),
        };
        let id = record.id;
        state.records.insert(id, record);
        id
    }

    /// Every assigned code, across both collections
    pub fn assigned_codes(&self) -> Vec<ShortCode> {
        let state = self.state.lock().unwrap();
        state
            .records
            .values()
            .filter_map(|r| r.short_code.clone())
            .collect()
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn migrate(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn short_code_exists(
        &self,
        collection: ContentCollection,
        code: &ShortCode,
    ) -> StoreResult<bool> {
        self.existence_checks.fetch_add(1, Ordering::SeqCst);
        if self.saturated.load(Ordering::SeqCst) {
            return Ok(true);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .values()
            .any(|r| r.collection == collection && r.short_code.as_ref() == Some(code)))
    }

    async fn find_slug_by_short_code(
        &self,
        collection: ContentCollection,
        code: &ShortCode,
    ) -> StoreResult<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .values()
            .find(|r| r.collection == collection && r.short_code.as_ref() == Some(code))
            .map(|r| r.slug.clone()))
    }

    async fn insert_content(
        &self,
        content: &NewContent,
        short_code: Option<&ShortCode>,
    ) -> StoreResult<ContentRecord> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = short_code {
            if self.take_forced_conflict() {
                return Err(DatabaseError::DuplicateShortCode {
                    code: code.to_string(),
                });
            }
        }

        let mut state = self.state.lock().unwrap();
        if state
            .records
            .values()
            .any(|r| r.collection == content.collection && r.slug == content.slug)
        {
            return Err(DatabaseError::DuplicateSlug {
                collection: content.collection.to_string(),
                slug: content.slug.clone(),
            });
        }
        if let Some(code) = short_code {
            if state.claimed.contains_key(code.as_str()) {
                return Err(DatabaseError::DuplicateShortCode {
                    code: code.to_string(),
                });
            }
            state
                .claimed
                .insert(code.as_str().to_owned(), content.collection);
        }

        let record = ContentRecord {
            id: Uuid::new_v4(),
            collection: content.collection,
            title: content.title.clone(),
            slug: content.slug.clone(),
            short_code: short_code.cloned(),
            created_at: Utc::now(),
        };
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn set_short_code(
        &self,
        collection: ContentCollection,
        id: Uuid,
        code: &ShortCode,
    ) -> StoreResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.take_forced_conflict() {
            return Err(DatabaseError::DuplicateShortCode {
                code: code.to_string(),
            });
        }

        let mut state = self.state.lock().unwrap();
        if state.claimed.contains_key(code.as_str()) {
            return Err(DatabaseError::DuplicateShortCode {
                code: code.to_string(),
            });
        }
        let record = match state.records.get_mut(&id) {
            Some(record) if record.collection == collection => record,
            _ => {
                return Err(DatabaseError::NotFound {
                    entity: "Content item",
                    id: id.to_string(),
                })
            }
        };
        if record.short_code.is_some() {
            return Err(DatabaseError::ShortCodeAlreadyAssigned {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        record.short_code = Some(code.clone());
        state.claimed.insert(code.as_str().to_owned(), collection);
        Ok(())
    }

    async fn list_missing_short_codes(
        &self,
        collection: ContentCollection,
        limit: i64,
    ) -> StoreResult<Vec<ContentRecord>> {
        let state = self.state.lock().unwrap();
        let mut missing: Vec<ContentRecord> = state
            .records
            .values()
            .filter(|r| r.collection == collection && r.short_code.is_none())
            .cloned()
            .collect();
        missing.sort_by_key(|r| r.created_at);
        missing.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(missing)
    }

    async fn get_content(
        &self,
        collection: ContentCollection,
        id: Uuid,
    ) -> StoreResult<Option<ContentRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .get(&id)
            .filter(|r| r.collection == collection)
            .cloned())
    }
}
