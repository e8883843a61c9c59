// ABOUTME: Integration tests for the file-backed SQLite content store
// ABOUTME: Checks persistence across reconnects and code uniqueness under concurrent allocation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use kartuli_admin::{
    database_plugins::{ContentStore, SqliteContentStore},
    short_ids::UniqueIdGenerator,
    short_links::ShortLinkResolver,
};
use kartuli_core::models::{ContentCollection, NewContent};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

async fn open(dir: &TempDir) -> Result<Arc<SqliteContentStore>> {
    let url = format!("sqlite:{}", dir.path().join("kartuli.db").display());
    let store = SqliteContentStore::connect(&url).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

#[tokio::test]
async fn test_codes_survive_reconnect() -> Result<()> {
    common::init_test_logging();
    let dir = TempDir::new()?;

    let code = {
        let store = open(&dir).await?;
        let generator = UniqueIdGenerator::new(store.clone(), 20);
        let record = generator
            .create_with_short_code(&NewContent {
                collection: ContentCollection::Prompts,
                title: "Churchkhela recipe".to_owned(),
                slug: "churchkhela".to_owned(),
            })
            .await?;
        store.pool().close().await;
        record.short_code.unwrap()
    };

    let store = open(&dir).await?;
    assert!(store
        .short_code_exists(ContentCollection::Prompts, &code)
        .await?);

    let target = ShortLinkResolver::new(store).resolve(code.as_str()).await?;
    assert_eq!(target.location, "/prompts/churchkhela");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_allocations_stay_unique_in_storage() -> Result<()> {
    common::init_test_logging();
    let dir = TempDir::new()?;
    let store = open(&dir).await?;
    let generator = UniqueIdGenerator::new(store.clone(), 20);

    let mut handles = Vec::new();
    for i in 0..10 {
        let generator = generator.clone();
        handles.push(tokio::spawn(async move {
            let collection = if i % 2 == 0 {
                ContentCollection::Articles
            } else {
                ContentCollection::Prompts
            };
            generator
                .create_with_short_code(&NewContent {
                    collection,
                    title: format!("Item {i}"),
                    slug: format!("item-{i}"),
                })
                .await
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        let record = handle.await??;
        assert!(codes.insert(record.short_code.unwrap()));
    }
    assert_eq!(codes.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_backfill_against_sqlite() -> Result<()> {
    common::init_test_logging();
    let dir = TempDir::new()?;
    let store = open(&dir).await?;

    for i in 0..5 {
        store
            .insert_content(
                &NewContent {
                    collection: ContentCollection::Articles,
                    title: format!("Legacy {i}"),
                    slug: format!("legacy-{i}"),
                },
                None,
            )
            .await?;
    }

    let generator = UniqueIdGenerator::new(store.clone(), 20);
    let report = generator.backfill(ContentCollection::Articles).await?;
    assert_eq!(report.assigned, 5);
    assert!(store
        .list_missing_short_codes(ContentCollection::Articles, 10)
        .await?
        .is_empty());

    // A second run has nothing left to do
    let report = generator.backfill(ContentCollection::Articles).await?;
    assert_eq!(report.assigned, 0);
    Ok(())
}
