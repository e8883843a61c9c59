// ABOUTME: Resolves shared short codes to canonical article or prompt paths
// ABOUTME: Normalizes user-typed codes and applies the fixed articles-before-prompts priority
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use crate::database_plugins::ContentStore;
use crate::errors::{AppError, AppResult};
use kartuli_core::constants::short_codes::CODE_LEN;
use kartuli_core::models::{ContentCollection, ShortCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

/// Where a short link points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectTarget {
    /// Collection that holds the code
    pub collection: ContentCollection,
    /// Slug of the matching item
    pub slug: String,
    /// Canonical public path
    pub location: String,
}

/// Turn user-typed input into a short code
///
/// Accepts surrounding whitespace, one leading `#`, `/`, `-` or `s/`, and
/// `-`, `.` or whitespace used as digit grouping (`482-913`, `482 913`).
/// Anything that does not reduce to exactly six digits is `None`.
#[must_use]
pub fn normalize(raw: &str) -> Option<ShortCode> {
    let trimmed = raw.trim();
    let unprefixed = ["s/", "#", "/", "-"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    let digits: String = unprefixed
        .chars()
        .filter(|c| !(c.is_whitespace() || *c == '-' || *c == '.'))
        .collect();

    if digits.len() != CODE_LEN {
        return None;
    }
    digits.parse().ok()
}

/// Looks short codes up across both collections
#[derive(Clone)]
pub struct ShortLinkResolver {
    store: Arc<dyn ContentStore>,
}

impl ShortLinkResolver {
    /// Create a resolver over `store`
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve `raw` to a redirect target
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for malformed or unknown codes, or a
    /// database error if a lookup fails
    pub async fn resolve(&self, raw: &str) -> AppResult<RedirectTarget> {
        let Some(code) = normalize(raw) else {
            debug!(input = %raw, "Rejected malformed short link");
            return Err(AppError::not_found("Short link"));
        };

        let (article, prompt) = tokio::try_join!(
            self.store
                .find_slug_by_short_code(ContentCollection::Articles, &code),
            self.store
                .find_slug_by_short_code(ContentCollection::Prompts, &code),
        )?;

        if let (Some(article_slug), Some(prompt_slug)) = (&article, &prompt) {
            error!(
                code = %code,
                article = %article_slug,
                prompt = %prompt_slug,
                "Short code held by both an article and a prompt"
            );
        }

        let hit = ContentCollection::RESOLUTION_ORDER
            .into_iter()
            .zip([article, prompt])
            .find_map(|(collection, slug)| slug.map(|slug| (collection, slug)));

        match hit {
            Some((collection, slug)) => {
                debug!(code = %code, %collection, slug = %slug, "Resolved short link");
                Ok(RedirectTarget {
                    location: collection.public_path(&slug),
                    collection,
                    slug,
                })
            }
            None => Err(AppError::not_found("Short link")),
        }
    }
}
