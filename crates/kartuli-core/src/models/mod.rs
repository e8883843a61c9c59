// ABOUTME: Content collection and short-code domain types
// ABOUTME: ShortCode enforces the 6-digit shape; ContentCollection fixes resolution order and paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

use crate::constants::short_codes::{CODE_LEN, MAX_CODE, MIN_CODE};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The two content collections that share the short-code namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCollection {
    /// Blog posts and encyclopedia articles
    Articles,
    /// Marketplace prompts
    Prompts,
}

impl ContentCollection {
    /// Short-link resolution order: articles win over prompts
    pub const RESOLUTION_ORDER: [Self; 2] = [Self::Articles, Self::Prompts];

    /// Table / registry name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Articles => "articles",
            Self::Prompts => "prompts",
        }
    }

    /// Public path for a slug in this collection
    ///
    /// The slug is percent-encoded as a single path segment so Georgian
    /// slugs still yield an ASCII `Location` header.
    #[must_use]
    pub fn public_path(self, slug: &str) -> String {
        let segment = urlencoding::encode(slug);
        match self {
            Self::Articles => format!("/blog/{segment}"),
            Self::Prompts => format!("/prompts/{segment}"),
        }
    }
}

impl fmt::Display for ContentCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCollection {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "articles" => Ok(Self::Articles),
            "prompts" => Ok(Self::Prompts),
            other => Err(AppError::invalid_input(format!(
                "Unknown content collection: {other}"
            ))),
        }
    }
}

/// A 6-digit numeric identifier used for human-shareable short links
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Build a code from a number in `[100000, 999999]`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside the 6-digit range
    pub fn from_number(value: u32) -> AppResult<Self> {
        if (MIN_CODE..=MAX_CODE).contains(&value) {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::invalid_input(format!(
                "Short code {value} is outside {MIN_CODE}..={MAX_CODE}"
            )))
        }
    }

    /// Borrow the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortCode {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        if s.len() != CODE_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::invalid_input(format!(
                "Short code must be exactly {CODE_LEN} digits"
            )));
        }
        let value: u32 = s
            .parse()
            .map_err(|_| AppError::invalid_input("Short code is not numeric"))?;
        Self::from_number(value)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        value.parse()
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input for creating a content item
#[derive(Debug, Clone)]
pub struct NewContent {
    /// Target collection
    pub collection: ContentCollection,
    /// Display title
    pub title: String,
    /// URL slug, unique within the collection
    pub slug: String,
}

/// A stored content item as far as the admin gate cares about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Primary key
    pub id: Uuid,
    /// Owning collection
    pub collection: ContentCollection,
    /// Display title
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Assigned short code, if any
    pub short_code: Option<ShortCode>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
