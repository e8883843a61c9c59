// ABOUTME: Login attempt tracking and lockout state keyed by client IP
// ABOUTME: Provides the injectable LoginAttemptStore trait and its in-memory DashMap backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! # Login Attempt Store
//!
//! Failed admin logins are counted per client IP. Once the count reaches the
//! policy threshold the IP is locked out for a fixed window. The store is
//! constructed once at startup and handed to the password validator; nothing
//! here is a process-wide singleton.
//!
//! The in-memory backend resets on restart. A multi-instance deployment needs
//! a shared backend behind the same trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use kartuli_core::constants::auth::{DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_LOGIN_ATTEMPTS};
use serde::Serialize;

/// Lockout thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures allowed before the IP is locked
    pub max_attempts: u32,
    /// How long a lockout lasts
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            lockout_duration: Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        }
    }
}

/// Failure counter and lockout deadline for one client IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginAttemptRecord {
    /// Client IP the record belongs to
    pub ip: String,
    /// Consecutive failures since the last success or elapsed lockout
    pub failure_count: u32,
    /// Lockout deadline, set once `failure_count` reaches the threshold
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginAttemptRecord {
    fn new(ip: &str) -> Self {
        Self {
            ip: ip.to_owned(),
            failure_count: 0,
            locked_until: None,
        }
    }

    /// Whether a lockout is in force at `now`
    #[must_use]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Whether the lockout window has run out, making the record stale
    #[must_use]
    pub fn lockout_elapsed_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now >= until)
    }

    /// Whole seconds left in the lockout, rounded up, zero when not locked
    #[must_use]
    pub fn lockout_remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.locked_until.map_or(0, |until| {
            let millis = (until - now).num_milliseconds().max(0);
            u64::try_from((millis + 999) / 1000).unwrap_or(0)
        })
    }
}

/// Storage for login attempt records
#[async_trait]
pub trait LoginAttemptStore: Send + Sync {
    /// Current record for `ip`, if any
    async fn get(&self, ip: &str) -> Option<LoginAttemptRecord>;

    /// Count one failure for `ip` and return the updated record
    ///
    /// The increment and the lockout decision happen atomically per IP. A
    /// record whose lockout already elapsed starts counting from zero.
    async fn record_failure(
        &self,
        ip: &str,
        now: DateTime<Utc>,
        policy: &LockoutPolicy,
    ) -> LoginAttemptRecord;

    /// Forget everything about `ip`
    async fn clear(&self, ip: &str);

    /// Drop records whose lockout window has elapsed, returning how many went
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    /// Number of tracked IPs
    async fn len(&self) -> usize;

    /// Whether no IP is tracked
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// In-memory login attempt store backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryLoginAttemptStore {
    records: DashMap<String, LoginAttemptRecord>,
}

impl InMemoryLoginAttemptStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoginAttemptStore for InMemoryLoginAttemptStore {
    async fn get(&self, ip: &str) -> Option<LoginAttemptRecord> {
        self.records.get(ip).map(|entry| entry.value().clone())
    }

    async fn record_failure(
        &self,
        ip: &str,
        now: DateTime<Utc>,
        policy: &LockoutPolicy,
    ) -> LoginAttemptRecord {
        let mut entry = self
            .records
            .entry(ip.to_owned())
            .or_insert_with(|| LoginAttemptRecord::new(ip));

        if entry.lockout_elapsed_at(now) {
            *entry = LoginAttemptRecord::new(ip);
        }

        entry.failure_count = entry.failure_count.saturating_add(1);
        if entry.failure_count >= policy.max_attempts && entry.locked_until.is_none() {
            entry.locked_until = Some(now + policy.lockout_duration);
        }

        entry.value().clone()
    }

    async fn clear(&self, ip: &str) {
        self.records.remove(ip);
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.lockout_elapsed_at(now));
        before.saturating_sub(self.records.len())
    }

    async fn len(&self) -> usize {
        self.records.len()
    }
}
