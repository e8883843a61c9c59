// ABOUTME: Admin password validation with per-IP brute-force lockout
// ABOUTME: Compares against the configured secret in constant time and updates the login attempt store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! Admin Password Validator
//!
//! A single shared admin password guards the panel. Every check consults the
//! injected [`LoginAttemptStore`]: while an IP is locked out its attempts are
//! rejected without being compared or counted.

use crate::logging::AppLogger;
use crate::rate_limiting::{LockoutPolicy, LoginAttemptStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Result of a password check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ValidationOutcome {
    /// Password matched; the IP's failure streak was cleared
    Valid,
    /// Password did not match
    #[serde(rename_all = "camelCase")]
    Invalid {
        /// Failures left before lockout
        remaining_attempts: u32,
    },
    /// The IP is locked out
    #[serde(rename_all = "camelCase")]
    Locked {
        /// Seconds until the lockout ends
        lockout_remaining_seconds: u64,
    },
}

impl ValidationOutcome {
    /// Whether the password was accepted
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Whether the IP is locked out
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// Remaining attempts, for `Invalid` outcomes
    #[must_use]
    pub const fn remaining_attempts(self) -> Option<u32> {
        match self {
            Self::Invalid { remaining_attempts } => Some(remaining_attempts),
            _ => None,
        }
    }

    /// Remaining lockout seconds, for `Locked` outcomes
    #[must_use]
    pub const fn lockout_remaining_seconds(self) -> Option<u64> {
        match self {
            Self::Locked {
                lockout_remaining_seconds,
            } => Some(lockout_remaining_seconds),
            _ => None,
        }
    }
}

/// Validates the admin password and enforces lockouts
pub struct AdminPasswordValidator {
    secret_digest: Zeroizing<[u8; 32]>,
    store: Arc<dyn LoginAttemptStore>,
    policy: LockoutPolicy,
}

impl AdminPasswordValidator {
    /// Create a validator for `admin_password`
    #[must_use]
    pub fn new(
        admin_password: &str,
        store: Arc<dyn LoginAttemptStore>,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            secret_digest: Zeroizing::new(digest(admin_password)),
            store,
            policy,
        }
    }

    /// Lockout policy in force
    #[must_use]
    pub const fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Check `password` for `client_ip` at the current time
    pub async fn validate(&self, password: &str, client_ip: &str) -> ValidationOutcome {
        self.validate_at(password, client_ip, Utc::now()).await
    }

    /// Check `password` for `client_ip` as of `now`
    pub async fn validate_at(
        &self,
        password: &str,
        client_ip: &str,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        if let Some(record) = self.store.get(client_ip).await {
            if record.is_locked_at(now) {
                let remaining = record.lockout_remaining_secs(now);
                AppLogger::log_security_event(
                    "admin_login_while_locked",
                    "medium",
                    &format!("{remaining}s of lockout remaining"),
                    Some(client_ip),
                );
                return ValidationOutcome::Locked {
                    lockout_remaining_seconds: remaining,
                };
            }
            if record.lockout_elapsed_at(now) {
                self.store.clear(client_ip).await;
            }
        }

        if self.matches(password) {
            self.store.clear(client_ip).await;
            AppLogger::log_auth_event(client_ip, "admin_login", true, None);
            return ValidationOutcome::Valid;
        }

        let record = self
            .store
            .record_failure(client_ip, now, &self.policy)
            .await;

        if record.is_locked_at(now) {
            AppLogger::log_security_event(
                "admin_lockout",
                "high",
                &format!("{} consecutive failed admin logins", record.failure_count),
                Some(client_ip),
            );
            return ValidationOutcome::Locked {
                lockout_remaining_seconds: record.lockout_remaining_secs(now),
            };
        }

        let remaining_attempts = self.policy.max_attempts.saturating_sub(record.failure_count);
        AppLogger::log_auth_event(
            client_ip,
            "admin_login",
            false,
            Some(&format!("{remaining_attempts} attempts remaining")),
        );
        ValidationOutcome::Invalid { remaining_attempts }
    }

    /// Compare digests so neither content nor length leaks through timing
    fn matches(&self, password: &str) -> bool {
        let candidate = Zeroizing::new(digest(password));
        candidate[..].ct_eq(&self.secret_digest[..]).into()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiting::InMemoryLoginAttemptStore;
    use chrono::Duration;

    fn validator() -> (AdminPasswordValidator, Arc<InMemoryLoginAttemptStore>) {
        let store = Arc::new(InMemoryLoginAttemptStore::new());
        let validator =
            AdminPasswordValidator::new("gamarjoba-123", store.clone(), LockoutPolicy::default());
        (validator, store)
    }

    #[tokio::test]
    async fn test_correct_password_is_valid() {
        let (validator, _) = validator();
        let outcome = validator.validate("gamarjoba-123", "1.1.1.1").await;
        assert!(outcome.is_valid());
        assert!(!outcome.is_locked());
    }

    #[tokio::test]
    async fn test_wrong_password_counts_down() {
        let (validator, _) = validator();
        let now = Utc::now();

        let first = validator.validate_at("nope", "1.1.1.1", now).await;
        assert_eq!(first.remaining_attempts(), Some(4));

        let second = validator.validate_at("nope", "1.1.1.1", now).await;
        assert_eq!(second.remaining_attempts(), Some(3));
    }

    #[tokio::test]
    async fn test_prefix_of_secret_is_rejected() {
        let (validator, _) = validator();
        assert!(!validator.validate("gamarjoba", "1.1.1.1").await.is_valid());
        assert!(!validator.validate("", "1.1.1.1").await.is_valid());
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_and_sixth_is_not_counted() {
        let (validator, store) = validator();
        let now = Utc::now();

        for _ in 0..4 {
            assert!(!validator.validate_at("nope", "1.2.3.4", now).await.is_locked());
        }
        let fifth = validator.validate_at("nope", "1.2.3.4", now).await;
        assert_eq!(
            fifth,
            ValidationOutcome::Locked {
                lockout_remaining_seconds: 15 * 60
            }
        );

        let sixth = validator
            .validate_at("gamarjoba-123", "1.2.3.4", now + Duration::seconds(10))
            .await;
        assert!(sixth.is_locked());
        assert!(sixth.lockout_remaining_seconds().unwrap() > 0);
        assert_eq!(store.get("1.2.3.4").await.unwrap().failure_count, 5);
    }

    #[tokio::test]
    async fn test_lockout_lifts_after_window() {
        let (validator, store) = validator();
        let now = Utc::now();
        for _ in 0..5 {
            validator.validate_at("nope", "1.2.3.4", now).await;
        }

        let later = now + Duration::minutes(15) + Duration::seconds(1);
        let outcome = validator.validate_at("nope", "1.2.3.4", later).await;
        assert_eq!(outcome.remaining_attempts(), Some(4));
        assert_eq!(store.get("1.2.3.4").await.unwrap().failure_count, 1);
    }

    #[tokio::test]
    async fn test_success_resets_streak() {
        let (validator, store) = validator();
        let now = Utc::now();
        for _ in 0..3 {
            validator.validate_at("nope", "8.8.8.8", now).await;
        }
        assert!(validator.validate_at("gamarjoba-123", "8.8.8.8", now).await.is_valid());
        assert!(store.get("8.8.8.8").await.is_none());

        let after = validator.validate_at("nope", "8.8.8.8", now).await;
        assert_eq!(after.remaining_attempts(), Some(4));
    }

    #[tokio::test]
    async fn test_lockout_is_per_ip() {
        let (validator, _) = validator();
        let now = Utc::now();
        for _ in 0..5 {
            validator.validate_at("nope", "1.2.3.4", now).await;
        }
        assert!(validator
            .validate_at("gamarjoba-123", "5.6.7.8", now)
            .await
            .is_valid());
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let json = serde_json::to_value(ValidationOutcome::Invalid {
            remaining_attempts: 2,
        })
        .unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["remainingAttempts"], 2);
    }
}
