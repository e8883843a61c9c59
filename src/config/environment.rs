// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses admin secrets, lockout policy, session lifetime and storage settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! Environment-based configuration management for production deployment

use crate::rate_limiting::LockoutPolicy;
use anyhow::{bail, Context, Result};
use chrono::Duration;
use kartuli_core::constants::{auth, network, short_codes};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use zeroize::Zeroizing;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        })
    }
}

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// A secret string that never shows up in `Debug` output and is wiped on drop
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    /// Wrap `value`
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the secret
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Admin authentication settings
#[derive(Debug, Clone)]
pub struct AdminAuthConfig {
    /// Shared admin password
    pub admin_password: SecretString,
    /// HMAC key for session tokens
    pub session_secret: SecretString,
    /// Session token lifetime
    pub session_ttl: Duration,
    /// Brute-force lockout policy
    pub lockout: LockoutPolicy,
}

/// Short-code allocation settings
#[derive(Debug, Clone, Copy)]
pub struct ShortIdConfig {
    /// Draws per generation call, and inserts per allocation
    pub max_attempts: u32,
}

impl Default for ShortIdConfig {
    fn default() -> Self {
        Self {
            max_attempts: short_codes::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// sqlx database URL
    pub database_url: String,
    /// Admin authentication
    pub auth: AdminAuthConfig,
    /// Short-code allocation
    pub short_ids: ShortIdConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to parse
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or a value fails to parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|v| !v.is_empty())
            .context("ADMIN_PASSWORD must be set")?;
        let session_secret = lookup("ADMIN_SESSION_SECRET")
            .filter(|v| !v.is_empty())
            .context("ADMIN_SESSION_SECRET must be set")?;
        if session_secret.len() < auth::MIN_SESSION_SECRET_BYTES {
            bail!(
                "ADMIN_SESSION_SECRET must be at least {} bytes",
                auth::MIN_SESSION_SECRET_BYTES
            );
        }

        let max_attempts: u32 = parse_var(
            "LOGIN_MAX_ATTEMPTS",
            &var_or("LOGIN_MAX_ATTEMPTS", &auth::DEFAULT_MAX_LOGIN_ATTEMPTS.to_string()),
        )?;
        if max_attempts == 0 {
            bail!("LOGIN_MAX_ATTEMPTS must be at least 1");
        }
        let lockout_minutes: i64 = parse_var(
            "LOGIN_LOCKOUT_MINUTES",
            &var_or("LOGIN_LOCKOUT_MINUTES", &auth::DEFAULT_LOCKOUT_MINUTES.to_string()),
        )?;
        let session_ttl_hours: i64 = parse_var(
            "SESSION_TTL_HOURS",
            &var_or("SESSION_TTL_HOURS", &auth::DEFAULT_SESSION_TTL_HOURS.to_string()),
        )?;
        if lockout_minutes <= 0 || session_ttl_hours <= 0 {
            bail!("LOGIN_LOCKOUT_MINUTES and SESSION_TTL_HOURS must be positive");
        }
        if lockout_minutes > auth::MAX_LOCKOUT_MINUTES {
            bail!(
                "LOGIN_LOCKOUT_MINUTES must be at most {}",
                auth::MAX_LOCKOUT_MINUTES
            );
        }
        if session_ttl_hours > auth::MAX_SESSION_TTL_HOURS {
            bail!(
                "SESSION_TTL_HOURS must be at most {}",
                auth::MAX_SESSION_TTL_HOURS
            );
        }
        let Some(lockout_duration) = Duration::try_minutes(lockout_minutes) else {
            bail!("LOGIN_LOCKOUT_MINUTES is out of range");
        };
        let Some(session_ttl) = Duration::try_hours(session_ttl_hours) else {
            bail!("SESSION_TTL_HOURS is out of range");
        };

        let short_id_attempts: u32 = parse_var(
            "SHORT_ID_MAX_ATTEMPTS",
            &var_or(
                "SHORT_ID_MAX_ATTEMPTS",
                &short_codes::DEFAULT_MAX_ATTEMPTS.to_string(),
            ),
        )?;
        if short_id_attempts == 0 {
            bail!("SHORT_ID_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            host: var_or("HOST", network::DEFAULT_HOST),
            http_port: parse_var(
                "HTTP_PORT",
                &var_or("HTTP_PORT", &network::DEFAULT_HTTP_PORT.to_string()),
            )?,
            environment: Environment::from_str_or_default(&var_or("ENVIRONMENT", "development")),
            log_level: LogLevel::from_str_or_default(&var_or("LOG_LEVEL", "info")),
            database_url: var_or("DATABASE_URL", network::DEFAULT_DATABASE_URL),
            auth: AdminAuthConfig {
                admin_password: SecretString::new(admin_password),
                session_secret: SecretString::new(session_secret),
                session_ttl,
                lockout: LockoutPolicy {
                    max_attempts,
                    lockout_duration,
                },
            },
            short_ids: ShortIdConfig {
                max_attempts: short_id_attempts,
            },
        })
    }

    /// Whether cookies must carry the `Secure` attribute
    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }

    /// Log a redacted summary of the configuration
    pub fn log_summary(&self) {
        info!(
            host = %self.host,
            http_port = self.http_port,
            environment = %self.environment,
            log_level = %self.log_level,
            database_url = %self.database_url,
            lockout_max_attempts = self.auth.lockout.max_attempts,
            lockout_minutes = self.auth.lockout.lockout_duration.num_minutes(),
            session_ttl_hours = self.auth.session_ttl.num_hours(),
            short_id_max_attempts = self.short_ids.max_attempts,
            "Configuration loaded"
        );
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("ADMIN_SESSION_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.auth.lockout.max_attempts, 5);
        assert_eq!(config.auth.lockout.lockout_duration, Duration::minutes(15));
        assert_eq!(config.auth.session_ttl, Duration::hours(24));
        assert_eq!(config.short_ids.max_attempts, 20);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_missing_password_is_an_error() {
        let err =
            ServerConfig::from_lookup(lookup(&[("ADMIN_SESSION_SECRET", SECRET)])).unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD"));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("ADMIN_SESSION_SECRET", "short"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn test_overrides_and_production_cookies() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("ADMIN_SESSION_SECRET", SECRET),
            ("ENVIRONMENT", "production"),
            ("HTTP_PORT", "9000"),
            ("LOGIN_MAX_ATTEMPTS", "3"),
            ("LOGIN_LOCKOUT_MINUTES", "30"),
        ]))
        .unwrap();

        assert_eq!(config.http_port, 9000);
        assert_eq!(config.auth.lockout.max_attempts, 3);
        assert_eq!(config.auth.lockout.lockout_duration, Duration::minutes(30));
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_bad_number_is_reported_with_key() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("ADMIN_SESSION_SECRET", SECRET),
            ("HTTP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
    }

    #[test]
    fn test_oversized_durations_are_errors() {
        for (key, value) in [
            ("SESSION_TTL_HOURS", "9223372036854775807"),
            ("LOGIN_LOCKOUT_MINUTES", "9223372036854775807"),
            ("SESSION_TTL_HOURS", "8761"),
            ("LOGIN_LOCKOUT_MINUTES", "525601"),
        ] {
            let err = ServerConfig::from_lookup(lookup(&[
                ("ADMIN_PASSWORD", "pw"),
                ("ADMIN_SESSION_SECRET", SECRET),
                (key, value),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}: {err}");
        }
    }

    #[test]
    fn test_one_year_bounds_are_accepted() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("ADMIN_SESSION_SECRET", SECRET),
            ("SESSION_TTL_HOURS", "8760"),
            ("LOGIN_LOCKOUT_MINUTES", "525600"),
        ]))
        .unwrap();
        assert_eq!(config.auth.session_ttl.num_days(), 365);
        assert_eq!(config.auth.lockout.lockout_duration.num_days(), 365);
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "hunter2"),
            ("ADMIN_SESSION_SECRET", SECRET),
        ]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("[REDACTED]"));
    }
}
