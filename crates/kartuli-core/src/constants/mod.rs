// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for authentication, cookies, short codes and routing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single list.

/// Service identity used in logs and health responses
pub mod service_names {
    /// Name of the admin gate service
    pub const KARTULI_ADMIN: &str = "kartuli-admin";
    /// Session token issuer claim
    pub const SESSION_ISSUER: &str = "kartuli-admin";
    /// Subject embedded in every admin session token
    pub const ADMIN_SUBJECT: &str = "admin";
}

/// Login lockout defaults
pub mod auth {
    /// Failed attempts allowed before an IP is locked out
    pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;
    /// Lockout window in minutes
    pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;
    /// Admin session lifetime in hours
    pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
    /// Upper bound for a configured lockout window (one year)
    pub const MAX_LOCKOUT_MINUTES: i64 = 525_600;
    /// Upper bound for a configured session lifetime (one year)
    pub const MAX_SESSION_TTL_HOURS: i64 = 8_760;
    /// Minimum length of the session signing secret in bytes
    pub const MIN_SESSION_SECRET_BYTES: usize = 32;
    /// Client IP used when no proxy header carries one
    pub const UNKNOWN_CLIENT_IP: &str = "unknown";
}

/// CSRF token parameters
pub mod csrf {
    /// Random bytes per token (hex-encoded to twice this many chars)
    pub const TOKEN_BYTES: usize = 32;
    /// Header that must echo the cookie value
    pub const HEADER_NAME: &str = "x-csrf-token";
}

/// Cookie names and lifetimes
pub mod cookies {
    /// Admin session cookie
    pub const ADMIN_SESSION: &str = "admin_session";
    /// Double-submit CSRF cookie
    pub const CSRF_TOKEN: &str = "csrf_token";
}

/// Short-code allocation parameters
pub mod short_codes {
    /// Smallest 6-digit code
    pub const MIN_CODE: u32 = 100_000;
    /// Largest 6-digit code
    pub const MAX_CODE: u32 = 999_999;
    /// Number of digits in a code
    pub const CODE_LEN: usize = 6;
    /// Bounded draws before the generator reports exhaustion
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
    /// Rows fetched per backfill batch
    pub const BACKFILL_BATCH_SIZE: i64 = 100;
}

/// Network defaults
pub mod network {
    /// Default bind host
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8080;
    /// Default database URL
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./kartuli.db";
    /// Interval between sweeps of elapsed lockout records
    pub const LOCKOUT_PURGE_INTERVAL_SECS: u64 = 300;
}
