// ABOUTME: Main library entry point for the Kartuli admin gate service
// ABOUTME: Admin authentication, CSRF, brute-force lockout and cross-collection short links
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

#![deny(unsafe_code)]

//! # Kartuli Admin Gate
//!
//! The guarded edge of the Kartuli content platform's admin panel, plus the
//! public short-link redirector.
//!
//! ## Architecture
//!
//! - **Admin**: password validation with per-IP lockout, signed session tokens
//! - **Security**: double-submit CSRF tokens, cookies, response headers
//! - **Short IDs**: six-digit codes unique across articles and prompts
//! - **Short links**: `/s/{code}` resolution with a fixed collection priority
//! - **Storage**: SQLite content store enforcing short-code uniqueness
//! - **Routes / middleware**: the axum HTTP surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use kartuli_admin::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Admin gate configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Admin password validation and session tokens
pub mod admin;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// Content storage backends
pub mod database_plugins;

/// Unified error handling
pub mod errors;

/// Structured logging setup and helpers
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Login attempt tracking and lockout
pub mod rate_limiting;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// CSRF, cookies and security headers
pub mod security;

/// Short-code generation and allocation
pub mod short_ids;

/// Short-link resolution
pub mod short_links;

/// Request helpers
pub mod utils;
