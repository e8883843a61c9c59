// ABOUTME: Admin authentication module organization and exports
// ABOUTME: Password validation with lockout and signed session tokens for the admin panel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform
//! Admin Authentication
//!
//! A login request reaches the [`AdminPasswordValidator`], which consults the
//! login attempt store; on success the [`AdminSessionManager`] mints the
//! session token that later requests carry in a cookie.

/// Signed session tokens for the admin panel
pub mod jwt;
/// Admin password validation with brute-force lockout
pub mod password;

/// Admin session issuer and verifier
pub use jwt::AdminSessionManager;
/// Minted session token
pub use jwt::IssuedSession;
/// Verified session claims
pub use jwt::SessionClaims;

/// Admin password validator
pub use password::AdminPasswordValidator;
/// Outcome of a password check
pub use password::ValidationOutcome;
