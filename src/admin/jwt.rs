// ABOUTME: Signed, time-limited admin session tokens
// ABOUTME: Issues HS256 JWTs with a fixed admin subject and verifies them fail-closed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform
//! Admin Session Token Issuer
//!
//! Tokens are opaque strings to every caller. Verification checks signature,
//! issuer, subject and expiry; any failure becomes the same generic error so
//! the client never learns which check failed.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kartuli_core::constants::service_names::{ADMIN_SUBJECT, SESSION_ISSUER};
use kartuli_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Message returned for every session verification failure
const INVALID_SESSION: &str = "Invalid or expired session";

/// Claims carried by an admin session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer
    pub iss: String,
    /// Subject, always `admin`
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Token ID
    pub jti: String,
}

impl SessionClaims {
    /// Expiry as a timestamp
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A freshly minted session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed token for the session cookie
    pub token: String,
    /// When the token stops verifying
    pub expires_at: DateTime<Utc>,
}

/// HS256 session manager for the admin panel
#[derive(Clone)]
pub struct AdminSessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl AdminSessionManager {
    /// Create a manager signing with `secret`
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Session lifetime
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a session token valid from now
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails
    pub fn issue(&self) -> AppResult<IssuedSession> {
        self.issue_at(Utc::now())
    }

    /// Mint a session token as if issued at `now`
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails
    pub fn issue_at(&self, now: DateTime<Utc>) -> AppResult<IssuedSession> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            iss: SESSION_ISSUER.to_owned(),
            sub: ADMIN_SUBJECT.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign admin session: {e}")))?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Verify a session token
    ///
    /// # Errors
    /// Returns a generic `AuthInvalid` error for malformed, forged, expired or
    /// foreign-subject tokens alike
    pub fn verify(&self, token: &str) -> AppResult<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "Admin session rejected");
            AppError::auth_invalid(INVALID_SESSION)
        })?;

        if data.claims.sub != ADMIN_SUBJECT {
            debug!(subject = %data.claims.sub, "Admin session rejected: wrong subject");
            return Err(AppError::auth_invalid(INVALID_SESSION));
        }

        Ok(data.claims)
    }

    /// Whether `token` currently verifies
    #[must_use]
    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn manager() -> AdminSessionManager {
        AdminSessionManager::new(SECRET, Duration::hours(24))
    }

    #[test]
    fn test_issue_and_verify() {
        let manager = manager();
        let session = manager.issue().unwrap();
        let claims = manager.verify(&session.token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(
            claims.expires_at().unwrap().timestamp(),
            session.expires_at.timestamp()
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = manager();
        let session = manager
            .issue_at(Utc::now() - Duration::hours(25))
            .unwrap();
        let err = manager.verify(&session.token).unwrap_err();
        assert_eq!(err.message, INVALID_SESSION);
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let other =
            AdminSessionManager::new(b"another-secret-another-secret-xx", Duration::hours(24));
        let session = other.issue().unwrap();
        let err = manager().verify(&session.token).unwrap_err();
        assert_eq!(err.message, INVALID_SESSION);
    }

    #[test]
    fn test_garbage_is_rejected_with_same_message() {
        for token in ["", "not.a.jwt", "eyJhbGciOiJIUzI1NiJ9.e30.xxx"] {
            let err = manager().verify(token).unwrap_err();
            assert_eq!(err.message, INVALID_SESSION);
            assert_eq!(err.http_status(), 401);
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let manager = manager();
        let token = manager.issue().unwrap().token;
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = {
            use base64::Engine as _;
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(
                r#"{"iss":"kartuli-admin","sub":"admin","iat":0,"exp":99999999999,"jti":"x"}"#,
            )
        };
        parts[1] = &forged;
        assert!(!manager.is_valid(&parts.join(".")));
    }
}
