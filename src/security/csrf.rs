// ABOUTME: CSRF (Cross-Site Request Forgery) token generation and double-submit verification
// ABOUTME: Tokens are random hex strings compared between the csrf cookie and the x-csrf-token header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! CSRF protection module
//!
//! Double-submit cookie pattern: the token is handed to the browser both as a
//! cookie and in a JSON body. A state-changing request is accepted only if it
//! echoes the cookie value in the `x-csrf-token` header, which a cross-site
//! page cannot read. No server-side token state is kept.

use kartuli_core::constants::csrf::TOKEN_BYTES;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Stateless CSRF token service
#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfTokenService;

impl CsrfTokenService {
    /// Create a new CSRF token service
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a new token: `TOKEN_BYTES` random bytes, hex encoded
    #[must_use]
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Verify a double-submitted token
    ///
    /// Both values must be present, non-empty and exactly equal.
    #[must_use]
    pub fn verify(&self, header_value: Option<&str>, cookie_value: Option<&str>) -> bool {
        match (header_value, cookie_value) {
            (Some(header), Some(cookie)) if !header.is_empty() && !cookie.is_empty() => {
                header.len() == cookie.len()
                    && bool::from(header.as_bytes().ct_eq(cookie.as_bytes()))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = CsrfTokenService::new().generate();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = CsrfTokenService::new();
        assert_ne!(service.generate(), service.generate());
    }

    #[test]
    fn test_verify_truth_table() {
        let service = CsrfTokenService::new();
        assert!(service.verify(Some("abc"), Some("abc")));
        assert!(!service.verify(Some("abc"), Some("xyz")));
        assert!(!service.verify(Some("abc"), Some("abcd")));
        assert!(!service.verify(Some("abc"), None));
        assert!(!service.verify(None, Some("abc")));
        assert!(!service.verify(None, None));
        assert!(!service.verify(Some(""), Some("")));
    }

    #[test]
    fn test_generated_token_round_trips_through_verify() {
        let service = CsrfTokenService::new();
        let token = service.generate();
        assert!(service.verify(Some(&token), Some(&token)));
    }
}
