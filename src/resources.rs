// ABOUTME: Centralized resource container for dependency injection into the HTTP layer
// ABOUTME: Builds the validator, session manager, CSRF service, generator and resolver once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! # Server Resources
//!
//! Every shared service is built once here and handed to axum as router
//! state. The login attempt store in particular is injected rather than
//! global, so tests get a fresh one per router.

use crate::admin::{AdminPasswordValidator, AdminSessionManager};
use crate::config::ServerConfig;
use crate::database_plugins::ContentStore;
use crate::rate_limiting::{InMemoryLoginAttemptStore, LoginAttemptStore};
use crate::security::cookies::CookieOptions;
use crate::security::csrf::CsrfTokenService;
use crate::security::SecurityConfig;
use crate::short_ids::UniqueIdGenerator;
use crate::short_links::ShortLinkResolver;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Content storage
    pub store: Arc<dyn ContentStore>,
    /// Per-IP login failure records
    pub login_attempts: Arc<dyn LoginAttemptStore>,
    /// Admin password check with lockout
    pub password_validator: Arc<AdminPasswordValidator>,
    /// Session token issuer and verifier
    pub sessions: Arc<AdminSessionManager>,
    /// CSRF token service
    pub csrf: CsrfTokenService,
    /// Short-code allocation
    pub short_ids: UniqueIdGenerator,
    /// Short-link lookup
    pub short_links: ShortLinkResolver,
    /// Response security headers
    pub security_headers: SecurityConfig,
}

impl ServerResources {
    /// Build resources with a fresh in-memory login attempt store
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn ContentStore>) -> Self {
        Self::with_login_store(config, store, Arc::new(InMemoryLoginAttemptStore::new()))
    }

    /// Build resources around an existing login attempt store
    #[must_use]
    pub fn with_login_store(
        config: ServerConfig,
        store: Arc<dyn ContentStore>,
        login_attempts: Arc<dyn LoginAttemptStore>,
    ) -> Self {
        let password_validator = Arc::new(AdminPasswordValidator::new(
            config.auth.admin_password.expose(),
            login_attempts.clone(),
            config.auth.lockout,
        ));
        let sessions = Arc::new(AdminSessionManager::new(
            config.auth.session_secret.expose().as_bytes(),
            config.auth.session_ttl,
        ));
        let short_ids = UniqueIdGenerator::new(store.clone(), config.short_ids.max_attempts);
        let short_links = ShortLinkResolver::new(store.clone());
        let security_headers = SecurityConfig::for_environment(config.environment);

        Self {
            config: Arc::new(config),
            store,
            login_attempts,
            password_validator,
            sessions,
            csrf: CsrfTokenService::new(),
            short_ids,
            short_links,
            security_headers,
        }
    }

    /// Attributes for the session and CSRF cookies
    #[must_use]
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions::session(
            self.config.secure_cookies(),
            self.sessions.ttl().num_seconds(),
        )
    }

    /// Periodically drop login records whose lockout has elapsed
    pub fn spawn_lockout_purge(&self, every: Duration) -> JoinHandle<()> {
        let store = self.login_attempts.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = store.purge_expired(Utc::now()).await;
                if purged > 0 {
                    debug!(purged, "Purged elapsed login lockouts");
                }
            }
        })
    }
}
