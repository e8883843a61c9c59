// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Exposes environment-driven server, admin auth and short-code settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform
//! Configuration module
//!
//! All settings come from environment variables (see [`environment::ServerConfig::from_env`]);
//! the server binary lets a few of them be overridden on the command line.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AdminAuthConfig, Environment, LogLevel, SecretString, ServerConfig, ShortIdConfig,
};
