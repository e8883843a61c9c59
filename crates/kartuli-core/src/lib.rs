// ABOUTME: Core types and constants for the Kartuli admin gate
// ABOUTME: Foundation crate with error handling, short-code models and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

#![deny(unsafe_code)]

//! # Kartuli Core
//!
//! Foundation crate providing shared types and constants for the admin gate of
//! the Kartuli content platform. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `DatabaseError`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Content collections and the `ShortCode` identifier type

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Core data models (content collections, short codes)
pub mod models;
