// ABOUTME: Re-exports the unified error types from kartuli-core
// ABOUTME: Lets server modules import errors as crate::errors without naming the core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

//! # Unified Error Handling System
//!
//! The types live in `kartuli-core` so storage and HTTP code share one
//! definition; see [`kartuli_core::errors`].

pub use kartuli_core::errors::{
    AppError, AppResult, DatabaseError, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
