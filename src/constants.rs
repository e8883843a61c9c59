// ABOUTME: Re-exports application constants from kartuli-core
// ABOUTME: Auth limits, cookie names, CSRF settings, short-code ranges and network defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

pub use kartuli_core::constants::{auth, cookies, csrf, network, service_names, short_codes};
