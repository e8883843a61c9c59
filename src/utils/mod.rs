// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains shared HTTP request helpers used by routes and middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kartuli Platform

/// Client IP extraction from proxy headers
pub mod client_ip;
