// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains shared helpers for bearer tokens, date parsing and JSON bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

/// Bearer token extraction
pub mod auth;
/// Date and timestamp parsing and formatting
pub mod dates;
/// JSON body helpers
pub mod json;
