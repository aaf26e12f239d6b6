// ABOUTME: Generic authentication utilities for bearer token extraction
// ABOUTME: Keeps Authorization header parsing in one place for middleware and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::errors::{AppError, AppResult};

/// Extract bearer token from Authorization header string
///
/// # Errors
///
/// Returns an error if:
/// - Authorization header doesn't start with "Bearer "
/// - Token is empty after extraction and trimming
pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Invalid authorization header format"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::auth_invalid("Empty bearer token"));
    }

    Ok(token)
}

/// Extract bearer token from optional Authorization header
///
/// # Errors
///
/// Returns an error if the header is missing, malformed or empty
pub fn extract_bearer_token_from_option(auth_header: Option<&str>) -> AppResult<&str> {
    let header = auth_header.ok_or_else(AppError::auth_required)?;
    extract_bearer_token(header)
}
