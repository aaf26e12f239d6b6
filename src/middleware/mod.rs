// ABOUTME: HTTP middleware for authentication, CORS and request tracing
// ABOUTME: Bearer token checks plus tower-http layers shared by every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

/// Bearer token authentication
pub mod auth;
/// Cross-origin configuration
pub mod cors;
/// Request ids and HTTP spans
pub mod tracing;

pub use auth::{AuthMiddleware, AuthResult};
pub use cors::setup_cors;
pub use self::tracing::{make_request_span, request_id_layers, REQUEST_ID_HEADER};
