// ABOUTME: Core types and constants for the meal planner API
// ABOUTME: Foundation crate with error handling and application-wide constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![deny(unsafe_code)]

//! # Meal Planner Core
//!
//! Shared types for the meal planner workspace. This crate changes rarely so the
//! server crate can rebuild without recompiling it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Validation limits, messages and service identifiers

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
