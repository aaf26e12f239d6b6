// ABOUTME: Shared test helpers for the HTTP integration tests
// ABOUTME: Exports the oneshot request builder and app construction utilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
pub mod test_utils;
