// ABOUTME: Main library entry point for the meal planner API server
// ABOUTME: Exposes configuration, storage, auth, planning and HTTP routing modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![deny(unsafe_code)]

//! # Meal Planner Server
//!
//! A JSON HTTP API for planning meals: users register, log in with a Bearer
//! token, record meals, browse a shared catalogue of meal options with
//! ingredients, aggregate shopping lists over date ranges, keep daily
//! caloric goals, generate daily plans against a calorie target and review
//! weekly calorie reports.
//!
//! ## Architecture
//!
//! - **config**: environment-driven [`config::ServerConfig`]
//! - **database**: `SQLite` managers, one per table family
//! - **auth** / **middleware**: HS256 tokens and Bearer checks
//! - **planning**: pure shopping list, meal plan and weekly report algorithms
//! - **routes** / **server**: axum routers and the HTTP server
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mealplan_server::config::ServerConfig;
//! use mealplan_server::resources::ServerResources;
//! use mealplan_server::server::MealPlanServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = ServerResources::from_config(config).await?;
//!     MealPlanServer::new(Arc::new(resources)).run().await
//! }
//! ```

/// Error types shared with the core crate
pub use mealplan_core::errors;

/// Constants shared with the core crate
pub use mealplan_core::constants;

/// JWT issuing and password hashing
pub mod auth;

/// Environment configuration
pub mod config;

/// `SQLite` storage
pub mod database;

/// Structured logging setup
pub mod logging;

/// Authentication, CORS and tracing middleware
pub mod middleware;

/// Shopping list and meal plan algorithms
pub mod planning;

/// Shared state for route handlers
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Small helpers for dates, JSON and auth headers
pub mod utils;
