// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Root banner, liveness and a readiness probe that pings the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Health check routes
//!
//! `GET /` answers with the service banner, `/health` reports liveness and
//! `/ready` only succeeds while the database answers.

use crate::constants::{
    endpoints::{HEALTH, READY},
    messages::API_RUNNING,
    service_names::MEALPLAN_SERVER,
};
use crate::resources::ServerResources;
use crate::utils::dates;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_root))
            .route(HEALTH, get(Self::handle_health))
            .route(READY, get(Self::handle_ready))
            .with_state(resources)
    }

    fn timestamp() -> String {
        dates::format_timestamp(&dates::now())
    }

    async fn handle_root() -> Response {
        Json(json!({
            "message": API_RUNNING,
            "status": "ok",
            "timestamp": Self::timestamp(),
        }))
        .into_response()
    }

    async fn handle_health() -> Response {
        Json(json!({
            "status": "healthy",
            "service": MEALPLAN_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Self::timestamp(),
        }))
        .into_response()
    }

    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> Response {
        match resources.database.ping().await {
            Ok(()) => Json(json!({
                "status": "ready",
                "timestamp": Self::timestamp(),
            }))
            .into_response(),
            Err(e) => {
                tracing::warn!("Readiness check failed: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "status": "unavailable",
                        "timestamp": Self::timestamp(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
