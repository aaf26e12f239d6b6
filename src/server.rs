// ABOUTME: HTTP server assembly for the meal planner API
// ABOUTME: Merges resource routers, applies tower layers and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Server
//!
//! [`MealPlanServer::router`] builds the complete axum application; tests
//! drive it directly with `tower::ServiceExt::oneshot`, the binary serves it
//! on a TCP listener.

use crate::errors::{AppError, ErrorCode};
use crate::middleware::{make_request_span, request_id_layers, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, CaloricGoalRoutes, HealthRoutes, MealOptionRoutes, MealRoutes, MealTimeRoutes,
    PlannerRoutes, ReportRoutes, ShoppingListRoutes, UserRoutes,
};
use anyhow::{Context, Result};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;
/// Per-request time limit
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint table logged at startup
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("GET", "/ready"),
    ("POST", "/api/register"),
    ("POST", "/api/login"),
    ("GET", "/api/user"),
    ("GET|POST", "/api/meals"),
    ("POST", "/api/meals/generate"),
    ("GET|PUT|DELETE", "/api/meals/:id"),
    ("GET", "/api/meal-times"),
    ("GET|POST", "/api/meal-options"),
    ("GET|PUT|DELETE", "/api/meal-options/:id"),
    ("GET", "/api/shopping-list"),
    ("GET", "/api/reports/weekly"),
    ("GET|POST", "/api/caloric-goals"),
    ("GET", "/api/caloric-goals/active"),
    ("GET|PUT|DELETE", "/api/caloric-goals/:id"),
];

/// The meal planner HTTP server
pub struct MealPlanServer {
    resources: Arc<ServerResources>,
}

impl MealPlanServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full router with middleware layers
    #[must_use]
    pub fn router(&self) -> Router {
        let resources = &self.resources;
        let (set_request_id, propagate_request_id) = request_id_layers();

        Router::new()
            .merge(HealthRoutes::routes(resources.clone()))
            .merge(AuthRoutes::routes(resources.clone()))
            .merge(UserRoutes::routes(resources.clone()))
            .merge(PlannerRoutes::routes(resources.clone()))
            .merge(MealRoutes::routes(resources.clone()))
            .merge(MealTimeRoutes::routes(resources.clone()))
            .merge(MealOptionRoutes::routes(resources.clone()))
            .merge(ShoppingListRoutes::routes(resources.clone()))
            .merge(ReportRoutes::routes(resources.clone()))
            .merge(CaloricGoalRoutes::routes(resources.clone()))
            .fallback(handle_not_found)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(setup_cors(&resources.config.cors))
            .layer(propagate_request_id)
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id)
    }

    /// Bind the configured address and serve until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(self.resources.config.host, self.resources.config.http_port);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr().context("Listener has no local address")?;
        info!("HTTP server listening on http://{local_addr}");
        for (method, path) in ENDPOINTS {
            info!("  {method:<15} {path}");
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_not_found() -> Response {
    AppError::new(ErrorCode::ResourceNotFound, "Route not found").into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
