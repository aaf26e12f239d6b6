// ABOUTME: Read-only listing of the seeded meal times
// ABOUTME: Clients use the ids or names when creating meal options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Meal time routes
pub struct MealTimeRoutes;

impl MealTimeRoutes {
    /// Create meal time routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/meal-times", get(Self::handle_list))
            .with_state(resources)
    }

    /// Handle GET /api/meal-times
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        resources
            .auth_middleware
            .authenticate_request_with_headers(&headers)
            .await?;

        let meal_times = resources.database.meal_times().list().await?;
        Ok((StatusCode::OK, Json(meal_times)).into_response())
    }
}
