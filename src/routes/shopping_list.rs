// ABOUTME: Shopping list route aggregating ingredients of meals in a date range
// ABOUTME: Loads the user's meals and linked options, then delegates to planning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::{
    constants::messages::NO_MEALS_IN_RANGE,
    database::meals::MealDateFilter,
    errors::{AppError, ErrorCode},
    planning::{build_shopping_list, parse_range},
    resources::ServerResources,
    utils::dates,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Query parameters for the shopping list
#[derive(Debug, Deserialize, Default)]
pub struct ShoppingListQuery {
    /// First day, `YYYY-MM-DD`
    pub start: Option<String>,
    /// Last day, `YYYY-MM-DD`
    pub end: Option<String>,
}

/// Shopping list routes
pub struct ShoppingListRoutes;

impl ShoppingListRoutes {
    /// Create shopping list routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/shopping-list", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/shopping-list
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ShoppingListQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources
            .auth_middleware
            .authenticate_request_with_headers(&headers)
            .await?;
        let (start, end) = parse_range(query.start.as_deref(), query.end.as_deref())?;

        let filter = MealDateFilter {
            start: Some(dates::start_of_day(start)),
            end: Some(dates::end_of_day(end)),
        };
        let meals = resources.database.meals().list(auth.user_id(), filter).await?;
        if meals.is_empty() {
            return Err(AppError::new(ErrorCode::ResourceNotFound, NO_MEALS_IN_RANGE));
        }

        let option_ids: Vec<i64> = meals
            .iter()
            .flat_map(|meal| meal.option_ids())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let options = resources.database.meal_options().get_many(&option_ids).await?;

        let list = build_shopping_list(start, end, &meals, &options);
        tracing::debug!(
            user_id = auth.user_id(),
            meals = list.meal_count,
            items = list.items.len(),
            "Built shopping list"
        );
        Ok((StatusCode::OK, Json(list)).into_response())
    }
}
