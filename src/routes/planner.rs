// ABOUTME: Meal plan generation route choosing options against a calorie target
// ABOUTME: Falls back to the active caloric goal and can store the plan as a meal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Planner routes
//!
//! `POST /api/meals/generate` selects options from the catalogue for one day.
//! With `save=true` the plan becomes a regular meal of the caller with the
//! chosen options linked.

use crate::{
    database::meals::CreateMealRequest,
    errors::{AppError, ErrorCode},
    planning::{plan_meals, MealPlan, PlannedMeal},
    resources::ServerResources,
    routes::{normalize_text, require},
    utils::dates,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for plan generation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratePlanBody {
    /// Day to plan, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Daily target; the active goal for `date` is used when absent
    pub target_calories: Option<i64>,
}

/// Query parameters for plan generation
#[derive(Debug, Deserialize, Default)]
pub struct GeneratePlanQuery {
    /// Store the plan as a meal
    #[serde(default)]
    pub save: bool,
}

/// Meal created from a saved plan
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedMeal {
    /// Meal id
    pub id: i64,
    /// Meal name
    pub name: String,
    /// Meal date, RFC 3339
    pub date: String,
}

/// Response for plan generation
#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePlanResponse {
    /// Planned day
    pub date: String,
    /// Target used
    pub target_calories: i64,
    /// Sum of chosen estimates
    pub total_calories: f64,
    /// `total_calories - target_calories`
    pub difference: f64,
    /// Chosen options in meal time order
    pub meals: Vec<PlannedMeal>,
    /// Skipped meal times
    pub notes: Option<String>,
    /// Present when the plan was stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_meal: Option<SavedMeal>,
}

impl GeneratePlanResponse {
    fn new(date: String, plan: MealPlan, saved_meal: Option<SavedMeal>) -> Self {
        Self {
            date,
            target_calories: plan.target_calories,
            total_calories: plan.total_calories,
            difference: plan.difference,
            meals: plan.meals,
            notes: plan.notes,
            saved_meal,
        }
    }
}

/// Planner routes
pub struct PlannerRoutes;

impl PlannerRoutes {
    /// Create planner routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/meals/generate", post(Self::handle_generate))
            .with_state(resources)
    }

    /// Handle POST /api/meals/generate
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<GeneratePlanQuery>,
        Json(body): Json<GeneratePlanBody>,
    ) -> Result<Response, AppError> {
        let auth = resources
            .auth_middleware
            .authenticate_request_with_headers(&headers)
            .await?;
        let user_id = auth.user_id();

        let date = dates::parse_date("date", &require(normalize_text(body.date), "date")?)?;
        let day = dates::format_date(date);

        let target = match body.target_calories {
            Some(target) => target,
            None => resources
                .database
                .caloric_goals()
                .find_active(user_id, date)
                .await?
                .map(|goal| goal.daily_calories)
                .ok_or_else(|| {
                    AppError::new(
                        ErrorCode::ResourceNotFound,
                        format!("No target_calories given and no active caloric goal for {day}"),
                    )
                })?,
        };

        let meal_times = resources.database.meal_times().list().await?;
        let options = resources.database.meal_options().list(None).await?;
        let plan = plan_meals(target, &meal_times, &options)?;
        tracing::info!(
            user_id,
            target,
            total = plan.total_calories,
            chosen = plan.meals.len(),
            "Generated meal plan for {day}"
        );

        let saved_meal = if query.save {
            let request = CreateMealRequest {
                name: format!("Generated plan for {day}"),
                calories: plan.total_calories.round() as i64,
                date: dates::start_of_day(date),
                notes: plan.notes.clone(),
                meal_option_ids: plan.option_ids(),
            };
            let meal = resources.database.meals().create(user_id, &request).await?;
            Some(SavedMeal {
                id: meal.id,
                name: meal.name,
                date: dates::format_timestamp(&meal.date),
            })
        } else {
            None
        };

        let response = GeneratePlanResponse::new(day, plan, saved_meal);
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }
}
