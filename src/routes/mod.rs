// ABOUTME: Route module organization for the meal planner HTTP API
// ABOUTME: One router per resource plus request validation helpers they share
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Route module for the meal planner API
//!
//! Each domain module exposes a `XRoutes::routes(resources)` router with thin
//! handlers that validate input, call the database managers or the planning
//! functions, and serialize the result.

/// Registration and login
pub mod auth;
/// Caloric goal CRUD and active goal lookup
pub mod caloric_goals;
/// Service status endpoints
pub mod health;
/// Meal option catalogue
pub mod meal_options;
/// Seeded meal times
pub mod meal_times;
/// User meals
pub mod meals;
/// Meal plan generation
pub mod planner;
/// Weekly calorie report
pub mod reports;
/// Shopping list aggregation
pub mod shopping_list;
/// Profile of the authenticated user
pub mod user;

pub use auth::{AuthRoutes, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
pub use caloric_goals::CaloricGoalRoutes;
pub use health::HealthRoutes;
pub use meal_options::MealOptionRoutes;
pub use meal_times::MealTimeRoutes;
pub use meals::MealRoutes;
pub use planner::PlannerRoutes;
pub use reports::ReportRoutes;
pub use shopping_list::ShoppingListRoutes;
pub use user::UserRoutes;

use crate::constants::limits::MAX_NAME_LENGTH;
use crate::errors::{AppError, AppResult};

/// Parse a path id; anything that is not a positive integer cannot name a resource
pub(crate) fn parse_id(resource: &str, raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::not_found(format!("{resource} {raw}")))
}

/// Unwrap a required body field
pub(crate) fn require<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::missing_field(format!("{field} is required")))
}

/// Trim a name and check it is 1 to 100 characters long
pub(crate) fn validate_name(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Empty or whitespace-only optional text is stored as absent
pub(crate) fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
