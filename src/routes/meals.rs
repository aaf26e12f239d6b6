// ABOUTME: Route handlers for meals owned by the authenticated user
// ABOUTME: CRUD with date filters, option linking and grouping of options by meal time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Meal routes
//!
//! A meal belongs to exactly one user. Lookups for another user's meal
//! answer 404, never 403, so ids of foreign meals are not revealed.

use crate::{
    constants::{limits::MAX_MEAL_CALORIES, messages::MEAL_DELETED},
    database::{
        meals::{CreateMealRequest, MealDateFilter, UpdateMealRequest},
        LinkedMealOption, Meal,
    },
    errors::{AppError, AppResult},
    resources::ServerResources,
    routes::{normalize_text, parse_id, require, validate_name},
    utils::{dates, json::MessageResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Linked option as shown inside a meal
#[derive(Debug, Serialize, Deserialize)]
pub struct MealOptionSummary {
    /// Option id
    pub id: i64,
    /// Option name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Options of one meal time inside a meal
#[derive(Debug, Serialize, Deserialize)]
pub struct MealTimeGroup {
    /// Meal time id
    pub id: i64,
    /// Machine name
    pub name: String,
    /// Display label
    pub label: String,
    /// Linked options of this meal time
    pub options: Vec<MealOptionSummary>,
}

/// Response for a meal
#[derive(Debug, Serialize, Deserialize)]
pub struct MealResponse {
    /// Meal id
    pub id: i64,
    /// Meal name
    pub name: String,
    /// Energy in kcal
    pub calories: i64,
    /// When the meal is eaten, RFC 3339
    pub date: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Linked options grouped by meal time, in day order
    pub meal_times: Vec<MealTimeGroup>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

fn group_by_meal_time(options: Vec<LinkedMealOption>) -> Vec<MealTimeGroup> {
    let mut groups: BTreeMap<(i64, i64), MealTimeGroup> = BTreeMap::new();
    for option in options {
        let meal_time = option.meal_time;
        groups
            .entry((meal_time.sort_order, meal_time.id))
            .or_insert_with(|| MealTimeGroup {
                id: meal_time.id,
                name: meal_time.name,
                label: meal_time.label,
                options: Vec::new(),
            })
            .options
            .push(MealOptionSummary {
                id: option.id,
                name: option.name,
                description: option.description,
            });
    }
    groups.into_values().collect()
}

impl From<Meal> for MealResponse {
    fn from(meal: Meal) -> Self {
        Self {
            id: meal.id,
            name: meal.name,
            calories: meal.calories,
            date: dates::format_timestamp(&meal.date),
            notes: meal.notes,
            meal_times: group_by_meal_time(meal.options),
            created_at: dates::format_timestamp(&meal.created_at),
            updated_at: dates::format_timestamp(&meal.updated_at),
        }
    }
}

/// Request body for creating a meal
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMealBody {
    /// Meal name
    pub name: Option<String>,
    /// Energy in kcal
    pub calories: Option<i64>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub date: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Options to link
    pub meal_option_ids: Option<Vec<i64>>,
}

/// Request body for updating a meal; absent fields are unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMealBody {
    /// New name
    pub name: Option<String>,
    /// New energy in kcal
    pub calories: Option<i64>,
    /// New date
    pub date: Option<String>,
    /// New notes, `null` clears
    #[serde(default, deserialize_with = "crate::utils::json::deserialize_some")]
    pub notes: Option<Option<String>>,
    /// Replacement link set
    pub meal_option_ids: Option<Vec<i64>>,
}

/// Query parameters for listing meals
#[derive(Debug, Deserialize, Default)]
pub struct ListMealsQuery {
    /// Inclusive lower bound
    pub start: Option<String>,
    /// Inclusive upper bound; a bare date covers the whole day
    pub end: Option<String>,
}

fn validate_calories(calories: i64) -> AppResult<i64> {
    if !(0..=MAX_MEAL_CALORIES).contains(&calories) {
        return Err(AppError::out_of_range(format!(
            "calories must be between 0 and {MAX_MEAL_CALORIES}"
        )));
    }
    Ok(calories)
}

/// Parse a list bound; bare dates expand to the first or last second of the day
fn parse_bound(field: &str, value: &str, end: bool) -> AppResult<DateTime<Utc>> {
    match dates::parse_date(field, value) {
        Ok(day) if end => Ok(dates::end_of_day(day)),
        Ok(day) => Ok(dates::start_of_day(day)),
        Err(_) => dates::parse_timestamp(field, value),
    }
}

/// Deduplicate option ids keeping first occurrence order
fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Meal routes
pub struct MealRoutes;

impl MealRoutes {
    /// Create meal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/meals", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/meals/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn authenticate(headers: &HeaderMap, resources: &Arc<ServerResources>) -> AppResult<i64> {
        resources
            .auth_middleware
            .authenticate_request_with_headers(headers)
            .await
            .map(|auth| auth.user_id())
    }

    /// Reject ids of options that do not exist
    pub(crate) async fn ensure_options_exist(
        resources: &Arc<ServerResources>,
        ids: &[i64],
    ) -> AppResult<()> {
        let missing = resources.database.meal_options().missing_ids(ids).await?;
        match missing.first() {
            Some(id) => Err(AppError::not_found(format!("MealOption {id}"))),
            None => Ok(()),
        }
    }

    /// Handle GET /api/meals
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListMealsQuery>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;

        let filter = MealDateFilter {
            start: normalize_text(query.start)
                .map(|value| parse_bound("start", &value, false))
                .transpose()?,
            end: normalize_text(query.end)
                .map(|value| parse_bound("end", &value, true))
                .transpose()?,
        };
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if end < start {
                return Err(AppError::invalid_input("end must be on or after start"));
            }
        }

        let meals = resources.database.meals().list(user_id, filter).await?;
        let response: Vec<MealResponse> = meals.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/meals
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateMealBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;

        let name = validate_name("name", &require(body.name, "name")?)?;
        let calories = validate_calories(require(body.calories, "calories")?)?;
        let date = dates::parse_timestamp("date", &require(normalize_text(body.date), "date")?)?;
        let meal_option_ids = dedup_ids(body.meal_option_ids.unwrap_or_default());
        Self::ensure_options_exist(&resources, &meal_option_ids).await?;

        let request = CreateMealRequest {
            name,
            calories,
            date,
            notes: normalize_text(body.notes),
            meal_option_ids,
        };
        let meal = resources.database.meals().create(user_id, &request).await?;
        tracing::info!(user_id, meal_id = meal.id, "Created meal");

        let response: MealResponse = meal.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/meals/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let id = parse_id("Meal", &id)?;

        let meal = resources
            .database
            .meals()
            .get(user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Meal {id}")))?;

        let response: MealResponse = meal.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/meals/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateMealBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let id = parse_id("Meal", &id)?;

        let meal_option_ids = body.meal_option_ids.map(dedup_ids);
        if let Some(ids) = &meal_option_ids {
            Self::ensure_options_exist(&resources, ids).await?;
        }

        let request = UpdateMealRequest {
            name: body
                .name
                .map(|name| validate_name("name", &name))
                .transpose()?,
            calories: body.calories.map(validate_calories).transpose()?,
            date: body
                .date
                .map(|date| dates::parse_timestamp("date", &date))
                .transpose()?,
            notes: body.notes.map(normalize_text),
            meal_option_ids,
        };

        let meal = resources
            .database
            .meals()
            .update(user_id, id, &request)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Meal {id}")))?;

        let response: MealResponse = meal.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/meals/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let id = parse_id("Meal", &id)?;

        if !resources.database.meals().delete(user_id, id).await? {
            return Err(AppError::not_found(format!("Meal {id}")));
        }

        tracing::info!(user_id, meal_id = id, "Deleted meal");
        Ok((StatusCode::OK, Json(MessageResponse::new(MEAL_DELETED))).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MealTime;

    fn linked(id: i64, meal_time: (i64, &str)) -> LinkedMealOption {
        LinkedMealOption {
            id,
            name: format!("Option {id}"),
            description: None,
            meal_time: MealTime {
                id: meal_time.0,
                name: meal_time.1.to_owned(),
                label: meal_time.1.to_uppercase(),
                sort_order: meal_time.0,
            },
        }
    }

    #[test]
    fn test_grouping_follows_day_order() {
        let groups = group_by_meal_time(vec![
            linked(5, (4, "dinner")),
            linked(2, (1, "breakfast")),
            linked(9, (4, "dinner")),
        ]);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["breakfast", "dinner"]);
        let dinner_ids: Vec<i64> = groups[1].options.iter().map(|o| o.id).collect();
        assert_eq!(dinner_ids, [5, 9]);
    }

    #[test]
    fn test_bounds_expand_bare_dates() {
        let start = parse_bound("start", "2026-02-15", false).unwrap();
        let end = parse_bound("end", "2026-02-15", true).unwrap();
        assert_eq!(dates::format_timestamp(&start), "2026-02-15T00:00:00Z");
        assert_eq!(dates::format_timestamp(&end), "2026-02-15T23:59:59Z");

        let exact = parse_bound("end", "2026-02-15T12:00:00Z", true).unwrap();
        assert_eq!(dates::format_timestamp(&exact), "2026-02-15T12:00:00Z");
        assert!(parse_bound("start", "yesterday", false).is_err());
    }

    #[test]
    fn test_dedup_and_calories() {
        assert_eq!(dedup_ids(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(validate_calories(-1).is_err());
        assert_eq!(validate_calories(0).unwrap(), 0);
        assert_eq!(validate_calories(10_000).unwrap(), 10_000);
        assert!(validate_calories(10_001).is_err());
        assert!(validate_calories(5_000_000_000_000_000_000).is_err());
    }
}
