// ABOUTME: Route handlers for per-user daily caloric goals
// ABOUTME: CRUD plus lookup of the goal active on a given day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::{
    constants::messages::CALORIC_GOAL_DELETED,
    database::{
        caloric_goals::{CaloricGoalInput, UpdateCaloricGoalRequest},
        CaloricGoal,
    },
    errors::{AppError, AppResult},
    resources::ServerResources,
    routes::{normalize_text, parse_id, require},
    utils::{dates, json::MessageResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response for a caloric goal
#[derive(Debug, Serialize, Deserialize)]
pub struct CaloricGoalResponse {
    /// Goal id
    pub id: i64,
    /// Daily target in kcal
    pub daily_calories: i64,
    /// Optional label
    pub label: Option<String>,
    /// First day, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day, absent for open-ended goals
    pub end_date: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<CaloricGoal> for CaloricGoalResponse {
    fn from(goal: CaloricGoal) -> Self {
        Self {
            id: goal.id,
            daily_calories: goal.daily_calories,
            label: goal.label,
            start_date: dates::format_date(goal.start_date),
            end_date: goal.end_date.map(dates::format_date),
            notes: goal.notes,
            created_at: dates::format_timestamp(&goal.created_at),
            updated_at: dates::format_timestamp(&goal.updated_at),
        }
    }
}

/// Request body for creating a goal
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCaloricGoalBody {
    /// Daily target in kcal
    pub daily_calories: Option<i64>,
    /// Optional label
    pub label: Option<String>,
    /// First day
    pub start_date: Option<String>,
    /// Last day, omitted for open-ended goals
    pub end_date: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Request body for updating a goal; `null` clears the optional fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCaloricGoalBody {
    /// New daily target
    pub daily_calories: Option<i64>,
    /// New label
    #[serde(default, deserialize_with = "crate::utils::json::deserialize_some")]
    pub label: Option<Option<String>>,
    /// New first day
    pub start_date: Option<String>,
    /// New last day; `null` makes the goal open-ended
    #[serde(default, deserialize_with = "crate::utils::json::deserialize_some")]
    pub end_date: Option<Option<String>>,
    /// New notes
    #[serde(default, deserialize_with = "crate::utils::json::deserialize_some")]
    pub notes: Option<Option<String>>,
}

/// Query parameters for the active goal lookup
#[derive(Debug, Deserialize, Default)]
pub struct ActiveGoalQuery {
    /// Day to check, defaults to today (UTC)
    pub date: Option<String>,
}

fn parse_optional_date(field: &str, value: Option<String>) -> AppResult<Option<NaiveDate>> {
    normalize_text(value)
        .map(|value| dates::parse_date(field, &value))
        .transpose()
}

/// Caloric goal routes
pub struct CaloricGoalRoutes;

impl CaloricGoalRoutes {
    /// Create caloric goal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/caloric-goals",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/caloric-goals/active", get(Self::handle_active))
            .route(
                "/api/caloric-goals/:id",
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

    /// Handle GET /api/caloric-goals
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let goals = resources.database.caloric_goals().list(user_id).await?;

        let response: Vec<CaloricGoalResponse> = goals.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/caloric-goals/active
    async fn handle_active(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ActiveGoalQuery>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let date = parse_optional_date("date", query.date)?.unwrap_or_else(dates::today);

        let goal = resources
            .database
            .caloric_goals()
            .find_active(user_id, date)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Active caloric goal for {}", dates::format_date(date)))
            })?;

        let response: CaloricGoalResponse = goal.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/caloric-goals
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateCaloricGoalBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;

        let input = CaloricGoalInput {
            daily_calories: require(body.daily_calories, "daily_calories")?,
            label: normalize_text(body.label),
            start_date: require(parse_optional_date("start_date", body.start_date)?, "start_date")?,
            end_date: parse_optional_date("end_date", body.end_date)?,
            notes: normalize_text(body.notes),
        };
        let goal = resources.database.caloric_goals().create(user_id, &input).await?;
        tracing::info!(user_id, goal_id = goal.id, "Created caloric goal");

        let response: CaloricGoalResponse = goal.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/caloric-goals/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let id = parse_id("Caloric goal", &id)?;

        let goal = resources
            .database
            .caloric_goals()
            .get(user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Caloric goal {id}")))?;

        let response: CaloricGoalResponse = goal.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/caloric-goals/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateCaloricGoalBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let id = parse_id("Caloric goal", &id)?;

        let request = UpdateCaloricGoalRequest {
            daily_calories: body.daily_calories,
            label: body.label.map(normalize_text),
            start_date: body
                .start_date
                .map(|value| dates::parse_date("start_date", &value))
                .transpose()?,
            end_date: body
                .end_date
                .map(|value| parse_optional_date("end_date", value))
                .transpose()?,
            notes: body.notes.map(normalize_text),
        };

        let goal = resources
            .database
            .caloric_goals()
            .update(user_id, id, &request)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Caloric goal {id}")))?;

        let response: CaloricGoalResponse = goal.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/caloric-goals/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;
        let id = parse_id("Caloric goal", &id)?;

        if !resources.database.caloric_goals().delete(user_id, id).await? {
            return Err(AppError::not_found(format!("Caloric goal {id}")));
        }

        Ok((StatusCode::OK, Json(MessageResponse::new(CALORIC_GOAL_DELETED))).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_null_end_date() {
        let body: UpdateCaloricGoalBody = serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        assert_eq!(body.end_date, Some(None));

        let body: UpdateCaloricGoalBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.end_date, None);
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("d", None).unwrap(), None);
        assert_eq!(parse_optional_date("d", Some(" ".to_owned())).unwrap(), None);
        assert!(parse_optional_date("d", Some("02/15/2026".to_owned())).is_err());
        assert_eq!(
            parse_optional_date("d", Some("2026-02-15".to_owned())).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 15)
        );
    }
}
