// ABOUTME: Weekly report route summarising logged calories against the caloric goal
// ABOUTME: Resolves the ISO week, loads goal and meals, then delegates to planning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::{
    constants::messages::NO_GOAL_FOR_WEEK,
    database::meals::MealDateFilter,
    errors::{AppError, ErrorCode},
    planning::{build_weekly_report, resolve_week_start, week_end},
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
use std::sync::Arc;

/// Query parameters for the weekly report
#[derive(Debug, Deserialize, Default)]
pub struct WeeklyReportQuery {
    /// Monday of the week, `YYYY-MM-DD`; current week when absent
    pub week_start: Option<String>,
}

/// Report routes
pub struct ReportRoutes;

impl ReportRoutes {
    /// Create report routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/reports/weekly", get(Self::handle_weekly))
            .with_state(resources)
    }

    /// Handle GET /api/reports/weekly
    async fn handle_weekly(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<WeeklyReportQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources
            .auth_middleware
            .authenticate_request_with_headers(&headers)
            .await?;
        let user_id = auth.user_id();

        let monday = resolve_week_start(query.week_start.as_deref(), dates::today())?;
        let goal = resources
            .database
            .caloric_goals()
            .find_active(user_id, monday)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ResourceNotFound, NO_GOAL_FOR_WEEK))?;

        let filter = MealDateFilter {
            start: Some(dates::start_of_day(monday)),
            end: Some(dates::end_of_day(week_end(monday))),
        };
        let meals = resources.database.meals().list(user_id, filter).await?;

        let report = build_weekly_report(monday, goal.daily_calories, &meals);
        tracing::debug!(
            user_id,
            week_start = %report.week_start,
            days_tracked = report.days_tracked,
            "Built weekly report"
        );
        Ok((StatusCode::OK, Json(report)).into_response())
    }
}
