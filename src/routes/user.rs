// ABOUTME: Profile route for the authenticated user
// ABOUTME: Returns account details in the camelCase shape clients expect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::database::User;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::utils::dates;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Profile of the authenticated user
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    /// User id
    pub id: i64,
    /// Login email
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Registration time, RFC 3339
    pub created_at: String,
    /// Whether the account may log in
    pub is_active: bool,
    /// Granted roles
    pub roles: Vec<String>,
}

impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: dates::format_timestamp(&user.created_at),
            is_active: user.is_active,
            roles: user.roles,
        }
    }
}

/// Profile routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/user", get(Self::handle_profile))
            .with_state(resources)
    }

    /// Handle GET /api/user
    async fn handle_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources
            .auth_middleware
            .authenticate_request_with_headers(&headers)
            .await?;

        let response: UserProfileResponse = auth.user.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
