// ABOUTME: User authentication route handlers for registration and login
// ABOUTME: Validates credentials, stores bcrypt hashes and issues JWT tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Authentication routes
//!
//! `POST /api/register` and `POST /api/login` are the only `/api` endpoints
//! that do not require a Bearer token.

use crate::auth::{hash_password, verify_password};
use crate::constants::{auth::MIN_PASSWORD_LENGTH, messages};
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::{normalize_text, require};
use crate::utils::dates;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User registration request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: Option<String>,
    /// Plain text password
    pub password: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// User registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Confirmation message
    pub message: String,
    /// New user id
    pub id: i64,
}

/// User login request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: Option<String>,
    /// Plain text password
    pub password: Option<String>,
}

/// User info for login response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id
    pub id: i64,
    /// Login email
    pub email: String,
    /// Display name
    pub name: Option<String>,
}

/// User login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Token expiry, RFC 3339
    pub expires_at: String,
    /// Logged in user
    pub user: UserInfo,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/register", post(Self::handle_register))
            .route("/api/login", post(Self::handle_login))
            .with_state(resources)
    }

    /// Loose `local@domain.tld` shape check
    #[must_use]
    pub fn is_valid_email(email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }
        let Some((host, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        !host.is_empty() && !tld.is_empty()
    }

    /// Minimum length check, counted in characters
    #[must_use]
    pub fn is_valid_password(password: &str) -> bool {
        password.chars().count() >= MIN_PASSWORD_LENGTH
    }

    /// Handle POST /api/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let email = require(normalize_text(body.email), "email")?;
        let password = require(body.password.filter(|p| !p.is_empty()), "password")?;

        tracing::info!("User registration attempt for email: {email}");

        if !Self::is_valid_email(&email) {
            return Err(AppError::invalid_format("Invalid email format"));
        }
        if !Self::is_valid_password(&password) {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_password(&password).await?;
        let name = normalize_text(body.name);
        let user = resources
            .database
            .users()
            .create(&email, name.as_deref(), &password_hash)
            .await
            .inspect_err(|e| {
                AppLogger::log_auth_event(&email, "register", false, Some(e.message.as_str()));
            })?;

        AppLogger::log_auth_event(&user.email, "register", true, None);

        let response = RegisterResponse {
            message: messages::USER_REGISTERED.to_owned(),
            id: user.id,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = require(normalize_text(body.email), "email")?;
        let password = require(body.password.filter(|p| !p.is_empty()), "password")?;

        let Some(user) = resources.database.users().get_by_email(&email).await? else {
            AppLogger::log_auth_event(&email, "login", false, Some("unknown email"));
            return Err(AppError::auth_invalid(messages::INVALID_CREDENTIALS));
        };

        if !verify_password(&password, &user.password_hash).await {
            AppLogger::log_auth_event(&email, "login", false, Some("wrong password"));
            return Err(AppError::auth_invalid(messages::INVALID_CREDENTIALS));
        }

        if !user.is_active {
            AppLogger::log_auth_event(&email, "login", false, Some("inactive account"));
            return Err(AppError::permission_denied("User account is inactive"));
        }

        let (token, expires_at) = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&user.email, "login", true, None);

        let response = LoginResponse {
            token,
            expires_at: dates::format_timestamp(&expires_at),
            user: UserInfo {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
