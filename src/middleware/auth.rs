// ABOUTME: Bearer token authentication for protected API routes
// ABOUTME: Validates the JWT, then confirms the user still exists and is active
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::auth::AuthManager;
use crate::database::{Database, User};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::utils::auth::extract_bearer_token_from_option;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// The user the token belongs to
    pub user: User,
}

impl AuthResult {
    /// Id of the authenticated user
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user.id
    }
}

/// Middleware for Bearer authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate from request headers
    ///
    /// # Errors
    ///
    /// See [`Self::authenticate_request`]
    pub async fn authenticate_request_with_headers(
        &self,
        headers: &HeaderMap,
    ) -> AppResult<AuthResult> {
        let auth_header = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        self.authenticate_request(auth_header).await
    }

    /// Authenticate an `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns a 401 error if the header is missing or not a Bearer token, if
    /// the token is invalid or expired, or if its user is gone or inactive.
    /// Database failures propagate as 500.
    #[tracing::instrument(
        skip(self, auth_header),
        fields(
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let span = tracing::Span::current();

        let token = extract_bearer_token_from_option(auth_header).inspect_err(|_| {
            span.record("success", false);
            tracing::debug!("Request without usable Bearer token");
        })?;

        let claims = match self.auth_manager.validate_token_detailed(token) {
            Ok(claims) => claims,
            Err(e) => {
                span.record("success", false);
                AppLogger::log_security_event("jwt_rejected", &e.to_string(), None);
                return Err(e.into());
            }
        };

        let user_id = claims.user_id()?;
        span.record("user_id", user_id);

        let Some(user) = self.database.users().get_by_id(user_id).await? else {
            span.record("success", false);
            AppLogger::log_security_event(
                "token_for_unknown_user",
                "user no longer exists",
                Some(user_id),
            );
            return Err(AppError::auth_invalid("User no longer exists"));
        };

        if !user.is_active {
            span.record("success", false);
            AppLogger::log_security_event(
                "token_for_inactive_user",
                "user is deactivated",
                Some(user_id),
            );
            return Err(AppError::auth_invalid("User account is inactive"));
        }

        span.record("success", true);
        Ok(AuthResult { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::create_test_db;
    use crate::errors::ErrorCode;

    async fn setup() -> (AuthMiddleware, Arc<AuthManager>, Arc<Database>) {
        let database = Arc::new(create_test_db().await);
        let auth_manager = Arc::new(AuthManager::new("middleware-secret", 24));
        (
            AuthMiddleware::new(auth_manager.clone(), database.clone()),
            auth_manager,
            database,
        )
    }

    #[tokio::test]
    async fn test_valid_token_yields_user() {
        let (middleware, auth, db) = setup().await;
        let user = db.users().create("a@example.com", None, "hash").await.unwrap();
        let (token, _) = auth.generate_token(&user).unwrap();

        let result = middleware
            .authenticate_request(Some(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(result.user_id(), user.id);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_headers() {
        let (middleware, _, _) = setup().await;

        let missing = middleware.authenticate_request(None).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::AuthRequired);

        let garbage = middleware
            .authenticate_request(Some("Bearer abc.def.ghi"))
            .await
            .unwrap_err();
        assert_eq!(garbage.http_status(), 401);

        let wrong_scheme = middleware
            .authenticate_request(Some("Basic Zm9vOmJhcg=="))
            .await
            .unwrap_err();
        assert_eq!(wrong_scheme.http_status(), 401);
    }

    #[tokio::test]
    async fn test_inactive_user_rejected() {
        let (middleware, auth, db) = setup().await;
        let user = db.users().create("b@example.com", None, "hash").await.unwrap();
        let (token, _) = auth.generate_token(&user).unwrap();
        db.users().set_active(user.id, false).await.unwrap();

        let err = middleware
            .authenticate_request(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }
}
