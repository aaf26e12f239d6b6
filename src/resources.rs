// ABOUTME: Shared server resources injected into every route handler
// ABOUTME: Owns the database, auth manager, auth middleware and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::middleware::AuthMiddleware;
use std::sync::Arc;

/// Resource container handed to routers as axum state
#[derive(Clone)]
pub struct ServerResources {
    /// Storage
    pub database: Arc<Database>,
    /// Token issuing and validation
    pub auth_manager: Arc<AuthManager>,
    /// Bearer authentication for protected routes
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources around an opened database
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            &config.auth.jwt_secret,
            config.auth.jwt_expiry_hours,
        ));
        let auth_middleware = Arc::new(AuthMiddleware::new(auth_manager.clone(), database.clone()));

        Self {
            database,
            auth_manager,
            auth_middleware,
            config: Arc::new(config),
        }
    }

    /// Open the configured database and assemble resources
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database.url, config.database.max_connections).await?;
        Ok(Self::new(database, config))
    }
}
