// ABOUTME: Database connection management and schema setup for the meal planner
// ABOUTME: Owns the SQLite pool, runs migrations and exposes per-table managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Database Management
//!
//! [`Database`] owns the `SQLite` pool and creates the schema at startup.
//! Each table family has a manager (`UserManager`, `MealManager`, ...) that
//! borrows a clone of the pool and returns [`AppResult`].

/// Caloric goal storage and overlap rules
pub mod caloric_goals;
/// Meal option catalogue and ingredients
pub mod meal_options;
/// Seeded meal times
pub mod meal_times;
/// User-owned meals and their linked options
pub mod meals;
/// User accounts
pub mod users;

pub use caloric_goals::{CaloricGoal, CaloricGoalManager};
pub use meal_options::{Ingredient, MealOption, MealOptionManager, NewIngredient};
pub use meal_times::{MealTime, MealTimeManager};
pub use meals::{LinkedMealOption, Meal, MealManager};
pub use users::{User, UserManager};

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Database manager owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and run migrations
    ///
    /// In-memory databases always use a single connection, since every
    /// `SQLite` connection to `:memory:` opens a separate database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created, the
    /// connection fails, or a migration fails
    pub async fn new(url: &DatabaseUrl, max_connections: u32) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            ensure_parent_dir(path)?;
        }

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL {url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");

        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a trivial query to confirm the pool still works
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index cannot be created
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_meal_times().await?;
        self.migrate_meal_options().await?;
        self.migrate_meals().await?;
        self.migrate_caloric_goals().await?;
        debug!("Database migrations complete");
        Ok(())
    }

    /// Execute one schema statement
    async fn execute_schema(&self, statement: &str) -> AppResult<()> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// User manager sharing this pool
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Meal time manager sharing this pool
    #[must_use]
    pub fn meal_times(&self) -> MealTimeManager {
        MealTimeManager::new(self.pool.clone())
    }

    /// Meal option manager sharing this pool
    #[must_use]
    pub fn meal_options(&self) -> MealOptionManager {
        MealOptionManager::new(self.pool.clone())
    }

    /// Meal manager sharing this pool
    #[must_use]
    pub fn meals(&self) -> MealManager {
        MealManager::new(self.pool.clone())
    }

    /// Caloric goal manager sharing this pool
    #[must_use]
    pub fn caloric_goals(&self) -> CaloricGoalManager {
        CaloricGoalManager::new(self.pool.clone())
    }
}

fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                AppError::config(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

/// Map a write error, turning unique violations into conflicts
pub(crate) fn write_error(action: &str, error: &sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::already_exists(format!("Failed to {action}: record already exists"))
        }
        _ => AppError::database(format!("Failed to {action}: {error}")),
    }
}

/// Start a query ending in `IN (?, ?, ...)` over the given ids
pub(crate) fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push(" IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
