// ABOUTME: User account storage for registration, login and profile lookups
// ABOUTME: Creates the users table and maps rows to the User model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use super::{write_error, Database};
use crate::constants::auth::ROLE_USER;
use crate::errors::{AppError, AppResult};
use crate::utils::dates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Login email, stored lowercase
    pub email: String,
    /// Optional display name
    pub name: Option<String>,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Granted roles
    pub roles: Vec<String>,
    /// Inactive users cannot log in
    pub is_active: bool,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl Database {
    /// Create users table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.execute_schema(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT,
                password_hash TEXT NOT NULL,
                roles TEXT NOT NULL DEFAULT '["ROLE_USER"]',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .await
    }
}

/// User database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new active user with the default role
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the email is taken, or a database error
    pub async fn create(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> AppResult<User> {
        let roles = vec![ROLE_USER.to_owned()];
        let roles_json = serde_json::to_string(&roles)?;
        let created_at = dates::now();

        let result = sqlx::query(
            r"
            INSERT INTO users (email, name, password_hash, roles, is_active, created_at)
            VALUES ($1, $2, $3, $4, 1, $5)
            ",
        )
        .bind(email.to_lowercase())
        .bind(name)
        .bind(password_hash)
        .bind(&roles_json)
        .bind(dates::format_timestamp(&created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match write_error("create user", &e) {
            err if err.http_status() == 409 => {
                AppError::already_exists("A user with this email already exists")
            }
            err => err,
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_lowercase(),
            name: name.map(ToOwned::to_owned),
            password_hash: password_hash.to_owned(),
            roles,
            is_active: true,
            created_at,
        })
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, name, password_hash, roles, is_active, created_at
            FROM users WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user {id}: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by email, case-insensitive
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, name, password_hash, roles, is_active, created_at
            FROM users WHERE email = $1 COLLATE NOCASE
            ",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Activate or deactivate a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn set_active(&self, id: i64, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update user {id}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let roles_json: String = row.get("roles");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        roles: serde_json::from_str(&roles_json)?,
        is_active: row.get("is_active"),
        created_at: dates::parse_stored_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::create_test_db;

    #[tokio::test]
    async fn test_create_and_lookup_case_insensitive() {
        let db = create_test_db().await;
        let users = db.users();

        let user = users
            .create("Cook@Example.com", Some("Cook"), "hash")
            .await
            .unwrap();
        assert_eq!(user.email, "cook@example.com");
        assert_eq!(user.roles, vec!["ROLE_USER".to_owned()]);

        let found = users.get_by_email("COOK@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(found.is_active);

        let duplicate = users.create("cook@example.com", None, "hash").await;
        assert_eq!(duplicate.unwrap_err().http_status(), 409);
    }

    #[tokio::test]
    async fn test_deactivate() {
        let db = create_test_db().await;
        let users = db.users();
        let user = users.create("a@b.io", None, "hash").await.unwrap();

        assert!(users.set_active(user.id, false).await.unwrap());
        let reloaded = users.get_by_id(user.id).await.unwrap().unwrap();
        assert!(!reloaded.is_active);
        assert!(!users.set_active(9999, false).await.unwrap());
    }
}
