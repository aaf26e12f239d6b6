// ABOUTME: Meal time storage (breakfast, lunch, snack, dinner) seeded at migration
// ABOUTME: Read-only lookups by id and by name for options, meals and the planner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use super::Database;
use crate::constants::meal_times::SEEDED;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// A slot of the day that meal options belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealTime {
    /// Unique identifier
    pub id: i64,
    /// Machine name (`lunch`)
    pub name: String,
    /// Display label (`Lunch`)
    pub label: String,
    /// Position in the day
    #[serde(skip_serializing)]
    pub sort_order: i64,
}

impl MealTime {
    /// Build from a row whose meal time columns carry the given prefix
    pub(crate) fn from_prefixed_row(row: &SqliteRow, prefix: &str) -> Self {
        Self {
            id: row.get(format!("{prefix}id").as_str()),
            name: row.get(format!("{prefix}name").as_str()),
            label: row.get(format!("{prefix}label").as_str()),
            sort_order: row.get(format!("{prefix}sort_order").as_str()),
        }
    }
}

impl Database {
    /// Create and seed meal_times table
    pub(super) async fn migrate_meal_times(&self) -> AppResult<()> {
        self.execute_schema(
            r"
            CREATE TABLE IF NOT EXISTS meal_times (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                label TEXT NOT NULL,
                sort_order INTEGER NOT NULL
            )
            ",
        )
        .await?;

        for (position, (name, label)) in (1_i64..).zip(SEEDED) {
            sqlx::query(
                r"
                INSERT INTO meal_times (name, label, sort_order) VALUES ($1, $2, $3)
                ON CONFLICT(name) DO NOTHING
                ",
            )
            .bind(name)
            .bind(label)
            .bind(position)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to seed meal time {name}: {e}")))?;
        }

        Ok(())
    }
}

/// Meal time lookups
pub struct MealTimeManager {
    pool: SqlitePool,
}

impl MealTimeManager {
    /// Create a new meal time manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All meal times in day order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<MealTime>> {
        let rows = sqlx::query(
            "SELECT id, name, label, sort_order FROM meal_times ORDER BY sort_order, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list meal times: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| MealTime::from_prefixed_row(row, ""))
            .collect())
    }

    /// Meal time by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<MealTime>> {
        let row = sqlx::query("SELECT id, name, label, sort_order FROM meal_times WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get meal time {id}: {e}")))?;

        Ok(row.map(|row| MealTime::from_prefixed_row(&row, "")))
    }

    /// Meal time by name, case-insensitive
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<MealTime>> {
        let row = sqlx::query(
            "SELECT id, name, label, sort_order FROM meal_times WHERE name = $1 COLLATE NOCASE",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get meal time {name}: {e}")))?;

        Ok(row.map(|row| MealTime::from_prefixed_row(&row, "")))
    }
}
