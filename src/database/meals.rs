// ABOUTME: User-owned meal storage with links to catalogue meal options
// ABOUTME: CRUD scoped by owner, date range listing and transactional link replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use super::{push_id_list, Database, MealTime};
use crate::errors::{AppError, AppResult};
use crate::utils::dates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

/// Summary of a meal option linked to a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedMealOption {
    /// Option id
    pub id: i64,
    /// Option name
    pub name: String,
    /// Option description
    pub description: Option<String>,
    /// Slot the option belongs to
    pub meal_time: MealTime,
}

/// A meal eaten (or planned) by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Meal name
    pub name: String,
    /// Energy in kcal
    pub calories: i64,
    /// When the meal takes place
    pub date: DateTime<Utc>,
    /// Free text notes
    pub notes: Option<String>,
    /// Linked options ordered by meal time, then name
    pub options: Vec<LinkedMealOption>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    /// Ids of the linked options
    #[must_use]
    pub fn option_ids(&self) -> Vec<i64> {
        self.options.iter().map(|option| option.id).collect()
    }
}

/// Request to create a meal
#[derive(Debug, Clone)]
pub struct CreateMealRequest {
    /// Meal name
    pub name: String,
    /// Energy in kcal
    pub calories: i64,
    /// When the meal takes place
    pub date: DateTime<Utc>,
    /// Free text notes
    pub notes: Option<String>,
    /// Options to link, already checked to exist
    pub meal_option_ids: Vec<i64>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateMealRequest {
    /// New name
    pub name: Option<String>,
    /// New calories
    pub calories: Option<i64>,
    /// New date
    pub date: Option<DateTime<Utc>>,
    /// New notes, `Some(None)` clears
    pub notes: Option<Option<String>>,
    /// Replacement link set
    pub meal_option_ids: Option<Vec<i64>>,
}

/// Inclusive date bounds for listing meals
#[derive(Debug, Clone, Copy, Default)]
pub struct MealDateFilter {
    /// Earliest date
    pub start: Option<DateTime<Utc>>,
    /// Latest date
    pub end: Option<DateTime<Utc>>,
}

impl Database {
    /// Create meals and meal_meal_options tables
    pub(super) async fn migrate_meals(&self) -> AppResult<()> {
        self.execute_schema(
            r"
            CREATE TABLE IF NOT EXISTS meals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                calories INTEGER NOT NULL CHECK (calories >= 0),
                date TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;

        self.execute_schema(
            r"
            CREATE TABLE IF NOT EXISTS meal_meal_options (
                meal_id INTEGER NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                meal_option_id INTEGER NOT NULL REFERENCES meal_options(id) ON DELETE CASCADE,
                PRIMARY KEY (meal_id, meal_option_id)
            )
            ",
        )
        .await?;

        self.execute_schema(
            "CREATE INDEX IF NOT EXISTS idx_meals_user_date ON meals(user_id, date)",
        )
        .await?;
        self.execute_schema(
            "CREATE INDEX IF NOT EXISTS idx_meal_links_option ON meal_meal_options(meal_option_id)",
        )
        .await
    }
}

/// Meal database operations manager
pub struct MealManager {
    pool: SqlitePool,
}

impl MealManager {
    /// Create a new meal manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a meal and its option links in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails
    pub async fn create(&self, user_id: i64, request: &CreateMealRequest) -> AppResult<Meal> {
        let now = dates::format_timestamp(&dates::now());
        let mut tx = self.begin().await?;

        let id = sqlx::query(
            r"
            INSERT INTO meals (user_id, name, calories, date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(user_id)
        .bind(&request.name)
        .bind(request.calories)
        .bind(dates::format_timestamp(&request.date))
        .bind(&request.notes)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create meal: {e}")))?
        .last_insert_rowid();

        insert_links(&mut tx, id, &request.meal_option_ids).await?;
        commit(tx).await?;

        self.get(user_id, id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Meal {id} vanished after insert")))
    }

    /// Get one meal of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, user_id: i64, id: i64) -> AppResult<Option<Meal>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, calories, date, notes, created_at, updated_at
            FROM meals WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get meal {id}: {e}")))?;

        match row {
            Some(row) => Ok(self.attach_options(&[row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// List a user's meals by date ascending, bounds inclusive
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, user_id: i64, filter: MealDateFilter) -> AppResult<Vec<Meal>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            r"
            SELECT id, user_id, name, calories, date, notes, created_at, updated_at
            FROM meals WHERE user_id = ",
        );
        builder.push_bind(user_id);
        if let Some(start) = filter.start {
            builder.push(" AND date >= ");
            builder.push_bind(dates::format_timestamp(&start));
        }
        if let Some(end) = filter.end {
            builder.push(" AND date <= ");
            builder.push_bind(dates::format_timestamp(&end));
        }
        builder.push(" ORDER BY date, id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list meals: {e}")))?;

        self.attach_options(&rows).await
    }

    /// Apply a partial update; the link set is replaced when given
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        request: &UpdateMealRequest,
    ) -> AppResult<Option<Meal>> {
        let Some(existing) = self.get(user_id, id).await? else {
            return Ok(None);
        };

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let calories = request.calories.unwrap_or(existing.calories);
        let date = request.date.unwrap_or(existing.date);
        let notes = request.notes.clone().unwrap_or(existing.notes);

        let mut tx = self.begin().await?;
        sqlx::query(
            r"
            UPDATE meals SET name = $1, calories = $2, date = $3, notes = $4, updated_at = $5
            WHERE id = $6 AND user_id = $7
            ",
        )
        .bind(name)
        .bind(calories)
        .bind(dates::format_timestamp(&date))
        .bind(&notes)
        .bind(dates::format_timestamp(&dates::now()))
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update meal {id}: {e}")))?;

        if let Some(option_ids) = &request.meal_option_ids {
            sqlx::query("DELETE FROM meal_meal_options WHERE meal_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to clear links of meal {id}: {e}"))
                })?;
            insert_links(&mut tx, id, option_ids).await?;
        }
        commit(tx).await?;

        self.get(user_id, id).await
    }

    /// Delete a meal of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete meal {id}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to start transaction: {e}")))
    }

    async fn attach_options(&self, rows: &[SqliteRow]) -> AppResult<Vec<Meal>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.get("id")).collect();
        let mut links = self.load_links(&ids).await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.get("id");
                row_to_meal(row, links.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn load_links(&self, meal_ids: &[i64]) -> AppResult<HashMap<i64, Vec<LinkedMealOption>>> {
        let mut grouped: HashMap<i64, Vec<LinkedMealOption>> = HashMap::new();
        if meal_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            r"
            SELECT l.meal_id, o.id, o.name, o.description,
                   t.id AS mt_id, t.name AS mt_name, t.label AS mt_label, t.sort_order AS mt_sort_order
            FROM meal_meal_options l
            JOIN meal_options o ON o.id = l.meal_option_id
            JOIN meal_times t ON t.id = o.meal_time_id
            WHERE l.meal_id",
        );
        push_id_list(&mut builder, meal_ids);
        builder.push(" ORDER BY l.meal_id, t.sort_order, o.name, o.id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load meal links: {e}")))?;

        for row in &rows {
            grouped
                .entry(row.get("meal_id"))
                .or_default()
                .push(LinkedMealOption {
                    id: row.get("id"),
                    name: row.get("name"),
                    description: row.get("description"),
                    meal_time: MealTime::from_prefixed_row(row, "mt_"),
                });
        }

        Ok(grouped)
    }
}

async fn insert_links(
    tx: &mut Transaction<'static, Sqlite>,
    meal_id: i64,
    option_ids: &[i64],
) -> AppResult<()> {
    for option_id in option_ids {
        sqlx::query(
            r"
            INSERT INTO meal_meal_options (meal_id, meal_option_id) VALUES ($1, $2)
            ON CONFLICT(meal_id, meal_option_id) DO NOTHING
            ",
        )
        .bind(meal_id)
        .bind(*option_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to link option {option_id}: {e}")))?;
    }
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
}

fn row_to_meal(row: &SqliteRow, options: Vec<LinkedMealOption>) -> AppResult<Meal> {
    let date: String = row.get("date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Meal {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        calories: row.get("calories"),
        date: dates::parse_stored_timestamp(&date)?,
        notes: row.get("notes"),
        options,
        created_at: dates::parse_stored_timestamp(&created_at)?,
        updated_at: dates::parse_stored_timestamp(&updated_at)?,
    })
}
