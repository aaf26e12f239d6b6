// ABOUTME: Caloric goal storage with range validation and per-user overlap protection
// ABOUTME: Goals cover a date range (open-ended allowed) and never overlap for one user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use super::Database;
use crate::constants::limits::{MAX_DAILY_CALORIES, MIN_DAILY_CALORIES};
use crate::errors::{AppError, AppResult};
use crate::utils::dates;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

const GOAL_COLUMNS: &str =
    "id, user_id, daily_calories, label, start_date, end_date, notes, created_at, updated_at";

/// Daily energy target valid over a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaloricGoal {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Target kcal per day
    pub daily_calories: i64,
    /// Optional label
    pub label: Option<String>,
    /// First day covered
    pub start_date: NaiveDate,
    /// Last day covered, `None` for open-ended
    pub end_date: Option<NaiveDate>,
    /// Free text notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl CaloricGoal {
    /// Whether the goal covers `date`
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Values of a goal to create
#[derive(Debug, Clone)]
pub struct CaloricGoalInput {
    /// Target kcal per day
    pub daily_calories: i64,
    /// Optional label
    pub label: Option<String>,
    /// First day covered
    pub start_date: NaiveDate,
    /// Last day covered
    pub end_date: Option<NaiveDate>,
    /// Free text notes
    pub notes: Option<String>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateCaloricGoalRequest {
    /// New daily target
    pub daily_calories: Option<i64>,
    /// New label, `Some(None)` clears
    pub label: Option<Option<String>>,
    /// New start date
    pub start_date: Option<NaiveDate>,
    /// New end date, `Some(None)` makes the goal open-ended
    pub end_date: Option<Option<NaiveDate>>,
    /// New notes, `Some(None)` clears
    pub notes: Option<Option<String>>,
}

/// Check the calorie bounds and date order of a goal
///
/// # Errors
///
/// Returns a validation error describing the first broken rule
pub fn validate_goal(
    daily_calories: i64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> AppResult<()> {
    if !(MIN_DAILY_CALORIES..=MAX_DAILY_CALORIES).contains(&daily_calories) {
        return Err(AppError::out_of_range(format!(
            "daily_calories must be between {MIN_DAILY_CALORIES} and {MAX_DAILY_CALORIES}"
        )));
    }
    if end_date.is_some_and(|end| end < start_date) {
        return Err(AppError::invalid_input(
            "end_date must be on or after start_date",
        ));
    }
    Ok(())
}

/// Whether two inclusive date ranges share at least one day; `None` ends never close
#[must_use]
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: Option<NaiveDate>,
    b_start: NaiveDate,
    b_end: Option<NaiveDate>,
) -> bool {
    b_end.map_or(true, |end| a_start <= end) && a_end.map_or(true, |end| b_start <= end)
}

impl Database {
    /// Create caloric_goals table
    pub(super) async fn migrate_caloric_goals(&self) -> AppResult<()> {
        self.execute_schema(
            r"
            CREATE TABLE IF NOT EXISTS caloric_goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                daily_calories INTEGER NOT NULL,
                label TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;

        self.execute_schema(
            "CREATE INDEX IF NOT EXISTS idx_caloric_goals_user_start ON caloric_goals(user_id, start_date)",
        )
        .await
    }
}

/// Caloric goal database operations manager
pub struct CaloricGoalManager {
    pool: SqlitePool,
}

impl CaloricGoalManager {
    /// Create a new caloric goal manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a goal
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad values, a conflict error when the
    /// range overlaps another goal of the user, or a database error
    pub async fn create(&self, user_id: i64, input: &CaloricGoalInput) -> AppResult<CaloricGoal> {
        validate_goal(input.daily_calories, input.start_date, input.end_date)?;

        let mut tx = self.begin().await?;
        ensure_no_overlap(&mut *tx, user_id, input.start_date, input.end_date, None).await?;

        let now = dates::format_timestamp(&dates::now());
        let id = sqlx::query(
            r"
            INSERT INTO caloric_goals (user_id, daily_calories, label, start_date, end_date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(user_id)
        .bind(input.daily_calories)
        .bind(&input.label)
        .bind(dates::format_date(input.start_date))
        .bind(input.end_date.map(dates::format_date))
        .bind(&input.notes)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create caloric goal: {e}")))?
        .last_insert_rowid();

        commit(tx).await?;

        self.get(user_id, id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Caloric goal {id} vanished after insert")))
    }

    /// Get one goal of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, user_id: i64, id: i64) -> AppResult<Option<CaloricGoal>> {
        let row = sqlx::query(&format!(
            "SELECT {GOAL_COLUMNS} FROM caloric_goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get caloric goal {id}: {e}")))?;

        row.as_ref().map(row_to_goal).transpose()
    }

    /// All goals of a user, most recent start first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, user_id: i64) -> AppResult<Vec<CaloricGoal>> {
        let rows = sqlx::query(&format!(
            "SELECT {GOAL_COLUMNS} FROM caloric_goals WHERE user_id = $1 ORDER BY start_date DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list caloric goals: {e}")))?;

        rows.iter().map(row_to_goal).collect()
    }

    /// The goal covering `date`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_active(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<CaloricGoal>> {
        let day = dates::format_date(date);
        let row = sqlx::query(&format!(
            r"
            SELECT {GOAL_COLUMNS} FROM caloric_goals
            WHERE user_id = $1 AND start_date <= $2 AND (end_date IS NULL OR end_date >= $2)
            ORDER BY start_date DESC
            LIMIT 1
            "
        ))
        .bind(user_id)
        .bind(&day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find active caloric goal: {e}")))?;

        row.as_ref().map(row_to_goal).transpose()
    }

    /// Apply a partial update, re-validating the merged goal
    ///
    /// # Errors
    ///
    /// Same as [`CaloricGoalManager::create`]; the goal itself is ignored by
    /// the overlap check
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        request: &UpdateCaloricGoalRequest,
    ) -> AppResult<Option<CaloricGoal>> {
        let Some(existing) = self.get(user_id, id).await? else {
            return Ok(None);
        };

        let daily_calories = request.daily_calories.unwrap_or(existing.daily_calories);
        let start_date = request.start_date.unwrap_or(existing.start_date);
        let end_date = request.end_date.unwrap_or(existing.end_date);
        let label = request.label.clone().unwrap_or(existing.label);
        let notes = request.notes.clone().unwrap_or(existing.notes);
        validate_goal(daily_calories, start_date, end_date)?;

        let mut tx = self.begin().await?;
        ensure_no_overlap(&mut *tx, user_id, start_date, end_date, Some(id)).await?;

        sqlx::query(
            r"
            UPDATE caloric_goals SET
                daily_calories = $1, label = $2, start_date = $3, end_date = $4, notes = $5, updated_at = $6
            WHERE id = $7 AND user_id = $8
            ",
        )
        .bind(daily_calories)
        .bind(&label)
        .bind(dates::format_date(start_date))
        .bind(end_date.map(dates::format_date))
        .bind(&notes)
        .bind(dates::format_timestamp(&dates::now()))
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update caloric goal {id}: {e}")))?;

        commit(tx).await?;
        self.get(user_id, id).await
    }

    /// Delete a goal of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM caloric_goals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete caloric goal {id}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to start transaction: {e}")))
    }
}

async fn ensure_no_overlap(
    conn: &mut SqliteConnection,
    user_id: i64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let rows = sqlx::query(&format!(
        "SELECT {GOAL_COLUMNS} FROM caloric_goals WHERE user_id = $1 AND id != $2"
    ))
    .bind(user_id)
    .bind(exclude_id.unwrap_or(-1))
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to check goal overlap: {e}")))?;

    for row in &rows {
        let other = row_to_goal(row)?;
        if ranges_overlap(start_date, end_date, other.start_date, other.end_date) {
            return Err(AppError::conflict(format!(
                "Caloric goal overlaps existing goal {} starting {}",
                other.id,
                dates::format_date(other.start_date)
            )));
        }
    }
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
}

fn row_to_goal(row: &SqliteRow) -> AppResult<CaloricGoal> {
    let start_date: String = row.get("start_date");
    let end_date: Option<String> = row.get("end_date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(CaloricGoal {
        id: row.get("id"),
        user_id: row.get("user_id"),
        daily_calories: row.get("daily_calories"),
        label: row.get("label"),
        start_date: dates::parse_stored_date(&start_date)?,
        end_date: end_date.as_deref().map(dates::parse_stored_date).transpose()?,
        notes: row.get("notes"),
        created_at: dates::parse_stored_timestamp(&created_at)?,
        updated_at: dates::parse_stored_timestamp(&updated_at)?,
    })
}
