// ABOUTME: Meal option catalogue storage with owned ingredient lists
// ABOUTME: CRUD with transactional ingredient replacement and batch loading by id
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

const OPTION_COLUMNS: &str = r"
    SELECT o.id, o.name, o.description, o.estimated_calories, o.created_at, o.updated_at,
           t.id AS mt_id, t.name AS mt_name, t.label AS mt_label, t.sort_order AS mt_sort_order
    FROM meal_options o
    JOIN meal_times t ON t.id = o.meal_time_id
";

/// Ingredient of a meal option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Amount, always positive
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
}

/// Ingredient to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIngredient {
    /// Ingredient name
    pub name: String,
    /// Amount, always positive
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
}

/// Catalogue entry assignable to meals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealOption {
    /// Unique identifier
    pub id: i64,
    /// Option name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Estimated energy in kcal
    pub estimated_calories: Option<f64>,
    /// Slot of the day
    pub meal_time: MealTime,
    /// Ingredients in insertion order
    pub ingredients: Vec<Ingredient>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Request to create a meal option
#[derive(Debug, Clone)]
pub struct CreateMealOptionRequest {
    /// Option name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Owning meal time
    pub meal_time_id: i64,
    /// Estimated energy in kcal
    pub estimated_calories: Option<f64>,
    /// Ingredients to insert
    pub ingredients: Vec<NewIngredient>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateMealOptionRequest {
    /// New name
    pub name: Option<String>,
    /// New description, `Some(None)` clears
    pub description: Option<Option<String>>,
    /// New meal time
    pub meal_time_id: Option<i64>,
    /// New estimate, `Some(None)` clears
    pub estimated_calories: Option<Option<f64>>,
    /// Replacement ingredient list
    pub ingredients: Option<Vec<NewIngredient>>,
}

impl Database {
    /// Create meal_options and ingredients tables
    pub(super) async fn migrate_meal_options(&self) -> AppResult<()> {
        self.execute_schema(
            r"
            CREATE TABLE IF NOT EXISTS meal_options (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                meal_time_id INTEGER NOT NULL REFERENCES meal_times(id),
                estimated_calories REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;

        self.execute_schema(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meal_option_id INTEGER NOT NULL REFERENCES meal_options(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                quantity REAL NOT NULL CHECK (quantity > 0),
                unit TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .await?;

        self.execute_schema(
            "CREATE INDEX IF NOT EXISTS idx_meal_options_meal_time ON meal_options(meal_time_id)",
        )
        .await?;
        self.execute_schema(
            "CREATE INDEX IF NOT EXISTS idx_ingredients_option ON ingredients(meal_option_id)",
        )
        .await
    }
}

/// Meal option database operations manager
pub struct MealOptionManager {
    pool: SqlitePool,
}

impl MealOptionManager {
    /// Create a new meal option manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an option and its ingredients in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails
    pub async fn create(&self, request: &CreateMealOptionRequest) -> AppResult<MealOption> {
        let now = dates::format_timestamp(&dates::now());
        let mut tx = self.begin().await?;

        let id = sqlx::query(
            r"
            INSERT INTO meal_options (name, description, meal_time_id, estimated_calories, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.meal_time_id)
        .bind(request.estimated_calories)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create meal option: {e}")))?
        .last_insert_rowid();

        insert_ingredients(&mut tx, id, &request.ingredients).await?;
        commit(tx).await?;

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Meal option {id} vanished after insert")))
    }

    /// Get one option with its ingredients
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<MealOption>> {
        Ok(self.get_many(&[id]).await?.into_iter().next())
    }

    /// Get options by id, silently skipping unknown ids
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_many(&self, ids: &[i64]) -> AppResult<Vec<MealOption>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(OPTION_COLUMNS);
        builder.push(" WHERE o.id");
        push_id_list(&mut builder, ids);
        builder.push(" ORDER BY t.sort_order, o.name, o.id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load meal options: {e}")))?;

        self.attach_ingredients(&rows).await
    }

    /// List the catalogue, optionally restricted to one meal time name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, meal_time: Option<&str>) -> AppResult<Vec<MealOption>> {
        let mut builder = QueryBuilder::<Sqlite>::new(OPTION_COLUMNS);
        if let Some(name) = meal_time {
            builder.push(" WHERE t.name = ");
            builder.push_bind(name.trim().to_lowercase());
        }
        builder.push(" ORDER BY t.sort_order, o.name, o.id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list meal options: {e}")))?;

        self.attach_ingredients(&rows).await
    }

    /// Ids among `ids` that do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn missing_ids(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM meal_options WHERE id");
        push_id_list(&mut builder, ids);
        let found: Vec<i64> = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check meal options: {e}")))?
            .iter()
            .map(|row| row.get("id"))
            .collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Apply a partial update; ingredients are replaced wholesale when given
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateMealOptionRequest,
    ) -> AppResult<Option<MealOption>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let description = request
            .description
            .clone()
            .unwrap_or(existing.description);
        let meal_time_id = request.meal_time_id.unwrap_or(existing.meal_time.id);
        let estimated_calories = request
            .estimated_calories
            .unwrap_or(existing.estimated_calories);

        let mut tx = self.begin().await?;
        sqlx::query(
            r"
            UPDATE meal_options SET
                name = $1, description = $2, meal_time_id = $3, estimated_calories = $4, updated_at = $5
            WHERE id = $6
            ",
        )
        .bind(name)
        .bind(&description)
        .bind(meal_time_id)
        .bind(estimated_calories)
        .bind(dates::format_timestamp(&dates::now()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update meal option {id}: {e}")))?;

        if let Some(ingredients) = &request.ingredients {
            sqlx::query("DELETE FROM ingredients WHERE meal_option_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to clear ingredients of {id}: {e}"))
                })?;
            insert_ingredients(&mut tx, id, ingredients).await?;
        }
        commit(tx).await?;

        self.get(id).await
    }

    /// Delete an option; ingredients and meal links cascade
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meal_options WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete meal option {id}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to start transaction: {e}")))
    }

    async fn attach_ingredients(&self, rows: &[SqliteRow]) -> AppResult<Vec<MealOption>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.get("id")).collect();
        let mut by_option = self.load_ingredients(&ids).await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.get("id");
                row_to_meal_option(row, by_option.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn load_ingredients(
        &self,
        option_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<Ingredient>>> {
        let mut grouped: HashMap<i64, Vec<Ingredient>> = HashMap::new();
        if option_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, meal_option_id, name, quantity, unit FROM ingredients WHERE meal_option_id",
        );
        push_id_list(&mut builder, option_ids);
        builder.push(" ORDER BY meal_option_id, position, id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load ingredients: {e}")))?;

        for row in &rows {
            grouped
                .entry(row.get("meal_option_id"))
                .or_default()
                .push(Ingredient {
                    id: row.get("id"),
                    name: row.get("name"),
                    quantity: row.get("quantity"),
                    unit: row.get("unit"),
                });
        }

        Ok(grouped)
    }
}

async fn insert_ingredients(
    tx: &mut Transaction<'static, Sqlite>,
    option_id: i64,
    ingredients: &[NewIngredient],
) -> AppResult<()> {
    for (position, ingredient) in (0_i64..).zip(ingredients) {
        sqlx::query(
            r"
            INSERT INTO ingredients (meal_option_id, name, quantity, unit, position)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(option_id)
        .bind(&ingredient.name)
        .bind(ingredient.quantity)
        .bind(&ingredient.unit)
        .bind(position)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;
    }
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
}

fn row_to_meal_option(row: &SqliteRow, ingredients: Vec<Ingredient>) -> AppResult<MealOption> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(MealOption {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        estimated_calories: row.get("estimated_calories"),
        meal_time: MealTime::from_prefixed_row(row, "mt_"),
        ingredients,
        created_at: dates::parse_stored_timestamp(&created_at)?,
        updated_at: dates::parse_stored_timestamp(&updated_at)?,
    })
}
