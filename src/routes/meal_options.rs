// ABOUTME: Route handlers for the global meal option catalogue
// ABOUTME: CRUD over options and their ingredient lists with meal time resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Meal option routes
//!
//! Options are shared by all users; every endpoint still requires a valid
//! Bearer token. A meal time can be given by id or by name.

use crate::{
    constants::{limits::MAX_MEAL_CALORIES, messages::MEAL_OPTION_DELETED},
    database::{
        meal_options::{CreateMealOptionRequest, UpdateMealOptionRequest},
        Ingredient, MealOption, MealTime, NewIngredient,
    },
    errors::{AppError, AppResult},
    resources::ServerResources,
    routes::{normalize_text, parse_id, require, validate_name},
    utils::{dates, json::MessageResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Meal time as embedded in option responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealTimeSummary {
    /// Meal time id
    pub id: i64,
    /// Machine name
    pub name: String,
    /// Display label
    pub label: String,
}

impl From<MealTime> for MealTimeSummary {
    fn from(meal_time: MealTime) -> Self {
        Self {
            id: meal_time.id,
            name: meal_time.name,
            label: meal_time.label,
        }
    }
}

/// Response for a meal option
#[derive(Debug, Serialize, Deserialize)]
pub struct MealOptionResponse {
    /// Option id
    pub id: i64,
    /// Option name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Estimated kcal
    pub estimated_calories: Option<f64>,
    /// Slot of the day
    pub meal_time: MealTimeSummary,
    /// Ingredients in insertion order
    pub ingredients: Vec<Ingredient>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<MealOption> for MealOptionResponse {
    fn from(option: MealOption) -> Self {
        Self {
            id: option.id,
            name: option.name,
            description: option.description,
            estimated_calories: option.estimated_calories,
            meal_time: option.meal_time.into(),
            ingredients: option.ingredients,
            created_at: dates::format_timestamp(&option.created_at),
            updated_at: dates::format_timestamp(&option.updated_at),
        }
    }
}

/// Ingredient in a request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientBody {
    /// Ingredient name
    pub name: Option<String>,
    /// Positive amount
    pub quantity: Option<f64>,
    /// Unit of `quantity`
    pub unit: Option<String>,
}

impl IngredientBody {
    fn validate(self, position: usize) -> AppResult<NewIngredient> {
        let name = normalize_text(self.name).ok_or_else(|| {
            AppError::missing_field(format!("ingredients[{position}].name is required"))
        })?;
        let unit = normalize_text(self.unit).ok_or_else(|| {
            AppError::missing_field(format!("ingredients[{position}].unit is required"))
        })?;
        let quantity = self.quantity.ok_or_else(|| {
            AppError::missing_field(format!("ingredients[{position}].quantity is required"))
        })?;
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::out_of_range(format!(
                "ingredients[{position}].quantity must be greater than 0"
            )));
        }

        Ok(NewIngredient {
            name,
            quantity,
            unit,
        })
    }
}

fn validate_ingredients(ingredients: Vec<IngredientBody>) -> AppResult<Vec<NewIngredient>> {
    ingredients
        .into_iter()
        .enumerate()
        .map(|(position, ingredient)| ingredient.validate(position))
        .collect()
}

fn validate_estimate(estimate: Option<f64>) -> AppResult<Option<f64>> {
    match estimate {
        Some(value) if !(0.0..=MAX_MEAL_CALORIES as f64).contains(&value) => {
            Err(AppError::out_of_range(format!(
                "estimated_calories must be between 0 and {MAX_MEAL_CALORIES}"
            )))
        }
        other => Ok(other),
    }
}

/// Request body for creating a meal option
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMealOptionBody {
    /// Option name
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Meal time by id
    pub meal_time_id: Option<i64>,
    /// Meal time by name, used when no id is given
    pub meal_time: Option<String>,
    /// Estimated kcal
    pub estimated_calories: Option<f64>,
    /// Ingredients
    pub ingredients: Option<Vec<IngredientBody>>,
}

/// Request body for updating a meal option; absent fields are unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMealOptionBody {
    /// New name
    pub name: Option<String>,
    /// New description, `null` clears
    #[serde(default, deserialize_with = "crate::utils::json::deserialize_some")]
    pub description: Option<Option<String>>,
    /// New meal time by id
    pub meal_time_id: Option<i64>,
    /// New meal time by name
    pub meal_time: Option<String>,
    /// New estimate, `null` clears
    #[serde(default, deserialize_with = "crate::utils::json::deserialize_some")]
    pub estimated_calories: Option<Option<f64>>,
    /// Replacement ingredient list
    pub ingredients: Option<Vec<IngredientBody>>,
}

/// Query parameters for listing options
#[derive(Debug, Deserialize, Default)]
pub struct ListMealOptionsQuery {
    /// Meal time name filter
    pub meal_time: Option<String>,
}

/// Meal option routes
pub struct MealOptionRoutes;

impl MealOptionRoutes {
    /// Create meal option routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/meal-options",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/meal-options/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn authenticate(headers: &HeaderMap, resources: &Arc<ServerResources>) -> AppResult<()> {
        resources
            .auth_middleware
            .authenticate_request_with_headers(headers)
            .await
            .map(|_| ())
    }

    /// Resolve a meal time from an id or a name; `None` when neither is given
    async fn resolve_meal_time(
        resources: &Arc<ServerResources>,
        id: Option<i64>,
        name: Option<String>,
    ) -> AppResult<Option<MealTime>> {
        let meal_times = resources.database.meal_times();
        if let Some(id) = id {
            return meal_times
                .get_by_id(id)
                .await?
                .map(Some)
                .ok_or_else(|| AppError::not_found(format!("Meal time {id}")));
        }
        match normalize_text(name) {
            Some(name) => meal_times
                .get_by_name(&name)
                .await?
                .map(Some)
                .ok_or_else(|| AppError::not_found(format!("Meal time {name}"))),
            None => Ok(None),
        }
    }

    /// Handle GET /api/meal-options
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListMealOptionsQuery>,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources).await?;

        let filter = Self::resolve_meal_time(&resources, None, query.meal_time)
            .await?
            .map(|meal_time| meal_time.name);
        let options = resources
            .database
            .meal_options()
            .list(filter.as_deref())
            .await?;

        let response: Vec<MealOptionResponse> = options.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/meal-options
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateMealOptionBody>,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources).await?;

        let name = validate_name("name", &require(body.name, "name")?)?;
        let meal_time = require(
            Self::resolve_meal_time(&resources, body.meal_time_id, body.meal_time).await?,
            "meal_time_id or meal_time",
        )?;
        let request = CreateMealOptionRequest {
            name,
            description: normalize_text(body.description),
            meal_time_id: meal_time.id,
            estimated_calories: validate_estimate(body.estimated_calories)?,
            ingredients: validate_ingredients(body.ingredients.unwrap_or_default())?,
        };

        let option = resources.database.meal_options().create(&request).await?;
        tracing::info!(option_id = option.id, "Created meal option {}", option.name);

        let response: MealOptionResponse = option.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/meal-options/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources).await?;
        let id = parse_id("MealOption", &id)?;

        let option = resources
            .database
            .meal_options()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("MealOption {id}")))?;

        let response: MealOptionResponse = option.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/meal-options/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateMealOptionBody>,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources).await?;
        let id = parse_id("MealOption", &id)?;

        let name = body
            .name
            .map(|name| validate_name("name", &name))
            .transpose()?;
        let meal_time =
            Self::resolve_meal_time(&resources, body.meal_time_id, body.meal_time).await?;
        let estimated_calories = body
            .estimated_calories
            .map(validate_estimate)
            .transpose()?;
        let ingredients = body.ingredients.map(validate_ingredients).transpose()?;

        let request = UpdateMealOptionRequest {
            name,
            description: body.description.map(normalize_text),
            meal_time_id: meal_time.map(|meal_time| meal_time.id),
            estimated_calories,
            ingredients,
        };

        let option = resources
            .database
            .meal_options()
            .update(id, &request)
            .await?
            .ok_or_else(|| AppError::not_found(format!("MealOption {id}")))?;

        let response: MealOptionResponse = option.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/meal-options/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources).await?;
        let id = parse_id("MealOption", &id)?;

        if !resources.database.meal_options().delete(id).await? {
            return Err(AppError::not_found(format!("MealOption {id}")));
        }

        tracing::info!(option_id = id, "Deleted meal option");
        Ok((StatusCode::OK, Json(MessageResponse::new(MEAL_OPTION_DELETED))).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_ingredient_validation() {
        let ok = IngredientBody {
            name: Some(" Rice ".to_owned()),
            quantity: Some(150.0),
            unit: Some("g".to_owned()),
        }
        .validate(0)
        .unwrap();
        assert_eq!(ok.name, "Rice");

        let zero = IngredientBody {
            name: Some("Rice".to_owned()),
            quantity: Some(0.0),
            unit: Some("g".to_owned()),
        }
        .validate(1)
        .unwrap_err();
        assert_eq!(zero.code, ErrorCode::ValueOutOfRange);
        assert!(zero.message.contains("ingredients[1]"));

        let no_unit = IngredientBody {
            name: Some("Rice".to_owned()),
            quantity: Some(1.0),
            unit: Some(" ".to_owned()),
        }
        .validate(0)
        .unwrap_err();
        assert_eq!(no_unit.http_status(), 400);
    }

    #[test]
    fn test_update_body_distinguishes_null() {
        let body: UpdateMealOptionBody =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(body.description, Some(None));
        assert_eq!(body.estimated_calories, None);

        let body: UpdateMealOptionBody =
            serde_json::from_str(r#"{"estimated_calories": 320.5}"#).unwrap();
        assert_eq!(body.estimated_calories, Some(Some(320.5)));
    }

    #[test]
    fn test_estimate_validation() {
        assert!(validate_estimate(Some(-1.0)).is_err());
        assert_eq!(validate_estimate(None).unwrap(), None);
        assert_eq!(validate_estimate(Some(0.0)).unwrap(), Some(0.0));
        assert!(validate_estimate(Some(f64::NAN)).is_err());
        assert!(validate_estimate(Some(10_000.5)).is_err());
    }
}
