// ABOUTME: Shopping list aggregation over the meals of a date range
// ABOUTME: Sums ingredient quantities per name and unit across linked meal options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::constants::{limits::MAX_SHOPPING_RANGE_DAYS, messages::MISSING_DATE_RANGE};
use crate::database::{Meal, MealOption};
use crate::errors::{AppError, AppResult};
use crate::utils::dates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Ingredient name as first seen
    pub name: String,
    /// Total amount, rounded to two decimals
    pub quantity: f64,
    /// Unit as first seen
    pub unit: String,
    /// Names of the options needing this ingredient, sorted
    pub used_in: Vec<String>,
}

/// Aggregated ingredients for a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    /// First day, `YYYY-MM-DD`
    pub start: String,
    /// Last day, `YYYY-MM-DD`
    pub end: String,
    /// Meals in the range
    pub meal_count: usize,
    /// Sum of meal calories
    pub total_calories: i64,
    /// Items sorted by name then unit
    pub items: Vec<ShoppingListItem>,
    /// Meals that contributed nothing
    pub meals_without_options: Vec<String>,
}

#[derive(Default)]
struct Accumulator {
    name: String,
    unit: String,
    quantity: f64,
    used_in: BTreeSet<String>,
}

/// Validate and parse the `start`/`end` query parameters
///
/// # Errors
///
/// Returns a 400 error when a bound is missing or unparseable, when `end`
/// precedes `start`, or when the range spans more than a year
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> AppResult<(NaiveDate, NaiveDate)> {
    let (Some(start), Some(end)) = (
        start.filter(|s| !s.trim().is_empty()),
        end.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::missing_field(MISSING_DATE_RANGE));
    };

    let start = dates::parse_date("start", start)?;
    let end = dates::parse_date("end", end)?;

    if end < start {
        return Err(AppError::invalid_input("end must be on or after start"));
    }
    if (end - start).num_days() + 1 > MAX_SHOPPING_RANGE_DAYS {
        return Err(AppError::out_of_range(format!(
            "Date range must not exceed {MAX_SHOPPING_RANGE_DAYS} days"
        )));
    }

    Ok((start, end))
}

/// Aggregate the ingredients of every option linked to `meals`.
///
/// Each meal contributes every ingredient of each of its options once.
/// Ingredients merge when their trimmed names and units match ignoring case.
#[must_use]
pub fn build_shopping_list(
    start: NaiveDate,
    end: NaiveDate,
    meals: &[Meal],
    options: &[MealOption],
) -> ShoppingList {
    let catalogue: HashMap<i64, &MealOption> =
        options.iter().map(|option| (option.id, option)).collect();

    let mut items: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    let mut meals_without_options = Vec::new();

    for meal in meals {
        let linked: Vec<&MealOption> = meal
            .options
            .iter()
            .filter_map(|link| catalogue.get(&link.id).copied())
            .collect();

        if linked.is_empty() {
            meals_without_options.push(meal.name.clone());
            continue;
        }

        for option in linked {
            for ingredient in &option.ingredients {
                let name = ingredient.name.trim();
                let unit = ingredient.unit.trim();
                let entry = items
                    .entry((name.to_lowercase(), unit.to_lowercase()))
                    .or_insert_with(|| Accumulator {
                        name: name.to_owned(),
                        unit: unit.to_owned(),
                        ..Accumulator::default()
                    });
                entry.quantity += ingredient.quantity;
                entry.used_in.insert(option.name.clone());
            }
        }
    }

    ShoppingList {
        start: dates::format_date(start),
        end: dates::format_date(end),
        meal_count: meals.len(),
        total_calories: meals
            .iter()
            .fold(0_i64, |sum, meal| sum.saturating_add(meal.calories)),
        items: items
            .into_values()
            .map(|acc| ShoppingListItem {
                name: acc.name,
                quantity: round_quantity(acc.quantity),
                unit: acc.unit,
                used_in: acc.used_in.into_iter().collect(),
            })
            .collect(),
        meals_without_options,
    }
}

fn round_quantity(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
