// ABOUTME: Meal planning algorithms working on loaded meals and meal options
// ABOUTME: Shopping list aggregation and calorie-targeted meal plan selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Planning Module
//!
//! Pure functions over data already loaded from the database. Handlers load
//! meals and options, call into this module, and serialize the result.
//!
//! - **shopping_list**: sums ingredient quantities of the options linked to a
//!   range of meals
//! - **meal_plan**: picks at most one option per meal time so the day lands
//!   as close as possible to a calorie target without exceeding it by more
//!   than ten percent
//! - **weekly_report**: per-day calorie totals of a Monday to Sunday week
//!   classified against the caloric goal

/// Calorie-targeted meal plan selection
pub mod meal_plan;
/// Ingredient aggregation over a date range
pub mod shopping_list;
/// Weekly calorie statistics
pub mod weekly_report;

pub use meal_plan::{plan_meals, MealPlan, PlannedMeal};
pub use shopping_list::{build_shopping_list, parse_range, ShoppingList, ShoppingListItem};
pub use weekly_report::{
    build_weekly_report, resolve_week_start, week_end, DailyBreakdown, DayStatus, GoalAdherence,
    WeeklyReport,
};
