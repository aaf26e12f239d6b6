// ABOUTME: Deterministic daily meal plan selection against a calorie target
// ABOUTME: Bounded knapsack over meal times choosing at most one option per slot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Plan generation picks at most one meal option per meal time so that the
//! summed `estimated_calories` lands as close as possible to the target
//! without ever exceeding `target * 1.10`.
//!
//! The search is a dynamic program keyed on exact totals in hundredths of a
//! kilocalorie, so the cap is checked without rounding and two partial plans
//! only compete when their totals are equal.

use crate::constants::limits::{MAX_DAILY_CALORIES, MIN_DAILY_CALORIES, PLAN_TOLERANCE_PERCENT};
use crate::database::{MealOption, MealTime};
use crate::errors::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One chosen option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    /// Meal time name (`lunch`)
    pub meal_time: String,
    /// Chosen option id
    pub meal_option_id: i64,
    /// Chosen option name
    pub meal_option_name: String,
    /// Option estimate in kcal
    pub estimated_calories: f64,
}

/// Result of plan selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Requested daily target
    pub target_calories: i64,
    /// Sum of chosen estimates
    pub total_calories: f64,
    /// `total_calories - target_calories`
    pub difference: f64,
    /// Chosen options in meal time order
    pub meals: Vec<PlannedMeal>,
    /// Meal times left out of the plan, if any
    pub notes: Option<String>,
}

impl MealPlan {
    /// Ids of the chosen options
    #[must_use]
    pub fn option_ids(&self) -> Vec<i64> {
        self.meals.iter().map(|meal| meal.meal_option_id).collect()
    }
}

/// Hundredths of a kilocalorie per kilocalorie
const CENTI: f64 = 100.0;

/// Partial selection reaching one exact total
#[derive(Clone)]
struct Selection {
    skipped: usize,
    /// One slot per processed meal time
    picks: Vec<Option<usize>>,
}

struct Slot<'a> {
    meal_time: &'a MealTime,
    options: Vec<&'a MealOption>,
}

fn eligible_calories(option: &MealOption) -> Option<f64> {
    option
        .estimated_calories
        .filter(|calories| calories.is_finite() && *calories >= 0.0)
}

fn to_centi(calories: f64) -> i64 {
    (calories * CENTI).round() as i64
}

/// At equal totals: fewer skipped slots first, then lexicographically lower option ids
fn prefer(candidate: &Selection, current: &Selection, slots: &[Slot<'_>]) -> bool {
    match candidate.skipped.cmp(&current.skipped) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => pick_ids(candidate, slots) < pick_ids(current, slots),
    }
}

fn pick_ids(selection: &Selection, slots: &[Slot<'_>]) -> Vec<Option<i64>> {
    selection
        .picks
        .iter()
        .zip(slots)
        .map(|(pick, slot)| pick.map(|index| slot.options[index].id))
        .collect()
}

fn offer(
    table: &mut BTreeMap<i64, Selection>,
    total: i64,
    candidate: Selection,
    slots: &[Slot<'_>],
) {
    match table.get(&total) {
        Some(current) if !prefer(&candidate, current, slots) => {}
        _ => {
            table.insert(total, candidate);
        }
    }
}

/// Select a meal plan for `target` kcal.
///
/// `meal_times` gives the slot order; `options` is the full catalogue. Options
/// without a finite, non-negative estimate are ignored. Meal times left
/// without eligible options, or skipped because nothing fits, are listed in
/// `notes`.
///
/// # Errors
///
/// Returns a 400 error when `target` is outside the accepted daily range, and
/// a 404 error when no option has an estimate or when no non-empty
/// combination fits under the cap
pub fn plan_meals(
    target: i64,
    meal_times: &[MealTime],
    options: &[MealOption],
) -> AppResult<MealPlan> {
    if !(MIN_DAILY_CALORIES..=MAX_DAILY_CALORIES).contains(&target) {
        return Err(AppError::out_of_range(format!(
            "target_calories must be between {MIN_DAILY_CALORIES} and {MAX_DAILY_CALORIES}"
        )));
    }

    let mut ordered_times: Vec<&MealTime> = meal_times.iter().collect();
    ordered_times.sort_by_key(|time| (time.sort_order, time.id));

    let mut unavailable = Vec::new();
    let mut slots = Vec::new();
    for meal_time in ordered_times {
        let mut candidates: Vec<&MealOption> = options
            .iter()
            .filter(|option| {
                option.meal_time.id == meal_time.id && eligible_calories(option).is_some()
            })
            .collect();
        candidates.sort_by_key(|option| option.id);

        if candidates.is_empty() {
            unavailable.push(meal_time.name.clone());
        } else {
            slots.push(Slot {
                meal_time,
                options: candidates,
            });
        }
    }

    if slots.is_empty() {
        return Err(AppError::new(
            ErrorCode::ResourceNotFound,
            "No meal options with estimated calories available",
        ));
    }

    // target kcal * (100 + tolerance) / 100, expressed in hundredths
    let cap = target * (100 + PLAN_TOLERANCE_PERCENT);
    let target_centi = target * 100;

    let mut table = BTreeMap::from([(
        0_i64,
        Selection {
            skipped: 0,
            picks: Vec::new(),
        },
    )]);

    for slot in &slots {
        let mut next = BTreeMap::new();
        for (total, selection) in &table {
            let mut skipped = selection.clone();
            skipped.skipped += 1;
            skipped.picks.push(None);
            offer(&mut next, *total, skipped, &slots);

            for (index, option) in slot.options.iter().enumerate() {
                let Some(calories) = eligible_calories(option) else {
                    continue;
                };
                let weight = to_centi(calories);
                if weight > cap - total {
                    continue;
                }
                let reached = total + weight;
                let mut taken = selection.clone();
                taken.picks.push(Some(index));
                offer(&mut next, reached, taken, &slots);
            }
        }
        table = next;
    }

    let (best_total, best) = table
        .into_iter()
        .filter(|(_, selection)| selection.picks.iter().any(Option::is_some))
        .min_by(|(a_total, a), (b_total, b)| {
            (a_total - target_centi)
                .abs()
                .cmp(&(b_total - target_centi).abs())
                .then(a.skipped.cmp(&b.skipped))
                .then(a_total.cmp(b_total))
                .then_with(|| pick_ids(a, &slots).cmp(&pick_ids(b, &slots)))
        })
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ResourceNotFound,
                format!("No meal plan fits within 110% of {target} kcal"),
            )
        })?;

    let mut meals = Vec::new();
    for (slot, pick) in slots.iter().zip(&best.picks) {
        match pick {
            Some(index) => {
                let option = slot.options[*index];
                meals.push(PlannedMeal {
                    meal_time: slot.meal_time.name.clone(),
                    meal_option_id: option.id,
                    meal_option_name: option.name.clone(),
                    estimated_calories: eligible_calories(option).unwrap_or_default(),
                });
            }
            None => unavailable.push(slot.meal_time.name.clone()),
        }
    }

    Ok(MealPlan {
        target_calories: target,
        total_calories: best_total as f64 / CENTI,
        difference: (best_total - target_centi) as f64 / CENTI,
        meals,
        notes: skipped_note(&unavailable, meal_times),
    })
}

fn skipped_note(skipped: &[String], meal_times: &[MealTime]) -> Option<String> {
    if skipped.is_empty() {
        return None;
    }
    let mut ordered: Vec<&MealTime> = meal_times
        .iter()
        .filter(|time| skipped.contains(&time.name))
        .collect();
    ordered.sort_by_key(|time| (time.sort_order, time.id));
    let names: Vec<&str> = ordered.iter().map(|time| time.name.as_str()).collect();
    Some(format!("Skipped meal times: {}", names.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::dates;

    fn times() -> Vec<MealTime> {
        ["breakfast", "lunch", "snack", "dinner"]
            .iter()
            .zip(1_i64..)
            .map(|(name, id)| MealTime {
                id,
                name: (*name).to_owned(),
                label: name.to_uppercase(),
                sort_order: id,
            })
            .collect()
    }

    fn option(id: i64, time: i64, calories: Option<f64>) -> MealOption {
        MealOption {
            id,
            name: format!("Option {id}"),
            description: None,
            estimated_calories: calories,
            meal_time: times()[(time - 1) as usize].clone(),
            ingredients: Vec::new(),
            created_at: dates::now(),
            updated_at: dates::now(),
        }
    }

    #[test]
    fn test_exact_fit_uses_every_meal_time() {
        let options = vec![
            option(1, 1, Some(400.0)),
            option(2, 1, Some(600.0)),
            option(3, 2, Some(700.0)),
            option(4, 3, Some(200.0)),
            option(5, 4, Some(700.0)),
            option(6, 4, Some(900.0)),
        ];
        let plan = plan_meals(2000, &times(), &options).unwrap();

        assert!((plan.total_calories - 2000.0).abs() < f64::EPSILON);
        assert!(plan.difference.abs() < f64::EPSILON);
        assert_eq!(plan.meals.len(), 4);
        assert_eq!(plan.option_ids(), vec![1, 3, 4, 5]);
        assert!(plan.notes.is_none());
    }

    #[test]
    fn test_never_exceeds_tolerance() {
        let options = vec![
            option(1, 1, Some(450.5)),
            option(2, 2, Some(900.0)),
            option(3, 4, Some(1200.0)),
        ];
        let plan = plan_meals(1500, &times(), &options).unwrap();

        assert!(plan.total_calories <= 1650.0);
        assert_eq!(plan.option_ids(), vec![1, 2]);
        assert!((plan.total_calories - 1350.5).abs() < f64::EPSILON);
        assert_eq!(plan.notes.as_deref(), Some("Skipped meal times: snack, dinner"));
    }

    #[test]
    fn test_skipped_meal_times_are_noted() {
        let options = vec![option(1, 2, Some(600.0)), option(2, 4, None)];
        let plan = plan_meals(600, &times(), &options).unwrap();

        assert_eq!(plan.option_ids(), vec![1]);
        assert_eq!(plan.notes.as_deref(), Some("Skipped meal times: breakfast, snack, dinner"));
    }

    #[test]
    fn test_tie_prefers_lower_ids() {
        let options = vec![option(7, 2, Some(800.0)), option(3, 2, Some(800.0))];
        let plan = plan_meals(800, &times(), &options).unwrap();
        assert_eq!(plan.option_ids(), vec![3]);
    }

    #[test]
    fn test_tie_prefers_fewer_skipped() {
        let options = vec![
            option(1, 1, Some(1000.0)),
            option(2, 2, Some(500.0)),
            option(3, 4, Some(500.0)),
        ];
        let plan = plan_meals(1000, &times(), &options).unwrap();
        assert_eq!(plan.option_ids(), vec![2, 3]);
    }

    #[test]
    fn test_closest_total_wins_over_lower_id() {
        let options = vec![option(1, 2, Some(999.1)), option(2, 2, Some(1000.0))];
        let plan = plan_meals(1000, &times(), &options).unwrap();

        assert_eq!(plan.option_ids(), vec![2]);
        assert!((plan.total_calories - 1000.0).abs() < f64::EPSILON);
        assert!(plan.difference.abs() < f64::EPSILON);
    }

    #[test]
    fn test_fractional_estimates_may_reach_cap_exactly() {
        let options = vec![option(1, 1, Some(550.4)), option(2, 2, Some(549.6))];
        let plan = plan_meals(1000, &times(), &options).unwrap();

        assert_eq!(plan.option_ids(), vec![1, 2]);
        assert!((plan.total_calories - 1100.0).abs() < 1e-9);
        assert!((plan.difference - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_fitting_combination() {
        let options = vec![option(1, 1, Some(5000.0))];
        let err = plan_meals(1000, &times(), &options).unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
        assert!(err.message.contains("110%"));
    }

    #[test]
    fn test_empty_catalogue_and_bad_target() {
        assert_eq!(
            plan_meals(2000, &times(), &[option(1, 1, None)]).unwrap_err().code,
            ErrorCode::ResourceNotFound
        );
        assert_eq!(
            plan_meals(100, &times(), &[option(1, 1, Some(50.0))]).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }
}
