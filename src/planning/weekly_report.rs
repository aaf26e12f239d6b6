// ABOUTME: Weekly calorie report comparing logged meals against the caloric goal
// ABOUTME: Per-day totals, adherence status counts and the ISO week start rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use crate::constants::limits::REPORT_TOLERANCE_PERCENT;
use crate::database::Meal;
use crate::errors::{AppError, AppResult};
use crate::utils::dates;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DAYS_IN_WEEK: u64 = 7;

/// How a day compares to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Within the tolerance of the target
    OnTarget,
    /// Above the tolerance
    Over,
    /// Below the tolerance
    Under,
    /// No meals logged
    NotTracked,
}

/// One day of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBreakdown {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Daily calorie target
    pub target: i64,
    /// Logged calories
    pub actual: i64,
    /// `actual - target`
    pub difference: i64,
    /// Classification of the day
    pub status: DayStatus,
}

/// Day counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAdherence {
    /// Days within the tolerance
    pub days_on_target: usize,
    /// Days above it
    pub days_over: usize,
    /// Days below it
    pub days_under: usize,
    /// Days without meals
    pub days_not_tracked: usize,
}

/// Calorie statistics for one Monday to Sunday week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// Monday, `YYYY-MM-DD`
    pub week_start: String,
    /// Sunday, `YYYY-MM-DD`
    pub week_end: String,
    /// Daily target from the caloric goal
    pub target_calories: i64,
    /// Calories logged during the week
    pub total_calories: i64,
    /// Mean over tracked days, rounded; 0 when nothing was logged
    pub average_calories: i64,
    /// Days with at least one meal
    pub days_tracked: usize,
    /// Status counts over the seven days
    pub goal_adherence: GoalAdherence,
    /// Seven entries, Monday first
    pub daily_breakdown: Vec<DailyBreakdown>,
}

/// Resolve the `week_start` query parameter.
///
/// Absent or blank means the Monday of the week containing `today`.
///
/// # Errors
///
/// Returns a 400 error when the value is not `YYYY-MM-DD` or not a Monday
pub fn resolve_week_start(raw: Option<&str>, today: NaiveDate) -> AppResult<NaiveDate> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        let offset = u64::from(today.weekday().num_days_from_monday());
        return Ok(today.checked_sub_days(Days::new(offset)).unwrap_or(today));
    };

    let monday = dates::parse_date("week_start", raw)
        .map_err(|_| AppError::invalid_format("Invalid week_start format. Use YYYY-MM-DD."))?;
    if monday.weekday() != Weekday::Mon {
        return Err(AppError::invalid_input("week_start must be a Monday (ISO 8601)."));
    }
    Ok(monday)
}

/// Sunday of the week starting at `week_start`
#[must_use]
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start
        .checked_add_days(Days::new(DAYS_IN_WEEK - 1))
        .unwrap_or(NaiveDate::MAX)
}

/// Build the report for the week starting at `week_start`.
///
/// Meals dated outside the week are ignored.
#[must_use]
pub fn build_weekly_report(week_start: NaiveDate, target: i64, meals: &[Meal]) -> WeeklyReport {
    let end = week_end(week_start);

    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for meal in meals {
        let day = meal.date.date_naive();
        if day < week_start || day > end {
            continue;
        }
        let entry = per_day.entry(day).or_default();
        *entry = entry.saturating_add(meal.calories);
    }

    let total_calories = per_day.values().fold(0_i64, |sum, c| sum.saturating_add(*c));
    let days_tracked = per_day.len();
    let average_calories = if days_tracked == 0 {
        0
    } else {
        (total_calories as f64 / days_tracked as f64).round() as i64
    };

    let mut goal_adherence = GoalAdherence::default();
    let daily_breakdown: Vec<DailyBreakdown> = week_start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let actual = per_day.get(&day).copied().unwrap_or(0);
            let difference = actual.saturating_sub(target);
            let status = classify(actual, difference, target);
            match status {
                DayStatus::OnTarget => goal_adherence.days_on_target += 1,
                DayStatus::Over => goal_adherence.days_over += 1,
                DayStatus::Under => goal_adherence.days_under += 1,
                DayStatus::NotTracked => goal_adherence.days_not_tracked += 1,
            }
            DailyBreakdown {
                date: dates::format_date(day),
                target,
                actual,
                difference,
                status,
            }
        })
        .collect();

    WeeklyReport {
        week_start: dates::format_date(week_start),
        week_end: dates::format_date(end),
        target_calories: target,
        total_calories,
        average_calories,
        days_tracked,
        goal_adherence,
        daily_breakdown,
    }
}

fn classify(actual: i64, difference: i64, target: i64) -> DayStatus {
    if actual == 0 {
        DayStatus::NotTracked
    } else if difference.saturating_abs().saturating_mul(100)
        <= target.saturating_mul(REPORT_TOLERANCE_PERCENT)
    {
        DayStatus::OnTarget
    } else if difference > 0 {
        DayStatus::Over
    } else {
        DayStatus::Under
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: &str) -> NaiveDate {
        dates::parse_date("d", value).unwrap()
    }

    fn meal(id: i64, at: &str, calories: i64) -> Meal {
        Meal {
            id,
            user_id: 1,
            name: format!("Meal {id}"),
            calories,
            date: dates::parse_timestamp("date", at).unwrap(),
            notes: None,
            options: Vec::new(),
            created_at: dates::now(),
            updated_at: dates::now(),
        }
    }

    #[test]
    fn test_week_start_defaults_to_current_monday() {
        let thursday = day("2026-02-19");
        assert_eq!(resolve_week_start(None, thursday).unwrap(), day("2026-02-16"));
        assert_eq!(resolve_week_start(Some("  "), thursday).unwrap(), day("2026-02-16"));

        let monday = day("2026-02-16");
        assert_eq!(resolve_week_start(None, monday).unwrap(), monday);
        let sunday = day("2026-02-22");
        assert_eq!(resolve_week_start(None, sunday).unwrap(), monday);
    }

    #[test]
    fn test_week_start_validation() {
        let today = day("2026-02-19");
        assert_eq!(
            resolve_week_start(Some("2026-02-16"), today).unwrap(),
            day("2026-02-16")
        );

        let bad_format = resolve_week_start(Some("16/02/2026"), today).unwrap_err();
        assert_eq!(bad_format.http_status(), 400);
        assert_eq!(bad_format.message, "Invalid week_start format. Use YYYY-MM-DD.");

        let tuesday = resolve_week_start(Some("2026-02-17"), today).unwrap_err();
        assert_eq!(tuesday.http_status(), 400);
        assert_eq!(tuesday.message, "week_start must be a Monday (ISO 8601).");
    }

    #[test]
    fn test_daily_statuses() {
        let meals = vec![
            meal(1, "2026-02-16T08:00:00Z", 1000),
            meal(2, "2026-02-16T19:00:00Z", 950),
            meal(3, "2026-02-17T12:00:00Z", 2201),
            meal(4, "2026-02-18T12:00:00Z", 1799),
            meal(5, "2026-02-19T12:00:00Z", 2200),
            meal(6, "2026-02-22T23:59:59Z", 1800),
        ];

        let report = build_weekly_report(day("2026-02-16"), 2000, &meals);

        assert_eq!(report.week_start, "2026-02-16");
        assert_eq!(report.week_end, "2026-02-22");
        assert_eq!(report.daily_breakdown.len(), 7);

        let statuses: Vec<DayStatus> = report.daily_breakdown.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![
                DayStatus::OnTarget,
                DayStatus::Over,
                DayStatus::Under,
                DayStatus::OnTarget,
                DayStatus::NotTracked,
                DayStatus::NotTracked,
                DayStatus::OnTarget,
            ]
        );
        assert_eq!(
            report.goal_adherence,
            GoalAdherence {
                days_on_target: 3,
                days_over: 1,
                days_under: 1,
                days_not_tracked: 2,
            }
        );

        let monday = &report.daily_breakdown[0];
        assert_eq!((monday.actual, monday.difference), (1950, -50));

        assert_eq!(report.total_calories, 9950);
        assert_eq!(report.days_tracked, 5);
        assert_eq!(report.average_calories, 1990);
    }

    #[test]
    fn test_meals_outside_week_ignored() {
        let meals = vec![
            meal(1, "2026-02-15T23:59:59Z", 3000),
            meal(2, "2026-02-23T00:00:00Z", 3000),
            meal(3, "2026-02-20T12:00:00Z", 501),
        ];

        let report = build_weekly_report(day("2026-02-16"), 2000, &meals);
        assert_eq!(report.total_calories, 501);
        assert_eq!(report.days_tracked, 1);
        assert_eq!(report.goal_adherence.days_under, 1);
        assert_eq!(report.goal_adherence.days_not_tracked, 6);
    }

    #[test]
    fn test_empty_week() {
        let report = build_weekly_report(day("2026-02-16"), 1800, &[]);
        assert_eq!(report.total_calories, 0);
        assert_eq!(report.average_calories, 0);
        assert_eq!(report.days_tracked, 0);
        assert_eq!(report.goal_adherence.days_not_tracked, 7);
        assert!(report.daily_breakdown.iter().all(|d| d.difference == -1800));
    }

    #[test]
    fn test_average_rounds_half_up() {
        let meals = vec![
            meal(1, "2026-02-16T12:00:00Z", 1001),
            meal(2, "2026-02-17T12:00:00Z", 1002),
        ];
        let report = build_weekly_report(day("2026-02-16"), 1000, &meals);
        assert_eq!(report.average_calories, 1002);
    }
}
