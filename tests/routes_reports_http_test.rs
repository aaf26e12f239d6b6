// ABOUTME: HTTP integration tests for the weekly calorie report
// ABOUTME: Covers week_start validation, missing goals and per-day adherence counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use axum::Router;
use chrono::{Datelike, NaiveDate, Weekday};
use helpers::axum_test::AxumTestRequest;
use helpers::test_utils::{create_meal, register_and_login, test_app};
use serde_json::{json, Value};

async fn get_report(app: &Router, token: &str, query: &str) -> (u16, Value) {
    let response = AxumTestRequest::get(&format!("/api/reports/weekly{query}"))
        .bearer(token)
        .send(app.clone())
        .await;
    let status = response.status();
    (status, response.json())
}

async fn create_goal(app: &Router, token: &str, body: &Value) {
    let response = AxumTestRequest::post("/api/caloric-goals")
        .bearer(token)
        .json(body)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_report_requires_auth() {
    let app = test_app().await;
    let response = AxumTestRequest::get("/api/reports/weekly?week_start=2026-02-16")
        .send(app)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_report_rejects_bad_week_start() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    create_goal(&app, &token, &json!({ "daily_calories": 2000, "start_date": "2026-01-01" })).await;

    let (status, body) = get_report(&app, &token, "?week_start=2026-02-30").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Invalid week_start format. Use YYYY-MM-DD.");

    let (status, body) = get_report(&app, &token, "?week_start=2026-02-18").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "week_start must be a Monday (ISO 8601).");
}

#[tokio::test]
async fn test_report_without_goal_not_found() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    create_goal(
        &app,
        &token,
        &json!({ "daily_calories": 2000, "start_date": "2026-01-01", "end_date": "2026-01-31" }),
    )
    .await;

    let (status, body) = get_report(&app, &token, "?week_start=2026-02-16").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("No caloric goal found for this week"));
}

#[tokio::test]
async fn test_report_counts_days_by_status() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    create_goal(&app, &token, &json!({ "daily_calories": 2000, "start_date": "2026-02-01" })).await;

    for (name, calories, date) in [
        ("Breakfast", 900, "2026-02-16T08:00:00Z"),
        ("Dinner", 1100, "2026-02-16T19:00:00Z"),
        ("Feast", 2600, "2026-02-17T19:00:00Z"),
        ("Snack", 400, "2026-02-18T15:00:00Z"),
        ("Late dinner", 1900, "2026-02-22T23:30:00Z"),
        ("Next week", 5000, "2026-02-23T08:00:00Z"),
    ] {
        create_meal(&app, &token, &json!({ "name": name, "calories": calories, "date": date }))
            .await;
    }

    let (status, report) = get_report(&app, &token, "?week_start=2026-02-16").await;
    assert_eq!(status, 200);
    assert_eq!(report["week_start"], "2026-02-16");
    assert_eq!(report["week_end"], "2026-02-22");
    assert_eq!(report["target_calories"], 2000);
    assert_eq!(report["total_calories"], 6900);
    assert_eq!(report["days_tracked"], 4);
    assert_eq!(report["average_calories"], 1725);
    assert_eq!(
        report["goal_adherence"],
        json!({ "days_on_target": 2, "days_over": 1, "days_under": 1, "days_not_tracked": 3 })
    );

    let days = report["daily_breakdown"].as_array().unwrap();
    let statuses: Vec<&str> = days.iter().map(|d| d["status"].as_str().unwrap()).collect();
    assert_eq!(
        statuses,
        ["on_target", "over", "under", "not_tracked", "not_tracked", "not_tracked", "on_target"]
    );
    assert_eq!(days[1]["actual"], 2600);
    assert_eq!(days[1]["difference"], 600);
    assert_eq!(days[3]["date"], "2026-02-19");
    assert_eq!(days[3]["actual"], 0);
}

#[tokio::test]
async fn test_report_ignores_other_users() {
    let app = test_app().await;
    let owner = register_and_login(&app, "owner@example.com").await;
    let other = register_and_login(&app, "other@example.com").await;
    create_goal(&app, &owner, &json!({ "daily_calories": 1800, "start_date": "2026-02-01" })).await;
    create_meal(
        &app,
        &other,
        &json!({ "name": "Theirs", "calories": 900, "date": "2026-02-17T12:00:00Z" }),
    )
    .await;

    let (status, report) = get_report(&app, &owner, "?week_start=2026-02-16").await;
    assert_eq!(status, 200);
    assert_eq!(report["total_calories"], 0);
    assert_eq!(report["goal_adherence"]["days_not_tracked"], 7);

    let (status, _) = get_report(&app, &other, "?week_start=2026-02-16").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_report_defaults_to_current_week() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    create_goal(&app, &token, &json!({ "daily_calories": 2000, "start_date": "2000-01-03" })).await;

    let (status, report) = get_report(&app, &token, "").await;
    assert_eq!(status, 200);

    let monday = NaiveDate::parse_from_str(report["week_start"].as_str().unwrap(), "%Y-%m-%d")
        .unwrap();
    assert_eq!(monday.weekday(), Weekday::Mon);
    assert_eq!(report["daily_breakdown"].as_array().unwrap().len(), 7);
}
