// ABOUTME: HTTP integration tests for daily meal plan generation
// ABOUTME: Covers target resolution from goals, skipped meal times and saving plans as meals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use axum::Router;
use helpers::axum_test::AxumTestRequest;
use helpers::test_utils::{create_meal_option, register_and_login, test_app};
use serde_json::{json, Value};

async fn seed_catalogue(app: &Router, token: &str) {
    for (name, meal_time, calories) in [
        ("Porridge", "breakfast", 400.0),
        ("Eggs", "breakfast", 300.0),
        ("Tofu Bowl", "lunch", 600.0),
        ("Pasta", "dinner", 800.0),
        ("Salad", "dinner", 500.0),
    ] {
        create_meal_option(
            app,
            token,
            &json!({ "name": name, "meal_time": meal_time, "estimated_calories": calories }),
        )
        .await;
    }
    // No estimate, never planned
    create_meal_option(app, token, &json!({ "name": "Mystery", "meal_time": "snack" })).await;
}

async fn generate(app: &Router, token: &str, query: &str, body: &Value) -> (u16, Value) {
    let response = AxumTestRequest::post(&format!("/api/meals/generate{query}"))
        .bearer(token)
        .json(body)
        .send(app.clone())
        .await;
    let status = response.status();
    (status, response.json())
}

#[tokio::test]
async fn test_generate_plan_hits_target() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    seed_catalogue(&app, &token).await;

    let (status, plan) = generate(
        &app,
        &token,
        "",
        &json!({ "date": "2026-02-15", "target_calories": 1800 }),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(plan["date"], "2026-02-15");
    assert_eq!(plan["target_calories"], 1800);
    assert_eq!(plan["total_calories"], 1800.0);
    assert_eq!(plan["difference"], 0.0);
    let chosen: Vec<(&str, &str)> = plan["meals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["meal_time"].as_str().unwrap(),
                m["meal_option_name"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        chosen,
        [("breakfast", "Porridge"), ("lunch", "Tofu Bowl"), ("dinner", "Pasta")]
    );
    assert_eq!(plan["notes"], "Skipped meal times: snack");
    assert!(plan.get("saved_meal").is_none());
}

#[tokio::test]
async fn test_generate_plan_skips_meal_times_to_fit() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    seed_catalogue(&app, &token).await;

    let (status, plan) = generate(
        &app,
        &token,
        "",
        &json!({ "date": "2026-02-15", "target_calories": 1000 }),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(plan["total_calories"], 1000.0);
    let names: Vec<&str> = plan["meals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["meal_option_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Porridge", "Tofu Bowl"]);
    assert_eq!(plan["notes"], "Skipped meal times: snack, dinner");
}

#[tokio::test]
async fn test_generate_plan_uses_active_goal() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    seed_catalogue(&app, &token).await;

    let (status, body) = generate(&app, &token, "", &json!({ "date": "2026-02-15" })).await;
    assert_eq!(status, 404);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no active caloric goal"));

    let response = AxumTestRequest::post("/api/caloric-goals")
        .bearer(&token)
        .json(&json!({ "daily_calories": 1800, "start_date": "2026-02-01" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);

    let (status, plan) = generate(&app, &token, "", &json!({ "date": "2026-02-15" })).await;
    assert_eq!(status, 201);
    assert_eq!(plan["target_calories"], 1800);
}

#[tokio::test]
async fn test_generate_plan_validation() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;

    // Empty catalogue
    let (status, _) = generate(
        &app,
        &token,
        "",
        &json!({ "date": "2026-02-15", "target_calories": 2000 }),
    )
    .await;
    assert_eq!(status, 404);

    seed_catalogue(&app, &token).await;

    let (status, _) = generate(&app, &token, "", &json!({ "target_calories": 2000 })).await;
    assert_eq!(status, 400);

    let (status, _) = generate(
        &app,
        &token,
        "",
        &json!({ "date": "2026-02-15", "target_calories": 100 }),
    )
    .await;
    assert_eq!(status, 400);

    let response = AxumTestRequest::post("/api/meals/generate")
        .json(&json!({ "date": "2026-02-15", "target_calories": 2000 }))
        .send(app)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_generate_plan_save_creates_meal() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;
    seed_catalogue(&app, &token).await;

    let (status, plan) = generate(
        &app,
        &token,
        "?save=true",
        &json!({ "date": "2026-02-15", "target_calories": 1800 }),
    )
    .await;
    assert_eq!(status, 201);

    let saved = &plan["saved_meal"];
    assert_eq!(saved["name"], "Generated plan for 2026-02-15");
    assert_eq!(saved["date"], "2026-02-15T00:00:00Z");
    let id = saved["id"].as_i64().unwrap();

    let meal: Value = AxumTestRequest::get(&format!("/api/meals/{id}"))
        .bearer(&token)
        .send(app)
        .await
        .json();
    assert_eq!(meal["calories"], 1800);
    assert_eq!(meal["notes"], "Skipped meal times: snack");
    let groups: Vec<&str> = meal["meal_times"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(groups, ["breakfast", "lunch", "dinner"]);
}
