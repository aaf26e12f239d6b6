// ABOUTME: App construction and account helpers for HTTP integration tests
// ABOUTME: Builds the full router over an in-memory database and logs users in

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::axum_test::AxumTestRequest;
use axum::Router;
use mealplan_server::{config::ServerConfig, resources::ServerResources, server::MealPlanServer};
use serde_json::{json, Value};
use std::sync::Arc;

/// Default password used by test accounts
pub const TEST_PASSWORD: &str = "testpass123";

/// Full application router over a fresh in-memory database
pub async fn test_app() -> Router {
    test_app_with_resources().await.0
}

/// Full router plus the resources behind it
#[allow(dead_code)]
pub async fn test_app_with_resources() -> (Router, Arc<ServerResources>) {
    let resources = ServerResources::from_config(ServerConfig::for_testing())
        .await
        .expect("Failed to create test resources");
    let resources = Arc::new(resources);
    let router = MealPlanServer::new(resources.clone()).router();
    (router, resources)
}

/// Register `email` and return a login token
pub async fn register_and_login(app: &Router, email: &str) -> String {
    let response = AxumTestRequest::post("/api/register")
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "name": "Test User",
        }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201, "registration of {email} failed");

    login(app, email, TEST_PASSWORD)
        .await
        .expect("login after registration returned no token")
}

/// Log in and return the token, if any
pub async fn login(app: &Router, email: &str, password: &str) -> Option<String> {
    let response = AxumTestRequest::post("/api/login")
        .json(&json!({ "email": email, "password": password }))
        .send(app.clone())
        .await;
    if response.status() != 200 {
        return None;
    }
    let body: Value = response.json();
    body["token"].as_str().map(str::to_owned)
}

/// Create a meal option and return its JSON
#[allow(dead_code)]
pub async fn create_meal_option(app: &Router, token: &str, body: &Value) -> Value {
    let response = AxumTestRequest::post("/api/meal-options")
        .bearer(token)
        .json(body)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201, "meal option creation failed");
    response.json()
}

/// Create a meal and return its JSON
#[allow(dead_code)]
pub async fn create_meal(app: &Router, token: &str, body: &Value) -> Value {
    let response = AxumTestRequest::post("/api/meals")
        .bearer(token)
        .json(body)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201, "meal creation failed");
    response.json()
}
