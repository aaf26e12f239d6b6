// ABOUTME: HTTP integration tests for registration, login and the profile endpoint
// ABOUTME: Covers validation failures, duplicate accounts and bearer token handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::axum_test::AxumTestRequest;
use helpers::test_utils::{login, register_and_login, test_app, test_app_with_resources, TEST_PASSWORD};
use serde_json::{json, Value};

// ============================================================================
// POST /api/register
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let app = test_app().await;

    let response = AxumTestRequest::post("/api/register")
        .json(&json!({
            "email": "cook@example.com",
            "password": TEST_PASSWORD,
            "name": "Cook",
        }))
        .send(app)
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["message"], "User registered successfully");
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = test_app().await;

    let response = AxumTestRequest::post("/api/register")
        .json(&json!({ "email": "cook@example.com" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");

    let response = AxumTestRequest::post("/api/register")
        .json(&json!({ "password": TEST_PASSWORD }))
        .send(app)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_register_invalid_email_and_short_password() {
    let app = test_app().await;

    let response = AxumTestRequest::post("/api/register")
        .json(&json!({ "email": "not-an-email", "password": TEST_PASSWORD }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_FORMAT");

    let response = AxumTestRequest::post("/api/register")
        .json(&json!({ "email": "cook@example.com", "password": "short" }))
        .send(app)
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = test_app().await;
    register_and_login(&app, "cook@example.com").await;

    let response = AxumTestRequest::post("/api/register")
        .json(&json!({ "email": "COOK@example.com", "password": TEST_PASSWORD }))
        .send(app)
        .await;
    assert_eq!(response.status(), 409);
}

// ============================================================================
// POST /api/login
// ============================================================================

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let app = test_app().await;
    register_and_login(&app, "cook@example.com").await;

    let response = AxumTestRequest::post("/api/login")
        .json(&json!({ "email": "cook@example.com", "password": TEST_PASSWORD }))
        .send(app)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(body["expires_at"].as_str().unwrap()).is_ok());
    assert_eq!(body["user"]["email"], "cook@example.com");
    assert_eq!(body["user"]["name"], "Test User");
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email() {
    let app = test_app().await;
    register_and_login(&app, "cook@example.com").await;

    let response = AxumTestRequest::post("/api/login")
        .json(&json!({ "email": "cook@example.com", "password": "wrongpass123" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 401);
    let wrong_password: Value = response.json();

    let response = AxumTestRequest::post("/api/login")
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .send(app)
        .await;
    assert_eq!(response.status(), 401);
    let unknown_email: Value = response.json();

    assert_eq!(wrong_password["error"]["message"], unknown_email["error"]["message"]);
}

#[tokio::test]
async fn test_login_inactive_account_forbidden() {
    let (app, resources) = test_app_with_resources().await;
    register_and_login(&app, "cook@example.com").await;

    let user = resources
        .database
        .users()
        .get_by_email("cook@example.com")
        .await
        .unwrap()
        .unwrap();
    resources.database.users().set_active(user.id, false).await.unwrap();

    let response = AxumTestRequest::post("/api/login")
        .json(&json!({ "email": "cook@example.com", "password": TEST_PASSWORD }))
        .send(app)
        .await;
    assert_eq!(response.status(), 403);
}

// ============================================================================
// GET /api/user
// ============================================================================

#[tokio::test]
async fn test_profile_with_token() {
    let app = test_app().await;
    let token = register_and_login(&app, "cook@example.com").await;

    let response = AxumTestRequest::get("/api/user").bearer(&token).send(app).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["email"], "cook@example.com");
    assert_eq!(body["isActive"], true);
    assert_eq!(body["roles"], json!(["ROLE_USER"]));
    assert!(body.get("password_hash").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_profile_rejects_missing_and_bad_tokens() {
    let app = test_app().await;

    let response = AxumTestRequest::get("/api/user").send(app.clone()).await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let response = AxumTestRequest::get("/api/user")
        .bearer("not.a.jwt")
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 401);

    let response = AxumTestRequest::get("/api/user")
        .header("authorization", "Basic Y29vazpwYXNz")
        .send(app)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_token_for_unknown_user_rejected() {
    let app = test_app().await;
    let other_app = test_app().await;
    register_and_login(&other_app, "cook@example.com").await;
    let foreign_token = login(&other_app, "cook@example.com", TEST_PASSWORD).await.unwrap();

    // Same secret but a different database: the user id in the token does not exist here
    let response = AxumTestRequest::get("/api/user")
        .bearer(&foreign_token)
        .send(app)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_deactivated_user_token_rejected() {
    let (app, resources) = test_app_with_resources().await;
    let token = register_and_login(&app, "cook@example.com").await;

    let user = resources
        .database
        .users()
        .get_by_email("cook@example.com")
        .await
        .unwrap()
        .unwrap();
    resources.database.users().set_active(user.id, false).await.unwrap();

    let response = AxumTestRequest::get("/api/user").bearer(&token).send(app).await;
    assert_eq!(response.status(), 401);
}
