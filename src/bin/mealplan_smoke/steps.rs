// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors
// ABOUTME: Individual smoke test calls against the meal planner API
// ABOUTME: Threads the bearer token from login through every protected call

use crate::display::{print_response, print_transport_error};
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Week covered by the shopping list step, containing the created meal
const MEAL_DATE: &str = "2026-02-15T08:00:00Z";
const WEEK_START: &str = "2026-02-15";
const WEEK_END: &str = "2026-02-21";

/// HTTP client for one smoke run
pub struct SmokeClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl SmokeClient {
    /// Build a client for the given API base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request, print the outcome and return the JSON body if any
    async fn send(&self, label: &str, request: RequestBuilder) -> Option<Value> {
        let response = match self.authorized(request).send().await {
            Ok(response) => response,
            Err(e) => {
                print_transport_error(label, &e);
                return None;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                print_transport_error(label, &e);
                return None;
            }
        };
        print_response(label, status, &body);
        serde_json::from_str(&body).ok()
    }

    /// POST /register
    pub async fn register(&self, email: &str, password: &str, name: &str) {
        let request = self.http.post(self.url("/register")).json(&json!({
            "email": email,
            "password": password,
            "name": name,
        }));
        self.send("Register", request).await;
    }

    /// POST /login; returns true when a token was obtained
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let request = self.http.post(self.url("/login")).json(&json!({
            "email": email,
            "password": password,
        }));
        self.token = self.send("Login", request).await.and_then(|body| {
            ["token", "id_token"]
                .iter()
                .find_map(|key| body.get(key).and_then(Value::as_str).map(str::to_owned))
        });
        self.token.is_some()
    }

    /// GET /user
    pub async fn profile(&self) {
        self.send("Profile", self.http.get(self.url("/user"))).await;
    }

    /// POST /meal-options
    pub async fn create_meal_option(&self) -> Option<i64> {
        let request = self.http.post(self.url("/meal-options")).json(&json!({
            "name": "Vegan Lunch",
            "description": "Salad and tofu",
            "meal_time": "lunch",
            "estimated_calories": 520.0,
            "ingredients": [
                { "name": "Tofu", "quantity": 200.0, "unit": "g" }
            ],
        }));
        created_id(self.send("Create Meal Option", request).await)
    }

    /// GET /meal-options
    pub async fn list_meal_options(&self) {
        self.send("List Meal Options", self.http.get(self.url("/meal-options")))
            .await;
    }

    /// PUT /meal-options/{id}
    pub async fn update_meal_option(&self, id: i64) {
        let request = self
            .http
            .put(self.url(&format!("/meal-options/{id}")))
            .json(&json!({ "description": "Salad, tofu, and rice" }));
        self.send("Update Meal Option", request).await;
    }

    /// DELETE /meal-options/{id}
    pub async fn delete_meal_option(&self, id: i64) {
        let request = self.http.delete(self.url(&format!("/meal-options/{id}")));
        self.send("Delete Meal Option", request).await;
    }

    /// POST /meals
    pub async fn create_meal(&self) -> Option<i64> {
        let request = self.http.post(self.url("/meals")).json(&json!({
            "name": "Breakfast",
            "calories": 350,
            "date": MEAL_DATE,
            "notes": "Oatmeal and fruit",
        }));
        created_id(self.send("Create Meal", request).await)
    }

    /// GET /meals
    pub async fn list_meals(&self) {
        self.send("List Meals", self.http.get(self.url("/meals"))).await;
    }

    /// GET /meals/{id}
    pub async fn get_meal(&self, id: i64) {
        let request = self.http.get(self.url(&format!("/meals/{id}")));
        self.send("Get Meal", request).await;
    }

    /// PUT /meals/{id}
    pub async fn update_meal(&self, id: i64) {
        let request = self
            .http
            .put(self.url(&format!("/meals/{id}")))
            .json(&json!({ "calories": 400 }));
        self.send("Update Meal", request).await;
    }

    /// DELETE /meals/{id}
    pub async fn delete_meal(&self, id: i64) {
        let request = self.http.delete(self.url(&format!("/meals/{id}")));
        self.send("Delete Meal", request).await;
    }

    /// GET /shopping-list for the week the meal was logged in
    pub async fn shopping_list(&self) {
        let request = self
            .http
            .get(self.url("/shopping-list"))
            .query(&[("start", WEEK_START), ("end", WEEK_END)]);
        self.send("Shopping List", request).await;
    }
}

fn created_id(body: Option<Value>) -> Option<i64> {
    body.and_then(|body| body.get("id").and_then(Value::as_i64))
}
