// ABOUTME: Application constants organized by domain for the meal planner API
// ABOUTME: Validation limits, default ports, service identifiers and response messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Constants grouped by domain rather than collected in one flat list.

/// Service identifiers
pub mod service_names {
    /// Name used in logs and the status endpoint
    pub const MEALPLAN_SERVER: &str = "mealplan-server";
    /// JWT audience claim
    pub const JWT_AUDIENCE: &str = "mealplan-api";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8080;
}

/// API routes
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH: &str = "/health";
    /// Readiness endpoint
    pub const READY: &str = "/ready";
}

/// Authentication and token limits
pub mod auth {
    /// Default token lifetime
    pub const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;
    /// Minimum password length accepted at registration
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Role granted to every registered user
    pub const ROLE_USER: &str = "ROLE_USER";
}

/// Validation limits for request payloads
pub mod limits {
    /// Maximum meal and meal option name length in characters
    pub const MAX_NAME_LENGTH: usize = 100;
    /// Lowest accepted daily caloric goal
    pub const MIN_DAILY_CALORIES: i64 = 500;
    /// Highest accepted daily caloric goal
    pub const MAX_DAILY_CALORIES: i64 = 10_000;
    /// Highest accepted calories for a single meal or meal option estimate
    pub const MAX_MEAL_CALORIES: i64 = 10_000;
    /// Longest date range accepted by the shopping list
    pub const MAX_SHOPPING_RANGE_DAYS: i64 = 366;
    /// Generated plans may exceed the target by at most this percentage
    pub const PLAN_TOLERANCE_PERCENT: i64 = 10;
    /// Weekly report days within this percentage of the target count as on target
    pub const REPORT_TOLERANCE_PERCENT: i64 = 10;
    /// Default SQLite pool size
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
}

/// Response messages shared by handlers and tests
pub mod messages {
    /// Registration succeeded
    pub const USER_REGISTERED: &str = "User registered successfully";
    /// Meal deleted
    pub const MEAL_DELETED: &str = "Meal deleted";
    /// Meal option deleted
    pub const MEAL_OPTION_DELETED: &str = "MealOption deleted";
    /// Caloric goal deleted
    pub const CALORIC_GOAL_DELETED: &str = "Caloric goal deleted";
    /// Shopping list request without range
    pub const MISSING_DATE_RANGE: &str = "Missing start or end date";
    /// Shopping list range without meals
    pub const NO_MEALS_IN_RANGE: &str = "No meals found for this range";
    /// Login failed, same text for unknown email and wrong password
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    /// Weekly report requested for a week without a caloric goal
    pub const NO_GOAL_FOR_WEEK: &str = "No caloric goal found for this week. \
        Create a caloric goal that covers the requested period.";
    /// Status endpoint greeting
    pub const API_RUNNING: &str = "Meal planner API is running";
}

/// Meal times seeded into every database, in display order
pub mod meal_times {
    /// `(name, label)` pairs
    pub const SEEDED: [(&str, &str); 4] = [
        ("breakfast", "Breakfast"),
        ("lunch", "Lunch"),
        ("snack", "Snack"),
        ("dinner", "Dinner"),
    ];
}
