// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors
// ABOUTME: Output formatting helpers for mealplan-smoke
// ABOUTME: Prints labelled status lines and pretty JSON bodies

use serde_json::Value;

/// Print the run header
pub fn print_banner(base_url: &str) {
    println!("Meal planner smoke test");
    println!("{}", "=".repeat(60));
    println!("Target: {base_url}");
}

/// Print the run footer
pub fn print_footer() {
    println!("{}", "=".repeat(60));
    println!("Smoke test finished");
}

/// Print one response: label, status and the body (pretty JSON when it parses)
pub fn print_response(label: &str, status: u16, body: &str) {
    println!("\n{label}: {status}");
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{body}"),
        },
        Err(_) if body.is_empty() => println!("(empty body)"),
        Err(_) => println!("{body}"),
    }
}

/// Print a transport failure for a step
pub fn print_transport_error(label: &str, error: &reqwest::Error) {
    println!("\n{label}: request failed: {error}");
}
