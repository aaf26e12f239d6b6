// ABOUTME: Smoke test driver walking the meal planner API end to end
// ABOUTME: Registers, logs in and exercises every resource, printing each response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors
//!
//! Usage:
//! ```bash
//! # Against a local server on the default port
//! mealplan-smoke
//!
//! # Against another host with a different account
//! mealplan-smoke --base-url http://staging:8080/api --email me@example.com --password hunter22
//! ```
//!
//! Responses are printed for manual review. Nothing is asserted and the exit
//! code is 0 regardless of the statuses returned.

mod display;
mod steps;

use anyhow::Result;
use clap::Parser;
use steps::SmokeClient;

#[derive(Parser)]
#[command(
    name = "mealplan-smoke",
    about = "Meal planner API smoke test",
    long_about = "Runs a fixed sequence of calls against a running meal planner API and prints every response."
)]
struct Cli {
    /// API base URL including the `/api` prefix
    #[arg(long, env = "MEALPLAN_BASE_URL", default_value = "http://localhost:8080/api")]
    base_url: String,

    /// Account email to register and log in with
    #[arg(long, env = "MEALPLAN_EMAIL", default_value = "testuser@example.com")]
    email: String,

    /// Account password
    #[arg(long, env = "MEALPLAN_PASSWORD", default_value = "testpass123")]
    password: String,

    /// Account display name
    #[arg(long, env = "MEALPLAN_NAME", default_value = "Test User")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut client = SmokeClient::new(&cli.base_url)?;
    display::print_banner(&cli.base_url);

    client.register(&cli.email, &cli.password, &cli.name).await;
    if !client.login(&cli.email, &cli.password).await {
        println!("Login failed, cannot test protected endpoints.");
        return Ok(());
    }

    client.profile().await;

    let meal_id = client.create_meal().await;
    client.list_meals().await;
    if let Some(id) = meal_id {
        client.get_meal(id).await;
        client.update_meal(id).await;
        client.delete_meal(id).await;
    }

    let option_id = client.create_meal_option().await;
    client.list_meal_options().await;
    if let Some(id) = option_id {
        client.update_meal_option(id).await;
        client.delete_meal_option(id).await;
    }

    client.shopping_list().await;

    display::print_footer();
    Ok(())
}
