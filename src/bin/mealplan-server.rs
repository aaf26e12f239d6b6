// ABOUTME: Meal planner API server binary
// ABOUTME: Loads configuration, opens the database and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Meal Planner Server Binary
//!
//! Reads settings from the environment, applies command line overrides and
//! serves the JSON API until Ctrl+C.

use anyhow::Result;
use clap::Parser;
use mealplan_server::{
    config::{DatabaseUrl, ServerConfig},
    logging,
    resources::ServerResources,
    server::MealPlanServer,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mealplan-server")]
#[command(about = "Meal planner API - meals, meal options, caloric goals and shopping lists")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database location (`sqlite:<path>`, `sqlite::memory:` or a file path)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(raw) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(raw)?;
    }

    info!("Starting meal planner server");
    info!("{}", config.summary());

    let resources = ServerResources::from_config(config).await?;
    info!("Database ready: {}", resources.config.database.url);

    let server = MealPlanServer::new(Arc::new(resources));
    if let Err(e) = server.run().await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
