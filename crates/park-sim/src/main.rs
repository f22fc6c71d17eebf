// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-sim authors

use clap::Parser;
use tracing::error;

use park_sim::config::ScenarioConfig;

#[tokio::main]
async fn main() {
    let config = ScenarioConfig::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match park_sim::run(config).await {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}
