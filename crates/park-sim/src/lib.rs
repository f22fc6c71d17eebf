// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-sim authors

//! Scenario runner for the parking allocation network: a `ScenarioBuilder`
//! library API plus a handful of built-in demo scenarios, standing in for
//! the out-of-scope HTTP control surface.

pub mod config;
pub mod scenario;

use anyhow::bail;
use tracing::info;

use crate::config::ScenarioConfig;

/// Run the named built-in scenario and return a human-readable summary.
pub async fn run(config: ScenarioConfig) -> anyhow::Result<String> {
    let timing = config.timing();
    let rng = config.rng();

    let summary = match config.scenario.as_str() {
        "happy-path" => format!("{:?}", scenario::happy_path(timing, rng).await?),
        "no-availability" => format!("{:?}", scenario::no_availability(timing, rng).await?),
        "fuzzy-environment" => format!("{:?}", scenario::fuzzy_environment_match(timing, rng).await?),
        "auction-all-poor" => format!("{:?}", scenario::auction_all_poor(timing, rng).await?),
        "two-bidder-escalation" => format!("{:?}", scenario::two_bidder_escalation(timing, rng).await?),
        "concurrent-auctions" => {
            let (a, b) = scenario::concurrent_auctions(timing, rng).await?;
            format!("driver-1: {a:?}\ndriver-2: {b:?}")
        }
        other => bail!("unknown scenario {other:?}"),
    };

    info!(scenario = config.scenario.as_str(), "scenario complete");
    Ok(summary)
}
