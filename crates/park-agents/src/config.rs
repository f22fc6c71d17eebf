// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! Timing knobs shared by every agent.
//!
//! Plain `Duration`/range fields rather than a `clap::Args` struct directly —
//! the binary-facing config lives in `park-sim::config::ScenarioConfig` and
//! builds one of these; keeping the agent crate free of a CLI dependency
//! keeps it embeddable in contexts other than the scenario runner.

use std::ops::Range;
use std::time::Duration;

/// Timing and randomisation parameters governing auctions and bidding.
#[derive(Debug, Clone)]
pub struct AgentTiming {
    /// How long a Zone Manager waits from auction start before force-ending
    /// it, regardless of further bid/poor traffic.
    pub auction_deadline: Duration,
    /// Cooperative pacing delay a Spot sleeps before escalating a bid.
    pub bid_pace: Duration,
    /// How long a Driver waits for a reply before treating the request as
    /// failed.
    pub driver_timeout: Duration,
    /// Range an opening bid is drawn from, uniformly, at auction start.
    pub initial_bid_range: Range<u32>,
    /// Range a Spot's private valuation is drawn from, uniformly.
    pub valuation_range: Range<u32>,
    /// Range the per-round bid increment is drawn from, uniformly.
    pub bid_step_range: Range<u32>,
}

impl Default for AgentTiming {
    fn default() -> Self {
        AgentTiming {
            auction_deadline: Duration::from_secs(2),
            bid_pace: Duration::from_millis(500),
            driver_timeout: Duration::from_secs(15),
            initial_bid_range: 10..25,
            valuation_range: 30..45,
            bid_step_range: 1..5,
        }
    }
}
