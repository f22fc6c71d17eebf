// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-sim authors

use std::time::Duration;

use park_agents::{AgentTiming, SharedRng};

/// Configuration for the `park-sim` scenario runner, mirroring the
/// `#[arg(long, env = "...")]` style used by the workspace's other binary
/// configuration structs.
#[derive(Debug, Clone, clap::Parser)]
pub struct ScenarioConfig {
    /// Name of the built-in demo scenario to run.
    #[arg(long, default_value = "happy-path", env = "PARK_SIM_SCENARIO")]
    pub scenario: String,

    /// Auction deadline in milliseconds.
    #[arg(long, default_value_t = 2000, env = "PARK_SIM_AUCTION_DEADLINE_MS")]
    pub auction_deadline_ms: u64,

    /// Bid escalation pacing delay in milliseconds.
    #[arg(long, default_value_t = 500, env = "PARK_SIM_BID_PACE_MS")]
    pub bid_pace_ms: u64,

    /// Driver receive timeout in milliseconds.
    #[arg(long, default_value_t = 15000, env = "PARK_SIM_DRIVER_TIMEOUT_MS")]
    pub driver_timeout_ms: u64,

    /// Lower bound (inclusive) of the initial-bid sampling range.
    #[arg(long, default_value_t = 10, env = "PARK_SIM_INITIAL_BID_MIN")]
    pub initial_bid_min: u32,

    /// Upper bound (exclusive) of the initial-bid sampling range.
    #[arg(long, default_value_t = 25, env = "PARK_SIM_INITIAL_BID_MAX")]
    pub initial_bid_max: u32,

    /// Lower bound (inclusive) of the private-valuation sampling range.
    #[arg(long, default_value_t = 30, env = "PARK_SIM_VALUATION_MIN")]
    pub valuation_min: u32,

    /// Upper bound (exclusive) of the private-valuation sampling range.
    #[arg(long, default_value_t = 45, env = "PARK_SIM_VALUATION_MAX")]
    pub valuation_max: u32,

    /// Lower bound (inclusive) of the per-round bid step sampling range.
    #[arg(long, default_value_t = 1, env = "PARK_SIM_BID_STEP_MIN")]
    pub bid_step_min: u32,

    /// Upper bound (exclusive) of the per-round bid step sampling range.
    #[arg(long, default_value_t = 5, env = "PARK_SIM_BID_STEP_MAX")]
    pub bid_step_max: u32,

    /// Emit logs as newline-delimited JSON instead of human-readable text.
    #[arg(long, env = "PARK_SIM_JSON_LOGS")]
    pub json_logs: bool,

    /// Seed for the agents' shared RNG. Unset draws a fresh seed from
    /// entropy, so the run is not reproducible.
    #[arg(long, env = "PARK_SIM_RNG_SEED")]
    pub rng_seed: Option<u64>,
}

impl ScenarioConfig {
    pub fn timing(&self) -> AgentTiming {
        AgentTiming {
            auction_deadline: Duration::from_millis(self.auction_deadline_ms),
            bid_pace: Duration::from_millis(self.bid_pace_ms),
            driver_timeout: Duration::from_millis(self.driver_timeout_ms),
            initial_bid_range: self.initial_bid_min..self.initial_bid_max,
            valuation_range: self.valuation_min..self.valuation_max,
            bid_step_range: self.bid_step_min..self.bid_step_max,
        }
    }

    pub fn rng(&self) -> SharedRng {
        match self.rng_seed {
            Some(seed) => SharedRng::from_seed(seed),
            None => SharedRng::from_entropy(),
        }
    }
}
