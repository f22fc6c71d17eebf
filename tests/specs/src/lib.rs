// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-specs authors

//! Shared helpers for end-to-end scenario tests that exercise the real
//! `Bus`/task wiring rather than mocking any agent.

use std::time::Duration;

use park_agents::{AgentTiming, SharedRng};

/// Timing tuned for tests: short enough that deadline-driven auction
/// termination doesn't make the suite slow, wide enough that bid
/// escalation sequences still have room to play out.
pub fn fast_timing() -> AgentTiming {
    AgentTiming {
        auction_deadline: Duration::from_millis(150),
        bid_pace: Duration::from_millis(5),
        driver_timeout: Duration::from_millis(2000),
        ..AgentTiming::default()
    }
}

/// A fixed seed so a failing scenario test reproduces on rerun.
pub fn fast_rng() -> SharedRng {
    SharedRng::from_seed(1729)
}
