// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! Agent state machines for the parking allocation network: spots, zone
//! managers, the parking manager, and drivers.

pub mod config;
pub mod driver;
pub mod error;
pub mod parking_manager;
pub mod rng;
pub mod spot;
pub mod telemetry;
pub mod zone;

pub use config::AgentTiming;
pub use error::AgentError;
pub use rng::SharedRng;
pub use telemetry::{NoopTelemetry, ParkedEvent, TelemetrySink, TracingTelemetry};
