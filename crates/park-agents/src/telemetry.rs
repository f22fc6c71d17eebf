// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! Trait boundary standing in for the out-of-scope MQTT publish side-channel
//! (display boards, pricing telemetry).
//!
//! Both methods are infallible by signature: a telemetry publish is always
//! best-effort and must never interrupt the auction/matching protocol. A
//! future networked sink that can fail has to catch and log internally —
//! the trait gives it nowhere else to put the error.

use async_trait::async_trait;
use tracing::{debug, info};

/// A vacancy/occupancy transition worth publishing to a display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParkedEvent {
    pub parked: bool,
    pub price: Option<f64>,
}

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish_parked(&self, zone_display_id: &str, event: ParkedEvent);
    async fn publish_display(&self, zone_display_id: &str, vacant_count: u32);
}

/// Default sink: drops everything. Used by tests and any scenario that
/// doesn't care to observe telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

#[async_trait]
impl TelemetrySink for NoopTelemetry {
    async fn publish_parked(&self, _zone_display_id: &str, _event: ParkedEvent) {}
    async fn publish_display(&self, _zone_display_id: &str, _vacant_count: u32) {}
}

/// Logs telemetry at `info!`/`debug!` rather than publishing anywhere —
/// stands in for the real MQTT publisher the spec places out of scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

#[async_trait]
impl TelemetrySink for TracingTelemetry {
    async fn publish_parked(&self, zone_display_id: &str, event: ParkedEvent) {
        if event.parked {
            info!(zone = zone_display_id, "spot occupied");
        } else {
            info!(zone = zone_display_id, price = ?event.price, "spot vacated");
        }
    }

    async fn publish_display(&self, zone_display_id: &str, vacant_count: u32) {
        debug!(zone = zone_display_id, vacant_count, "display updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_sink_accepts_any_event_without_panicking() {
        let sink = NoopTelemetry;
        sink.publish_parked("zone-1", ParkedEvent { parked: true, price: None }).await;
        sink.publish_display("zone-1", 3).await;
    }

    #[tokio::test]
    async fn tracing_sink_accepts_any_event_without_panicking() {
        let sink = TracingTelemetry;
        sink.publish_parked("zone-1", ParkedEvent { parked: false, price: Some(3.75) }).await;
        sink.publish_display("zone-1", 0).await;
    }
}
