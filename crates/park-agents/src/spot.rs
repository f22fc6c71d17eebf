// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! A single parking bay: reports vacancy and bids for itself in zone
//! auctions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use park_core::{Bus, EndpointId, GeoPoint, Message, SpotStatus};

use crate::config::AgentTiming;
use crate::error::AgentError;
use crate::rng::SharedRng;

/// Sonar readings below this many centimetres mean something is parked in
/// the bay.
pub const OCCUPIED_THRESHOLD_CM: u32 = 30;

/// Handle used by the scenario control surface to inject sonar readings
/// into a running Spot task — a stand-in for the out-of-scope ultrasonic
/// sensor simulation.
#[derive(Clone)]
pub struct SpotHandle {
    pub id: EndpointId,
    sonar_tx: mpsc::Sender<u32>,
}

impl SpotHandle {
    /// Report a sonar reading in centimetres.
    pub async fn report_sonar(&self, cm: u32) {
        if self.sonar_tx.send(cm).await.is_err() {
            error!(spot = %self.id, "sonar channel closed, spot task has exited");
        }
    }
}

struct SpotState {
    id: EndpointId,
    zone: EndpointId,
    point: GeoPoint,
    cash: u32,
    vacant: bool,
    arrived_at: Option<Instant>,
    private_valuation: Option<u32>,
    declared_poor: bool,
}

/// Spawn a Spot task and return its control handle. Fails if `id` is
/// already registered on `bus`.
pub async fn spawn(
    id: EndpointId,
    zone: EndpointId,
    point: GeoPoint,
    cash: u32,
    bus: Bus,
    timing: Arc<AgentTiming>,
    rng: SharedRng,
    shutdown: CancellationToken,
) -> Result<SpotHandle, AgentError> {
    if bus.is_registered(&id).await {
        return Err(AgentError::DuplicateEndpoint);
    }

    let (sonar_tx, sonar_rx) = mpsc::channel(16);
    let handle = SpotHandle { id: id.clone(), sonar_tx };

    tokio::spawn(run(id, zone, point, cash, bus, timing, rng, sonar_rx, shutdown));

    Ok(handle)
}

async fn run(
    id: EndpointId,
    zone: EndpointId,
    point: GeoPoint,
    cash: u32,
    bus: Bus,
    timing: Arc<AgentTiming>,
    rng: SharedRng,
    mut sonar_rx: mpsc::Receiver<u32>,
    shutdown: CancellationToken,
) {
    let mut mailbox = bus.register(id.clone()).await;
    let mut state = SpotState {
        id: id.clone(),
        zone: zone.clone(),
        point,
        cash,
        vacant: true,
        arrived_at: None,
        private_valuation: None,
        declared_poor: false,
    };

    info!(spot = %id, zone = %zone, cash, "spot online");

    // Announce initial vacancy so the zone (and transitively the parking
    // manager) has a non-empty view before any sonar reading arrives.
    bus.send(id.clone(), zone.clone(), Message::Status(SpotStatus::Vacant { duration_minutes: None })).await;

    loop {
        tokio::select! {
            reading = sonar_rx.recv() => {
                match reading {
                    Some(cm) => handle_sonar(&bus, &mut state, cm).await,
                    None => {
                        debug!(spot = %id, "sonar channel closed");
                        break;
                    }
                }
            }
            envelope = mailbox.recv() => {
                match envelope {
                    Some(envelope) => handle_zone_message(&bus, &mut state, &timing, &rng, envelope.message).await,
                    None => {
                        debug!(spot = %id, "mailbox closed");
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => {
                debug!(spot = %id, "spot shutting down");
                break;
            }
        }
    }

    bus.deregister(&id).await;
}

async fn handle_sonar(bus: &Bus, state: &mut SpotState, sonar_cm: u32) {
    let now_vacant = sonar_cm > OCCUPIED_THRESHOLD_CM;

    let status = if now_vacant && !state.vacant {
        let duration = state.arrived_at.map(|at| at.elapsed().as_secs_f64() / 60.0);
        state.arrived_at = None;
        SpotStatus::Vacant { duration_minutes: duration }
    } else if now_vacant {
        SpotStatus::Vacant { duration_minutes: None }
    } else {
        if state.vacant {
            state.arrived_at = Some(Instant::now());
        }
        SpotStatus::Occupied
    };

    state.vacant = now_vacant;
    debug!(spot = %state.id, sonar_cm, vacant = now_vacant, "sonar reading processed");
    bus.send(state.id.clone(), state.zone.clone(), Message::Status(status)).await;
}

async fn handle_zone_message(bus: &Bus, state: &mut SpotState, timing: &AgentTiming, rng: &SharedRng, message: Message) {
    match message {
        Message::AuctionStart { initial_bid } => {
            let valuation = rng.random_range(timing.valuation_range.clone());
            let valuation = valuation.min(state.cash);
            state.private_valuation = Some(valuation);
            state.declared_poor = false;

            if valuation > initial_bid {
                debug!(spot = %state.id, initial_bid, valuation, "opening bid");
                bus.send(
                    state.id.clone(),
                    state.zone.clone(),
                    Message::Bid { amount: initial_bid, point: state.point },
                )
                .await;
            } else {
                debug!(spot = %state.id, initial_bid, valuation, "sitting out opening round");
            }
        }
        Message::BidRequest { next_bid } => {
            if state.declared_poor {
                return;
            }
            let Some(valuation) = state.private_valuation else {
                return;
            };
            let step = rng.random_range(timing.bid_step_range.clone());
            let candidate = next_bid + step;

            if candidate <= state.cash && candidate <= valuation {
                tokio::time::sleep(timing.bid_pace).await;
                debug!(spot = %state.id, candidate, "escalating bid");
                bus.send(
                    state.id.clone(),
                    state.zone.clone(),
                    Message::Bid { amount: candidate, point: state.point },
                )
                .await;
            } else {
                state.declared_poor = true;
                debug!(spot = %state.id, candidate, valuation, cash = state.cash, "withdrawing from auction");
                bus.send(state.id.clone(), state.zone.clone(), Message::Poor).await;
            }
        }
        Message::AuctionEnd { winner_bid, winner } => {
            if winner.as_ref() == Some(&state.id) {
                state.cash = state.cash.saturating_sub(winner_bid);
                info!(spot = %state.id, winner_bid, cash = state.cash, "won auction");
            }
            state.private_valuation = None;
            state.declared_poor = false;
        }
        other => {
            debug!(spot = %state.id, ?other, "ignoring message outside auction/sonar flow");
        }
    }
}
