// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! The zone manager: aggregates spot vacancy, reports to the parking
//! manager, and runs the ascending-price auction.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use park_core::{Bus, Envelope, Environment, EndpointId, GeoPoint, Message, SpotStatus};

use crate::config::AgentTiming;
use crate::error::AgentError;
use crate::rng::SharedRng;
use crate::telemetry::{ParkedEvent, TelemetrySink};

/// Per-spot occupancy, as tracked by the zone rather than carried on the
/// wire (the wire status additionally carries a departure duration, which
/// the zone only needs in the instant it arrives).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupancy {
    Vacant,
    Occupied,
}

struct AuctionWorkingSet {
    high_bid: u32,
    winner: Option<(EndpointId, GeoPoint)>,
    start: tokio::time::Instant,
    poor_count: u32,
    driver: EndpointId,
}

enum AuctionState {
    Idle,
    Running(AuctionWorkingSet),
}

struct ZoneState {
    id: EndpointId,
    display_id: String,
    parking_manager: EndpointId,
    point: GeoPoint,
    price_hour: f64,
    environment: Environment,
    spots: HashMap<EndpointId, Occupancy>,
    auction: AuctionState,
}

impl ZoneState {
    fn vacant_endpoints(&self) -> Vec<EndpointId> {
        self.spots
            .iter()
            .filter(|(_, occ)| **occ == Occupancy::Vacant)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn vacant_count(&self) -> u32 {
        self.spots.values().filter(|occ| **occ == Occupancy::Vacant).count() as u32
    }
}

/// Spawn a zone manager task. `spot_ids` are the spots this zone owns at
/// construction time; all start vacant. Fails if `spot_ids` is empty (a
/// zone with no spots could never open an auction) or if `id` is already
/// registered on `bus`.
#[allow(clippy::too_many_arguments)]
pub async fn spawn(
    id: EndpointId,
    display_id: String,
    parking_manager: EndpointId,
    point: GeoPoint,
    price_hour: f64,
    environment: Environment,
    spot_ids: Vec<EndpointId>,
    bus: Bus,
    telemetry: Arc<dyn TelemetrySink>,
    timing: Arc<AgentTiming>,
    rng: SharedRng,
    shutdown: CancellationToken,
) -> Result<(), AgentError> {
    if spot_ids.is_empty() {
        return Err(AgentError::EmptyZoneSet);
    }
    if bus.is_registered(&id).await {
        return Err(AgentError::DuplicateEndpoint);
    }

    let spots = spot_ids.into_iter().map(|id| (id, Occupancy::Vacant)).collect();
    let state = ZoneState {
        id,
        display_id,
        parking_manager,
        point,
        price_hour,
        environment,
        spots,
        auction: AuctionState::Idle,
    };
    tokio::spawn(run(state, bus, telemetry, timing, rng, shutdown));
    Ok(())
}

async fn run(
    mut state: ZoneState,
    bus: Bus,
    telemetry: Arc<dyn TelemetrySink>,
    timing: Arc<AgentTiming>,
    rng: SharedRng,
    shutdown: CancellationToken,
) {
    let mut mailbox = bus.register(state.id.clone()).await;
    info!(zone = %state.id, spots = state.spots.len(), "zone manager online");

    loop {
        let deadline = match &state.auction {
            AuctionState::Running(working) => Some(working.start + timing.auction_deadline),
            AuctionState::Idle => None,
        };

        tokio::select! {
            envelope = mailbox.recv() => {
                match envelope {
                    Some(envelope) => handle_message(&mut state, &bus, &telemetry, &timing, &rng, envelope).await,
                    None => {
                        debug!(zone = %state.id, "mailbox closed");
                        break;
                    }
                }
            }
            _ = sleep_until_opt(deadline) => {
                debug!(zone = %state.id, "auction deadline wakeup fired");
                end_auction(&mut state, &bus).await;
            }
            _ = shutdown.cancelled() => {
                debug!(zone = %state.id, "zone manager shutting down");
                break;
            }
        }
    }

    bus.deregister(&state.id).await;
}

/// Sleep until `deadline` if set, otherwise never resolve. Lets the auction
/// deadline be raced in the same `select!` as the mailbox receive without a
/// separate branch per state.
async fn sleep_until_opt(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn handle_message(
    state: &mut ZoneState,
    bus: &Bus,
    telemetry: &Arc<dyn TelemetrySink>,
    timing: &AgentTiming,
    rng: &SharedRng,
    envelope: Envelope,
) {
    let from = envelope.from.clone();
    match envelope.message {
        Message::Status(status) => handle_status(state, bus, telemetry, from, status).await,
        Message::ZoneRequest => handle_zone_request(state, bus, timing, rng, from).await,
        Message::Bid { amount, point } => handle_bid(state, bus, timing, from, amount, point).await,
        Message::Poor => handle_poor(state, bus, from).await,
        other => {
            debug!(zone = %state.id, from = %from, ?other, "ignoring unexpected message");
        }
    }
}

async fn handle_status(
    state: &mut ZoneState,
    bus: &Bus,
    telemetry: &Arc<dyn TelemetrySink>,
    from: EndpointId,
    status: SpotStatus,
) {
    match status {
        SpotStatus::Vacant { duration_minutes } => {
            state.spots.insert(from, Occupancy::Vacant);
            if let Some(duration) = duration_minutes {
                telemetry
                    .publish_parked(&state.display_id, ParkedEvent { parked: false, price: Some(duration * state.price_hour) })
                    .await;
            }
        }
        SpotStatus::Occupied => {
            state.spots.insert(from, Occupancy::Occupied);
            telemetry.publish_parked(&state.display_id, ParkedEvent { parked: true, price: None }).await;
        }
    }

    let vacant_count = state.vacant_count();
    telemetry.publish_display(&state.display_id, vacant_count).await;

    bus.send(
        state.id.clone(),
        state.parking_manager.clone(),
        Message::ZoneSummary {
            vacant_count,
            point: state.point,
            price_hour: state.price_hour,
            environment: state.environment,
        },
    )
    .await;
}

async fn handle_zone_request(state: &mut ZoneState, bus: &Bus, timing: &AgentTiming, rng: &SharedRng, driver: EndpointId) {
    if matches!(state.auction, AuctionState::Running(_)) {
        debug!(zone = %state.id, driver = %driver, "dropping request: auction already running");
        return;
    }

    let vacant = state.vacant_endpoints();
    if vacant.is_empty() {
        debug!(zone = %state.id, driver = %driver, "no vacant spots, not opening an auction");
        return;
    }

    let initial_bid = rng.random_range(timing.initial_bid_range.clone());

    info!(zone = %state.id, driver = %driver, initial_bid, bidders = vacant.len(), "opening auction");
    state.auction = AuctionState::Running(AuctionWorkingSet {
        high_bid: 0,
        winner: None,
        start: tokio::time::Instant::now(),
        poor_count: 0,
        driver,
    });

    for spot in vacant {
        bus.send(state.id.clone(), spot, Message::AuctionStart { initial_bid }).await;
    }
}

async fn handle_bid(
    state: &mut ZoneState,
    bus: &Bus,
    timing: &AgentTiming,
    from: EndpointId,
    amount: u32,
    point: GeoPoint,
) {
    let raised = {
        let Some(working) = running_mut(state) else {
            debug!(zone = %state.id, from = %from, "bid received with no auction running, ignoring");
            return;
        };
        if amount > working.high_bid {
            working.high_bid = amount;
            working.winner = Some((from.clone(), point));
            true
        } else {
            false
        }
    };

    if raised {
        let next_bid = amount + 1;
        let vacant = state.vacant_endpoints();
        for spot in vacant {
            bus.send(state.id.clone(), spot, Message::BidRequest { next_bid }).await;
        }
    }

    let should_end = match running(state) {
        Some(working) => tokio::time::Instant::now() >= working.start + timing.auction_deadline,
        None => false,
    };

    if should_end {
        end_auction(state, bus).await;
    }
}

async fn handle_poor(state: &mut ZoneState, bus: &Bus, from: EndpointId) {
    let should_end = {
        let vacant_count = state.vacant_endpoints().len() as u32;
        let Some(working) = running_mut(state) else {
            debug!(zone = %state.id, from = %from, "poor received with no auction running, ignoring");
            return;
        };
        working.poor_count += 1;
        working.poor_count >= vacant_count
    };

    if should_end {
        end_auction(state, bus).await;
    }
}

fn running(state: &ZoneState) -> Option<&AuctionWorkingSet> {
    match &state.auction {
        AuctionState::Running(w) => Some(w),
        AuctionState::Idle => None,
    }
}

fn running_mut(state: &mut ZoneState) -> Option<&mut AuctionWorkingSet> {
    match &mut state.auction {
        AuctionState::Running(w) => Some(w),
        AuctionState::Idle => None,
    }
}

async fn end_auction(state: &mut ZoneState, bus: &Bus) {
    let working = match std::mem::replace(&mut state.auction, AuctionState::Idle) {
        AuctionState::Running(w) => w,
        AuctionState::Idle => return,
    };

    let vacant = state.vacant_endpoints();
    let winner_id = working.winner.as_ref().map(|(id, _)| id.clone());
    let winner_point = working.winner.as_ref().map(|(_, p)| *p).unwrap_or(state.point);

    info!(zone = %state.id, winner = ?winner_id, winner_bid = working.high_bid, "auction closed");

    for spot in vacant {
        bus.send(
            state.id.clone(),
            spot,
            Message::AuctionEnd { winner_bid: working.high_bid, winner: winner_id.clone() },
        )
        .await;
    }

    bus.send(
        state.id.clone(),
        working.driver,
        Message::Assignment {
            spot: winner_id,
            price_hour: state.price_hour,
            environment: state.environment,
            point: winner_point,
        },
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NoopTelemetry;

    fn rng() -> SharedRng {
        SharedRng::from_seed(1)
    }

    fn fresh_state(spots: Vec<&str>) -> ZoneState {
        ZoneState {
            id: EndpointId::new("zone-1"),
            display_id: "Z1".to_string(),
            parking_manager: EndpointId::new("manager-1"),
            point: GeoPoint::new(41.1776, -8.6077),
            price_hour: 2.5,
            environment: Environment::Outdoor,
            spots: spots.into_iter().map(|s| (EndpointId::new(s), Occupancy::Vacant)).collect(),
            auction: AuctionState::Idle,
        }
    }

    #[tokio::test]
    async fn request_with_no_vacant_spots_does_not_open_auction() {
        let bus = Bus::new();
        let mut state = fresh_state(vec!["spot-1"]);
        state.spots.insert(EndpointId::new("spot-1"), Occupancy::Occupied);
        let timing = AgentTiming::default();

        handle_zone_request(&mut state, &bus, &timing, &rng(), EndpointId::new("driver-1")).await;
        assert!(matches!(state.auction, AuctionState::Idle));
    }

    #[tokio::test]
    async fn request_while_running_is_dropped() {
        let bus = Bus::new();
        let mut state = fresh_state(vec!["spot-1"]);
        state.auction = AuctionState::Running(AuctionWorkingSet {
            high_bid: 10,
            winner: None,
            start: tokio::time::Instant::now(),
            poor_count: 0,
            driver: EndpointId::new("driver-1"),
        });
        let timing = AgentTiming::default();

        handle_zone_request(&mut state, &bus, &timing, &rng(), EndpointId::new("driver-2")).await;
        let high_bid = match &state.auction {
            AuctionState::Running(w) => w.high_bid,
            AuctionState::Idle => panic!("auction should still be running"),
        };
        assert_eq!(high_bid, 10);
    }

    #[tokio::test]
    async fn higher_bid_updates_winner_and_broadcasts_bid_request() {
        let bus = Bus::new();
        let spot1 = EndpointId::new("spot-1");
        let mut spot1_rx = bus.register(spot1.clone()).await;
        let mut state = fresh_state(vec!["spot-1"]);
        state.auction = AuctionState::Running(AuctionWorkingSet {
            high_bid: 10,
            winner: None,
            start: tokio::time::Instant::now(),
            poor_count: 0,
            driver: EndpointId::new("driver-1"),
        });
        let timing = AgentTiming::default();

        handle_bid(&mut state, &bus, &timing, spot1.clone(), 15, GeoPoint::new(0.0, 0.0)).await;

        match &state.auction {
            AuctionState::Running(w) => {
                assert_eq!(w.high_bid, 15);
                assert_eq!(w.winner.as_ref().unwrap().0, spot1);
            }
            AuctionState::Idle => panic!("auction ended early"),
        }

        let envelope = spot1_rx.recv().await.expect("bid request broadcast");
        assert_eq!(envelope.message, Message::BidRequest { next_bid: 16 });
    }

    #[tokio::test]
    async fn unanimous_poor_ends_auction_with_no_winner() {
        let bus = Bus::new();
        let driver = EndpointId::new("driver-1");
        let mut driver_rx = bus.register(driver.clone()).await;
        let spot1 = EndpointId::new("spot-1");
        let _spot1_rx = bus.register(spot1.clone()).await;

        let mut state = fresh_state(vec!["spot-1"]);
        state.auction = AuctionState::Running(AuctionWorkingSet {
            high_bid: 0,
            winner: None,
            start: tokio::time::Instant::now(),
            poor_count: 0,
            driver: driver.clone(),
        });

        handle_poor(&mut state, &bus, spot1).await;
        assert!(matches!(state.auction, AuctionState::Idle));

        let envelope = driver_rx.recv().await.expect("assignment reply");
        match envelope.message {
            Message::Assignment { spot: None, .. } => {}
            other => panic!("expected no-winner assignment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_update_recomputes_vacant_count_and_forwards_summary() {
        let bus = Bus::new();
        let manager = EndpointId::new("manager-1");
        let mut manager_rx = bus.register(manager.clone()).await;
        let mut state = fresh_state(vec!["spot-1", "spot-2"]);
        state.parking_manager = manager;
        let telemetry: Arc<dyn TelemetrySink> = Arc::new(NoopTelemetry);

        handle_status(&mut state, &bus, &telemetry, EndpointId::new("spot-1"), SpotStatus::Occupied).await;
        assert_eq!(state.vacant_count(), 1);

        let envelope = manager_rx.recv().await.expect("zone summary");
        match envelope.message {
            Message::ZoneSummary { vacant_count, .. } => assert_eq!(vacant_count, 1),
            other => panic!("expected zone summary, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn spawn_rejects_an_empty_spot_set() {
        let bus = Bus::new();
        let result = spawn(
            EndpointId::new("zone-1"),
            "Z1".to_string(),
            EndpointId::new("manager-1"),
            GeoPoint::new(0.0, 0.0),
            2.5,
            Environment::Outdoor,
            vec![],
            bus,
            Arc::new(NoopTelemetry),
            Arc::new(AgentTiming::default()),
            rng(),
            CancellationToken::new(),
        )
        .await;
        assert_eq!(result.unwrap_err(), AgentError::EmptyZoneSet);
    }

    #[tokio::test]
    async fn spawn_rejects_a_duplicate_endpoint() {
        let bus = Bus::new();
        let shutdown = CancellationToken::new();
        let args = || {
            (
                EndpointId::new("zone-1"),
                "Z1".to_string(),
                EndpointId::new("manager-1"),
                GeoPoint::new(0.0, 0.0),
                2.5,
                Environment::Outdoor,
                vec![EndpointId::new("spot-1")],
            )
        };

        let (id, display, manager, point, price, env, spots) = args();
        let first = spawn(id, display, manager, point, price, env, spots, bus.clone(), Arc::new(NoopTelemetry), Arc::new(AgentTiming::default()), rng(), shutdown.clone()).await;
        assert!(first.is_ok());

        let (id, display, manager, point, price, env, spots) = args();
        let second = spawn(id, display, manager, point, price, env, spots, bus, Arc::new(NoopTelemetry), Arc::new(AgentTiming::default()), rng(), shutdown).await;
        assert_eq!(second.unwrap_err(), AgentError::DuplicateEndpoint);
    }
}
