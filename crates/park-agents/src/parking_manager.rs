// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! The global parking manager: owns the zone catalogue and scores/selects
//! a zone for each driver request.

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use park_core::{Bus, Envelope, Environment, EndpointId, GeoPoint, Message, PricingClass, RouteReply};

use crate::error::AgentError;

/// Key identifying a zone's scoring-relevant fields.
///
/// A named struct rather than a positional tuple: the reference
/// implementation this system descends from stored zones under a tuple key
/// `(jid, environment, lat, lon, price_hour)` but unpacked it on read as
/// `(jid, environment, pricing, lat, lon)`, silently shifting every field
/// after `environment` by one slot. That bug class does not exist here —
/// every field is accessed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneKey {
    pub zone: EndpointId,
    pub environment: Environment,
    pub point: GeoPoint,
    pub price_hour: f64,
}

struct ManagerState {
    id: EndpointId,
    zones: IndexMap<EndpointId, ZoneKey>,
    vacant_counts: IndexMap<EndpointId, u32>,
}

impl ManagerState {
    fn update_zone(&mut self, zone: EndpointId, environment: Environment, point: GeoPoint, price_hour: f64, vacant_count: u32) {
        self.zones.insert(zone.clone(), ZoneKey { zone: zone.clone(), environment, point, price_hour });
        self.vacant_counts.insert(zone, vacant_count);
    }

    /// Rank every zone with `vacant_count > 0` against a driver's
    /// preferences and return the best match, if any.
    fn best_zone(&self, environment: Option<Environment>, pricing: Option<PricingClass>, point: Option<GeoPoint>) -> Option<EndpointId> {
        let mut best: Option<(EndpointId, f64)> = None;

        for (zone, key) in &self.zones {
            let vacant = self.vacant_counts.get(zone).copied().unwrap_or(0);
            if vacant == 0 {
                continue;
            }

            let score = score_zone(key, environment, pricing, point);

            match &best {
                Some((_, best_score)) if *best_score >= score => {}
                _ => best = Some((zone.clone(), score)),
            }
        }

        best.map(|(zone, _)| zone)
    }
}

/// Composite score for one zone against a driver's preferences. Ties are
/// broken by map insertion order in `best_zone` (first-registered zone
/// wins), since this function only ever sees one zone at a time.
fn score_zone(key: &ZoneKey, environment: Option<Environment>, pricing: Option<PricingClass>, point: Option<GeoPoint>) -> f64 {
    environment_weight(key.environment, environment) + pricing_weight(key.price_hour, pricing) + proximity_weight(key, point)
}

fn environment_weight(zone_environment: Environment, client: Option<Environment>) -> f64 {
    let Some(client) = client else {
        return 0.0;
    };
    if zone_environment == client {
        3.0
    } else if zone_environment.preferred_prefix() == Some(client) {
        2.0
    } else {
        1.0
    }
}

fn pricing_weight(zone_price_hour: f64, client: Option<PricingClass>) -> f64 {
    let Some(client) = client else {
        return 0.0;
    };
    let client_price = client.weight();
    if zone_price_hour <= client_price {
        3.0
    } else if zone_price_hour <= 1.5 * client_price {
        2.0
    } else {
        1.0
    }
}

fn proximity_weight(key: &ZoneKey, client_point: Option<GeoPoint>) -> f64 {
    let Some(client_point) = client_point else {
        return 0.0;
    };
    let d = key.point.distance_km(&client_point);
    if d <= 0.1 {
        6.0
    } else if d <= 0.25 {
        5.0
    } else if d <= 0.5 {
        4.0
    } else if d <= 1.0 {
        3.0
    } else if d <= 2.0 {
        2.0
    } else if d <= 5.0 {
        1.0
    } else {
        0.0
    }
}

/// Spawn the parking manager task. Fails if `id` is already registered on
/// `bus`.
pub async fn spawn(id: EndpointId, bus: Bus, shutdown: CancellationToken) -> Result<(), AgentError> {
    if bus.is_registered(&id).await {
        return Err(AgentError::DuplicateEndpoint);
    }

    let state = ManagerState { id, zones: IndexMap::new(), vacant_counts: IndexMap::new() };
    tokio::spawn(run(state, bus, shutdown));
    Ok(())
}

async fn run(mut state: ManagerState, bus: Bus, shutdown: CancellationToken) {
    let mut mailbox = bus.register(state.id.clone()).await;
    info!(manager = %state.id, "parking manager online");

    loop {
        tokio::select! {
            envelope = mailbox.recv() => {
                match envelope {
                    Some(envelope) => handle_message(&mut state, &bus, envelope).await,
                    None => {
                        debug!(manager = %state.id, "mailbox closed");
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => {
                debug!(manager = %state.id, "parking manager shutting down");
                break;
            }
        }
    }

    bus.deregister(&state.id).await;
}

async fn handle_message(state: &mut ManagerState, bus: &Bus, envelope: Envelope) {
    let from = envelope.from.clone();
    match envelope.message {
        Message::ZoneSummary { vacant_count, point, price_hour, environment } => {
            state.update_zone(from, environment, point, price_hour, vacant_count);
        }
        Message::DriverRequest { environment, pricing, point } => {
            let reply = match state.best_zone(environment, pricing, point) {
                Some(zone) => {
                    info!(manager = %state.id, driver = %from, zone = %zone, "routing driver to zone");
                    RouteReply::Zone(zone)
                }
                None => {
                    debug!(manager = %state.id, driver = %from, "no zone qualifies");
                    RouteReply::NoSpotAvailable
                }
            };
            bus.send(state.id.clone(), from, Message::RouteReply(reply)).await;
        }
        other => {
            debug!(manager = %state.id, from = %from, ?other, "ignoring unexpected message");
        }
    }
}
