// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-agents authors

//! The driver: an ephemeral, one-shot task that issues a single parking
//! request and records the outcome.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use park_core::{Bus, EndpointId, Environment, GeoPoint, Message, PricingClass, RouteReply};

use crate::config::AgentTiming;

/// The fully-resolved outcome of a driver's request, once granted.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub zone: EndpointId,
    pub spot: EndpointId,
    pub environment: Environment,
    pub pricing: f64,
    pub point: GeoPoint,
}

/// Outcome of a driver's one-shot request protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Assigned(Assignment),
    Failed,
}

/// Parameters for a single driver request.
pub struct DriverRequest {
    pub id: EndpointId,
    pub parking_manager: EndpointId,
    pub environment: Option<Environment>,
    pub pricing: Option<PricingClass>,
    pub point: Option<GeoPoint>,
}

/// Run one driver's request protocol to completion and return the outcome.
/// An optional `observer` channel is notified with the assigned spot id on
/// success — the scenario runner's stand-in for the out-of-scope HTTP
/// control surface watching driver outcomes.
pub async fn run(bus: Bus, request: DriverRequest, timing: &AgentTiming, observer: Option<mpsc::Sender<EndpointId>>) -> RequestOutcome {
    let DriverRequest { id, parking_manager, environment, pricing, point } = request;
    let mut mailbox = bus.register(id.clone()).await;

    bus.send(id.clone(), parking_manager.clone(), Message::DriverRequest { environment, pricing, point }).await;

    let zone = match tokio::time::timeout(timing.driver_timeout, mailbox.recv()).await {
        Ok(Some(envelope)) => match envelope.message {
            Message::RouteReply(RouteReply::Zone(zone)) => zone,
            Message::RouteReply(RouteReply::NoSpotAvailable) => {
                debug!(driver = %id, "no spot available");
                bus.deregister(&id).await;
                return RequestOutcome::Failed;
            }
            other => {
                warn!(driver = %id, ?other, "unexpected reply from parking manager");
                bus.deregister(&id).await;
                return RequestOutcome::Failed;
            }
        },
        Ok(None) => {
            warn!(driver = %id, "parking manager mailbox closed before reply");
            bus.deregister(&id).await;
            return RequestOutcome::Failed;
        }
        Err(_) => {
            debug!(driver = %id, "timed out waiting for parking manager");
            bus.deregister(&id).await;
            return RequestOutcome::Failed;
        }
    };

    bus.send(id.clone(), zone.clone(), Message::ZoneRequest).await;

    let outcome = match tokio::time::timeout(timing.driver_timeout, mailbox.recv()).await {
        Ok(Some(envelope)) => match envelope.message {
            Message::Assignment { spot: Some(spot), price_hour, environment, point } => {
                info!(driver = %id, zone = %zone, spot = %spot, "parked");
                if let Some(observer) = observer {
                    let _ = observer.send(spot.clone()).await;
                }
                RequestOutcome::Assigned(Assignment { zone, spot, environment, pricing: price_hour, point })
            }
            Message::Assignment { spot: None, .. } => {
                debug!(driver = %id, zone = %zone, "auction closed with no winner");
                RequestOutcome::Failed
            }
            other => {
                warn!(driver = %id, ?other, "unexpected reply from zone manager");
                RequestOutcome::Failed
            }
        },
        Ok(None) => {
            warn!(driver = %id, "zone manager mailbox closed before reply");
            RequestOutcome::Failed
        }
        Err(_) => {
            debug!(driver = %id, zone = %zone, "timed out waiting for zone manager");
            RequestOutcome::Failed
        }
    };

    bus.deregister(&id).await;
    outcome
}
