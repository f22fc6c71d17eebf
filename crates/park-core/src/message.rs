// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-core authors

//! The inter-agent message taxonomy.
//!
//! Internally every agent exchanges typed [`Message`] values over the
//! [`Bus`](crate::bus::Bus) — no text parsing happens on the hot path.
//! [`Message::to_wire`] / [`Message::parse_wire`] only exist at the text-wire
//! boundary (conformance tests, or a future bridge to a real text-based
//! transport) and are parsed once, at ingress.

use std::fmt;

use crate::domain::{Environment, PricingClass};
use crate::geo::GeoPoint;
use crate::ids::EndpointId;

/// Vacancy status a Spot reports to its Zone Manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpotStatus {
    Vacant { duration_minutes: Option<f64> },
    Occupied,
}

/// Routing reply the Parking Manager sends to a Driver.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteReply {
    Zone(EndpointId),
    NoSpotAvailable,
}

/// The full typed message taxonomy exchanged between agents.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Driver -> Parking Manager: initial preferences.
    DriverRequest {
        environment: Option<Environment>,
        pricing: Option<PricingClass>,
        point: Option<GeoPoint>,
    },
    /// Parking Manager -> Driver: routing decision.
    RouteReply(RouteReply),
    /// Driver -> Zone Manager: start an auction.
    ZoneRequest,
    /// Zone Manager -> Driver: assignment outcome (`spot` is `None` when the
    /// auction closed with no winner).
    Assignment {
        spot: Option<EndpointId>,
        price_hour: f64,
        environment: Environment,
        point: GeoPoint,
    },
    /// Zone Manager -> Spot: open an auction.
    AuctionStart { initial_bid: u32 },
    /// Zone Manager -> Spot: solicit a higher bid.
    BidRequest { next_bid: u32 },
    /// Zone Manager -> Spot: close an auction.
    AuctionEnd { winner_bid: u32, winner: Option<EndpointId> },
    /// Spot -> Zone Manager: a bid.
    Bid { amount: u32, point: GeoPoint },
    /// Spot -> Zone Manager: withdraw from the current auction.
    Poor,
    /// Spot -> Zone Manager: vacancy status.
    Status(SpotStatus),
    /// Zone Manager -> Parking Manager: aggregate zone state.
    ZoneSummary {
        vacant_count: u32,
        point: GeoPoint,
        price_hour: f64,
        environment: Environment,
    },
}

/// Errors from parsing a message at the text-wire boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    Malformed(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(body) => write!(f, "malformed message body: {body:?}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

fn none_token(token: &str) -> Option<&str> {
    if token == "None" {
        None
    } else {
        Some(token)
    }
}

impl Message {
    /// Render this message as the plain-text, space-separated wire format
    /// from the external interface table.
    pub fn to_wire(&self) -> String {
        match self {
            Message::DriverRequest { environment, pricing, point } => {
                let env = environment.map(|e| e.wire().to_string()).unwrap_or_else(|| "None".to_string());
                let price = pricing.map(|p| p.wire().to_string()).unwrap_or_else(|| "None".to_string());
                let (lat, lon) = point.map(|p| (p.lat, p.lon)).unwrap_or((0.0, 0.0));
                format!("Request {env} {price} {lat} {lon}")
            }
            Message::RouteReply(RouteReply::Zone(id)) => id.to_string(),
            Message::RouteReply(RouteReply::NoSpotAvailable) => "NoSpotAvailable".to_string(),
            Message::ZoneRequest => "Request".to_string(),
            Message::Assignment { spot, price_hour, environment, point } => {
                let spot = spot.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "None".to_string());
                format!("{spot} {price_hour} {} {} {}", environment.wire(), point.lat, point.lon)
            }
            Message::AuctionStart { initial_bid } => format!("AuctionStart {initial_bid}"),
            Message::BidRequest { next_bid } => format!("BidRequest {next_bid}"),
            Message::AuctionEnd { winner_bid, winner } => {
                let winner = winner.as_ref().map(|w| w.to_string()).unwrap_or_else(|| "None".to_string());
                format!("AuctionEnd {winner_bid} {winner}")
            }
            Message::Bid { amount, point } => format!("Bid {amount} {} {}", point.lat, point.lon),
            Message::Poor => "Poor".to_string(),
            Message::Status(SpotStatus::Vacant { duration_minutes: None }) => "Vacant".to_string(),
            Message::Status(SpotStatus::Vacant { duration_minutes: Some(d) }) => format!("Vacant {d}"),
            Message::Status(SpotStatus::Occupied) => "Occupied".to_string(),
            Message::ZoneSummary { vacant_count, point, price_hour, environment } => {
                format!("{vacant_count} {} {} {price_hour} {}", point.lat, point.lon, environment.wire())
            }
        }
    }

    /// Parse the plain-text wire format back into a typed [`Message`].
    pub fn parse_wire(body: &str) -> Result<Message, ProtocolError> {
        let malformed = || ProtocolError::Malformed(body.to_string());
        let tokens: Vec<&str> = body.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(malformed());
        }

        match (tokens[0], tokens.len()) {
            ("Request", 5) => {
                let environment = none_token(tokens[1]).and_then(Environment::parse);
                let pricing = none_token(tokens[2]).and_then(PricingClass::parse);
                let lat: f64 = tokens[3].parse().map_err(|_| malformed())?;
                let lon: f64 = tokens[4].parse().map_err(|_| malformed())?;
                Ok(Message::DriverRequest { environment, pricing, point: Some(GeoPoint::new(lat, lon)) })
            }
            ("Request", 1) => Ok(Message::ZoneRequest),
            ("NoSpotAvailable", 1) => Ok(Message::RouteReply(RouteReply::NoSpotAvailable)),
            ("AuctionStart", 2) => {
                let initial_bid: u32 = tokens[1].parse().map_err(|_| malformed())?;
                Ok(Message::AuctionStart { initial_bid })
            }
            ("BidRequest", 2) => {
                let next_bid: u32 = tokens[1].parse().map_err(|_| malformed())?;
                Ok(Message::BidRequest { next_bid })
            }
            ("AuctionEnd", 3) => {
                let winner_bid: u32 = tokens[1].parse().map_err(|_| malformed())?;
                let winner = none_token(tokens[2]).map(EndpointId::from);
                Ok(Message::AuctionEnd { winner_bid, winner })
            }
            ("Bid", 4) => {
                let amount: u32 = tokens[1].parse().map_err(|_| malformed())?;
                let lat: f64 = tokens[2].parse().map_err(|_| malformed())?;
                let lon: f64 = tokens[3].parse().map_err(|_| malformed())?;
                Ok(Message::Bid { amount, point: GeoPoint::new(lat, lon) })
            }
            ("Poor", 1) => Ok(Message::Poor),
            ("Vacant", 1) => Ok(Message::Status(SpotStatus::Vacant { duration_minutes: None })),
            ("Vacant", 2) => {
                let d: f64 = tokens[1].parse().map_err(|_| malformed())?;
                Ok(Message::Status(SpotStatus::Vacant { duration_minutes: Some(d) }))
            }
            ("Occupied", 1) => Ok(Message::Status(SpotStatus::Occupied)),
            (_, 1) => Ok(Message::RouteReply(RouteReply::Zone(EndpointId::from(tokens[0])))),
            (_, 5) => {
                if let Ok(vacant_count) = tokens[0].parse::<u32>() {
                    let lat: f64 = tokens[1].parse().map_err(|_| malformed())?;
                    let lon: f64 = tokens[2].parse().map_err(|_| malformed())?;
                    let price_hour: f64 = tokens[3].parse().map_err(|_| malformed())?;
                    let environment = Environment::parse(tokens[4]).ok_or_else(malformed)?;
                    Ok(Message::ZoneSummary { vacant_count, point: GeoPoint::new(lat, lon), price_hour, environment })
                } else {
                    let spot = none_token(tokens[0]).map(EndpointId::from);
                    let price_hour: f64 = tokens[1].parse().map_err(|_| malformed())?;
                    let environment = Environment::parse(tokens[2]).ok_or_else(malformed)?;
                    let lat: f64 = tokens[3].parse().map_err(|_| malformed())?;
                    let lon: f64 = tokens[4].parse().map_err(|_| malformed())?;
                    Ok(Message::Assignment { spot, price_hour, environment, point: GeoPoint::new(lat, lon) })
                }
            }
            _ => Err(malformed()),
        }
    }
}
