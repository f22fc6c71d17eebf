// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-core authors

//! Shared addressing, geometry, message taxonomy, and the in-process bus
//! used by every agent in the parking allocation network.

pub mod bus;
pub mod domain;
pub mod geo;
pub mod ids;
pub mod message;

pub use bus::{Bus, BusError, Envelope};
pub use domain::{Environment, PricingClass};
pub use geo::GeoPoint;
pub use ids::EndpointId;
pub use message::{Message, ProtocolError, RouteReply, SpotStatus};
