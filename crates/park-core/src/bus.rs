// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-core authors

//! In-process stand-in for the spec's assumed reliable, ordered, unicast
//! agent transport.
//!
//! Directory-of-channels pattern: a `tokio::sync::RwLock<HashMap<..>>`
//! holding one sender per registered endpoint. Registration/deregistration
//! write-lock briefly; every send only needs a read lock. Ordering between
//! any one sender and its receiver is whatever `tokio::sync::mpsc` already
//! gives us — no extra bookkeeping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::error;

use crate::ids::EndpointId;
use crate::message::Message;

/// Default mailbox capacity for an agent registered without an explicit one.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// A message in flight, tagged with its sender's address so a handler can
/// reply without being told the sender out of band.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: EndpointId,
    pub to: EndpointId,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BusError {
    UnknownEndpoint(EndpointId),
    Closed(EndpointId),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEndpoint(id) => write!(f, "no such endpoint: {id}"),
            Self::Closed(id) => write!(f, "endpoint mailbox closed: {id}"),
        }
    }
}

impl std::error::Error for BusError {}

/// Directory of per-endpoint mailboxes. Cheap to clone (wraps an `Arc`); all
/// clones share the same directory.
#[derive(Clone, Default)]
pub struct Bus {
    directory: Arc<RwLock<HashMap<EndpointId, mpsc::Sender<Envelope>>>>,
}

impl Bus {
    pub fn new() -> Self {
        Bus::default()
    }

    /// Register a new endpoint and return its mailbox receiver.
    pub async fn register(&self, id: EndpointId) -> mpsc::Receiver<Envelope> {
        self.register_with_capacity(id, DEFAULT_MAILBOX_CAPACITY).await
    }

    pub async fn register_with_capacity(&self, id: EndpointId, capacity: usize) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(capacity);
        self.directory.write().await.insert(id, tx);
        rx
    }

    pub async fn deregister(&self, id: &EndpointId) {
        self.directory.write().await.remove(id);
    }

    /// Send `message` from `from` to `to`. An unreachable endpoint is a
    /// configuration error in this closed-process model: it is logged and
    /// dropped, never retried, per the error-handling policy for bus sends.
    pub async fn send(&self, from: EndpointId, to: EndpointId, message: Message) {
        let sender = self.directory.read().await.get(&to).cloned();
        match sender {
            Some(tx) => {
                let envelope = Envelope { from: from.clone(), to: to.clone(), message };
                if tx.send(envelope).await.is_err() {
                    error!(%from, %to, "bus send failed: mailbox closed");
                }
            }
            None => {
                error!(%from, %to, "bus send failed: unknown endpoint");
            }
        }
    }

    pub async fn is_registered(&self, id: &EndpointId) -> bool {
        self.directory.read().await.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    #[tokio::test]
    async fn registered_endpoint_receives_sent_message() {
        let bus = Bus::new();
        let driver = EndpointId::new("driver-1");
        let manager = EndpointId::new("manager-1");
        let mut manager_rx = bus.register(manager.clone()).await;

        bus.send(
            driver.clone(),
            manager.clone(),
            Message::DriverRequest {
                environment: None,
                pricing: None,
                point: Some(GeoPoint::new(1.0, 2.0)),
            },
        )
        .await;

        let envelope = manager_rx.recv().await.expect("mailbox should deliver");
        assert_eq!(envelope.from, driver);
        assert_eq!(envelope.to, manager);
    }

    #[tokio::test]
    async fn send_to_unknown_endpoint_is_dropped_without_panicking() {
        let bus = Bus::new();
        bus.send(EndpointId::new("a"), EndpointId::new("nobody"), Message::Poor).await;
    }

    #[tokio::test]
    async fn per_sender_order_is_preserved() {
        let bus = Bus::new();
        let spot = EndpointId::new("spot-1");
        let zone = EndpointId::new("zone-1");
        let mut zone_rx = bus.register(zone.clone()).await;

        bus.send(spot.clone(), zone.clone(), Message::Bid { amount: 15, point: GeoPoint::new(0.0, 0.0) }).await;
        bus.send(spot.clone(), zone.clone(), Message::Bid { amount: 20, point: GeoPoint::new(0.0, 0.0) }).await;

        let first = zone_rx.recv().await.expect("first bid");
        let second = zone_rx.recv().await.expect("second bid");
        assert_eq!(first.message, Message::Bid { amount: 15, point: GeoPoint::new(0.0, 0.0) });
        assert_eq!(second.message, Message::Bid { amount: 20, point: GeoPoint::new(0.0, 0.0) });
    }

    #[tokio::test]
    async fn deregister_removes_endpoint() {
        let bus = Bus::new();
        let id = EndpointId::new("zone-1");
        let _rx = bus.register(id.clone()).await;
        assert!(bus.is_registered(&id).await);
        bus.deregister(&id).await;
        assert!(!bus.is_registered(&id).await);
    }
}
