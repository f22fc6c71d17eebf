// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-sim authors

//! Library API standing in for the out-of-scope HTTP control surface:
//! builds a network of agents over a shared [`Bus`] and issues driver
//! requests against it.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use park_agents::driver::{self, DriverRequest, RequestOutcome};
use park_agents::{parking_manager, spot, zone, AgentTiming, NoopTelemetry, SharedRng, TelemetrySink};
use park_core::{Bus, EndpointId, Environment, GeoPoint, PricingClass};

/// A zone and the spots spawned for it, returned by [`ScenarioBuilder::add_zone`]
/// so callers can drive sonar readings.
pub struct ZoneHandle {
    pub id: EndpointId,
    pub spots: Vec<spot::SpotHandle>,
}

/// Builder for an in-process network of parking agents sharing one [`Bus`].
pub struct ScenarioBuilder {
    bus: Bus,
    timing: Arc<AgentTiming>,
    rng: SharedRng,
    telemetry: Arc<dyn TelemetrySink>,
    shutdown: CancellationToken,
    manager: EndpointId,
}

impl ScenarioBuilder {
    pub async fn new(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<Self> {
        Self::with_telemetry(timing, rng, Arc::new(NoopTelemetry)).await
    }

    pub async fn with_telemetry(timing: AgentTiming, rng: SharedRng, telemetry: Arc<dyn TelemetrySink>) -> anyhow::Result<Self> {
        let bus = Bus::new();
        let shutdown = CancellationToken::new();
        let manager = EndpointId::new("parking-manager");
        parking_manager::spawn(manager.clone(), bus.clone(), shutdown.clone())
            .await
            .context("spawning parking manager")?;

        Ok(ScenarioBuilder { bus, timing: Arc::new(timing), rng, telemetry, shutdown, manager })
    }

    /// Register a zone and its spots. `spot_specs` is `(id, cash)` per spot;
    /// every spot shares the zone's coordinates.
    pub async fn add_zone(
        &mut self,
        zone_id: &str,
        display_id: &str,
        point: GeoPoint,
        price_hour: f64,
        environment: Environment,
        spot_specs: &[(&str, u32)],
    ) -> anyhow::Result<ZoneHandle> {
        let zone_id = EndpointId::new(zone_id);
        let spot_ids: Vec<EndpointId> = spot_specs.iter().map(|(id, _)| EndpointId::new(*id)).collect();

        zone::spawn(
            zone_id.clone(),
            display_id.to_string(),
            self.manager.clone(),
            point,
            price_hour,
            environment,
            spot_ids.clone(),
            self.bus.clone(),
            Arc::clone(&self.telemetry),
            Arc::clone(&self.timing),
            self.rng.clone(),
            self.shutdown.clone(),
        )
        .await
        .with_context(|| format!("spawning zone {zone_id}"))?;

        let mut spots = Vec::with_capacity(spot_specs.len());
        for (id, cash) in spot_specs {
            let handle = spot::spawn(
                EndpointId::new(*id),
                zone_id.clone(),
                point,
                *cash,
                self.bus.clone(),
                Arc::clone(&self.timing),
                self.rng.clone(),
                self.shutdown.clone(),
            )
            .await
            .with_context(|| format!("spawning spot {id}"))?;
            spots.push(handle);
        }

        Ok(ZoneHandle { id: zone_id, spots })
    }

    /// Run one driver's request to completion.
    pub async fn request(
        &self,
        driver_id: &str,
        environment: Option<Environment>,
        pricing: Option<PricingClass>,
        point: Option<GeoPoint>,
    ) -> RequestOutcome {
        driver::run(
            self.bus.clone(),
            DriverRequest { id: EndpointId::new(driver_id), parking_manager: self.manager.clone(), environment, pricing, point },
            &self.timing,
            None,
        )
        .await
    }

    /// Give in-flight agent tasks a moment to process status broadcasts
    /// before a request is issued against them. Scenario wiring, not a
    /// protocol requirement — agents converge regardless of when this is
    /// called, but demo output reads more sensibly after a short settle.
    pub async fn settle(&self) {
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Scenario 1: happy path assignment.
pub async fn happy_path(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<RequestOutcome> {
    let mut scenario = ScenarioBuilder::new(timing, rng).await?;
    scenario.add_zone("zone-1", "Z1", GeoPoint::new(41.1776, -8.6077), 2.5, Environment::Outdoor, &[("spot-1", 150)]).await?;
    scenario.add_zone("zone-2", "Z2", GeoPoint::new(41.1782, -8.6076), 3.0, Environment::Indoor, &[("spot-2", 150)]).await?;
    scenario.settle().await;
    let outcome = scenario.request("driver-1", Some(Environment::Outdoor), Some(PricingClass::Low), Some(GeoPoint::new(41.1776, -8.6077))).await;
    scenario.shutdown();
    Ok(outcome)
}

/// Scenario 2: no availability.
pub async fn no_availability(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<RequestOutcome> {
    let mut scenario = ScenarioBuilder::new(timing, rng).await?;
    let zone = scenario.add_zone("zone-1", "Z1", GeoPoint::new(41.1776, -8.6077), 2.5, Environment::Outdoor, &[("spot-1", 150)]).await?;
    zone.spots[0].report_sonar(5).await;
    scenario.settle().await;
    let outcome = scenario.request("driver-1", Some(Environment::Outdoor), Some(PricingClass::Low), Some(GeoPoint::new(41.1776, -8.6077))).await;
    scenario.shutdown();
    Ok(outcome)
}

/// Scenario 3: environment fuzzy match.
pub async fn fuzzy_environment_match(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<RequestOutcome> {
    let mut scenario = ScenarioBuilder::new(timing, rng).await?;
    scenario.add_zone("zone-1", "Z1", GeoPoint::new(41.1776, -8.6077), 2.5, Environment::OutdoorPreferred, &[("spot-1", 150)]).await?;
    scenario.settle().await;
    let outcome = scenario.request("driver-1", Some(Environment::Outdoor), None, Some(GeoPoint::new(41.1776, -8.6077))).await;
    scenario.shutdown();
    Ok(outcome)
}

/// Scenario 4: both bidders declare poor, auction ends with no winner.
pub async fn auction_all_poor(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<RequestOutcome> {
    let mut scenario = ScenarioBuilder::new(timing, rng).await?;
    scenario.add_zone("zone-1", "Z1", GeoPoint::new(41.1776, -8.6077), 2.5, Environment::Outdoor, &[("spot-1", 5), ("spot-2", 5)]).await?;
    scenario.settle().await;
    let outcome = scenario.request("driver-1", Some(Environment::Outdoor), None, Some(GeoPoint::new(41.1776, -8.6077))).await;
    scenario.shutdown();
    Ok(outcome)
}

/// Scenario 5: two bidders escalate until one folds.
pub async fn two_bidder_escalation(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<RequestOutcome> {
    let mut scenario = ScenarioBuilder::new(timing, rng).await?;
    scenario.add_zone("zone-1", "Z1", GeoPoint::new(41.1776, -8.6077), 2.5, Environment::Outdoor, &[("spot-1", 100), ("spot-2", 100)]).await?;
    scenario.settle().await;
    let outcome = scenario.request("driver-1", Some(Environment::Outdoor), None, Some(GeoPoint::new(41.1776, -8.6077))).await;
    scenario.shutdown();
    Ok(outcome)
}

/// Scenario 6: two drivers, two zones, concurrent independent auctions.
pub async fn concurrent_auctions(timing: AgentTiming, rng: SharedRng) -> anyhow::Result<(RequestOutcome, RequestOutcome)> {
    let mut scenario = ScenarioBuilder::new(timing, rng).await?;
    scenario.add_zone("zone-1", "Z1", GeoPoint::new(41.1776, -8.6077), 2.5, Environment::Outdoor, &[("spot-1", 150)]).await?;
    scenario.add_zone("zone-2", "Z2", GeoPoint::new(10.0, 10.0), 2.5, Environment::Outdoor, &[("spot-2", 150)]).await?;
    scenario.settle().await;

    let (first, second) = tokio::join!(
        scenario.request("driver-1", Some(Environment::Outdoor), None, Some(GeoPoint::new(41.1776, -8.6077))),
        scenario.request("driver-2", Some(Environment::Outdoor), None, Some(GeoPoint::new(10.0, 10.0))),
    );
    scenario.shutdown();
    Ok((first, second))
}
