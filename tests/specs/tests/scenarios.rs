// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-specs authors

//! End-to-end scenario tests driven against the real `Bus` and task
//! wiring — no agent is mocked.

use park_agents::driver::RequestOutcome;
use park_core::EndpointId;
use park_specs::{fast_rng, fast_timing};

#[tokio::test]
async fn happy_path_assigns_the_closer_cheaper_outdoor_zone() {
    let outcome = park_sim::scenario::happy_path(fast_timing(), fast_rng()).await.expect("scenario wiring");
    match outcome {
        RequestOutcome::Assigned(assignment) => {
            assert_eq!(assignment.zone, EndpointId::new("zone-1"));
            assert_eq!(assignment.spot, EndpointId::new("spot-1"));
            assert_eq!(assignment.pricing, 2.5);
        }
        RequestOutcome::Failed => panic!("expected zone-1 to be assigned"),
    }
}

#[tokio::test]
async fn no_availability_leaves_driver_unparked() {
    let outcome = park_sim::scenario::no_availability(fast_timing(), fast_rng()).await.expect("scenario wiring");
    assert_eq!(outcome, RequestOutcome::Failed);
}

#[tokio::test]
async fn environment_fuzzy_match_still_assigns_the_preferred_zone() {
    let outcome = park_sim::scenario::fuzzy_environment_match(fast_timing(), fast_rng()).await.expect("scenario wiring");
    match outcome {
        RequestOutcome::Assigned(assignment) => assert_eq!(assignment.zone, EndpointId::new("zone-1")),
        RequestOutcome::Failed => panic!("expected the -Preferred zone to be assigned"),
    }
}

#[tokio::test]
async fn auction_with_no_bidders_ends_with_unparked_driver() {
    let outcome = park_sim::scenario::auction_all_poor(fast_timing(), fast_rng()).await.expect("scenario wiring");
    assert_eq!(outcome, RequestOutcome::Failed);
}

#[tokio::test]
async fn two_bidder_escalation_assigns_exactly_one_of_the_two_spots() {
    let outcome = park_sim::scenario::two_bidder_escalation(fast_timing(), fast_rng()).await.expect("scenario wiring");
    match outcome {
        RequestOutcome::Assigned(assignment) => {
            assert_eq!(assignment.zone, EndpointId::new("zone-1"));
            assert!(
                assignment.spot == EndpointId::new("spot-1") || assignment.spot == EndpointId::new("spot-2"),
                "winner should be one of the two bidding spots, got {:?}",
                assignment.spot
            );
        }
        RequestOutcome::Failed => panic!("expected one of the two spots to win the auction"),
    }
}

#[tokio::test]
async fn concurrent_auctions_stay_isolated_to_their_own_zone() {
    let (first, second) = park_sim::scenario::concurrent_auctions(fast_timing(), fast_rng()).await.expect("scenario wiring");

    match first {
        RequestOutcome::Assigned(assignment) => assert_eq!(assignment.zone, EndpointId::new("zone-1")),
        RequestOutcome::Failed => panic!("driver-1 should have been assigned in zone-1"),
    }
    match second {
        RequestOutcome::Assigned(assignment) => assert_eq!(assignment.zone, EndpointId::new("zone-2")),
        RequestOutcome::Failed => panic!("driver-2 should have been assigned in zone-2"),
    }
}
