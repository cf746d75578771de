//! End-to-end allocation scenarios.

use amr_auction::{
    AuctionDelays, AuctionError, CentralParticipant, IteratedAuctionInitiator,
    IteratedAuctionParticipant, Message,
};
use amr_core::{Pose, Position, SimTime, TaskId, Topology};
use amr_flow::{
    Location, MaterialFlow, Order, Task, TimeWindow, TransportOrder, TransportOrderStep,
};
use amr_model::{
    AmrAbility, AmrDescription, AmrKinematics, AmrLoadHandling, AmrPhysicalProperties,
    AmrProperties, FleetRegistry, LoadCarrier,
};
use amr_order::{SimpleOrderManagement, StnOrderManagement, UtilityFn};

use crate::event::AgentHandle;
use crate::harness::{AuctionHarness, CentralHarness};
use crate::observer::SimObserver;
use crate::SimError;

// ── Helpers ───────────────────────────────────────────────────────────────────

const EPS: f64 = 1e-9;

fn topology() -> Topology {
    Topology::new(200.0, 200.0).unwrap()
}

fn fleet_ability() -> AmrAbility {
    AmrAbility::new(LoadCarrier::Package, 20.0)
}

fn unit_robot(serial: u32) -> AmrDescription {
    AmrDescription::new(
        serial,
        AmrKinematics::new(1.0, 0.0, 1.0, -1.0),
        AmrLoadHandling::new(0.0, 0.0, fleet_ability()),
        AmrProperties::standard("acme", "carrier-one"),
        AmrPhysicalProperties {
            weight_kg: 80.0,
            footprint: amr_core::Vec2::new(0.8, 0.6),
        },
    )
}

fn participant_at(index: u32, x: f64, y: f64, fleet: &FleetRegistry) -> IteratedAuctionParticipant {
    let description = unit_robot(index);
    let management = StnOrderManagement::new(
        description.clone(),
        topology(),
        Pose::from(Position::new(x, y)),
        UtilityFn::default(),
    );
    IteratedAuctionParticipant::new(
        format!("amr-{index}"),
        description,
        fleet,
        management,
        UtilityFn::default(),
    )
}

fn transport_task(name: &str, from: (f64, f64), to: (f64, f64), preceding: Vec<TaskId>) -> Task {
    let order = TransportOrder::new(
        vec![TransportOrderStep::new(
            "pickup",
            Location::new("p", "station", Position::new(from.0, from.1)),
        )],
        TransportOrderStep::new(
            "delivery",
            Location::new("d", "station", Position::new(to.0, to.1)),
        ),
    );
    Task::new(
        name,
        vec![Order::Transport(order)],
        preceding,
        AmrAbility::new(LoadCarrier::Package, 10.0),
    )
}

fn harness(participant_positions: &[(f64, f64)]) -> AuctionHarness {
    let fleet = FleetRegistry::from_abilities([fleet_ability()]);
    let participants: Vec<_> = participant_positions
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| participant_at(i as u32, x, y, &fleet))
        .collect();
    let initiator = IteratedAuctionInitiator::new(
        "initiator",
        fleet,
        AuctionDelays::default(),
        UtilityFn::default(),
    );
    AuctionHarness::new(initiator, participants).unwrap()
}

/// Counts protocol traffic per message kind, ignoring the addressee.
#[derive(Default)]
struct TrafficCounter {
    cfps_to_participants: usize,
    bids: usize,
    winner_notifications: usize,
    accepts: usize,
    rejects: usize,
}

impl SimObserver for TrafficCounter {
    fn on_message(&mut self, _time: SimTime, agent: AgentHandle, message: &Message) {
        match message {
            Message::CallForProposal(_) => {
                if matches!(agent, AgentHandle::Participant(_)) {
                    self.cfps_to_participants += 1;
                }
            }
            Message::BidSubmission(_) => self.bids += 1,
            Message::WinnerNotification(_) => self.winner_notifications += 1,
            Message::WinnerResponse(response) => {
                if response.accept {
                    self.accepts += 1;
                } else {
                    self.rejects += 1;
                }
            }
            _ => {}
        }
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn single_task_single_bidder_allocates_in_one_pass() {
    let mut harness = harness(&[(0.0, 0.0)]);
    let task = transport_task("t", (0.0, 0.0), (10.0, 0.0), vec![]);
    let flow = MaterialFlow::new(vec![task.clone()]).unwrap();

    harness.submit_material_flow(flow).unwrap();
    let mut traffic = TrafficCounter::default();
    harness.run(&mut traffic).unwrap();

    assert!(harness.is_idle());
    assert_eq!(traffic.cfps_to_participants, 1);
    assert_eq!(traffic.bids, 1);
    assert_eq!(traffic.winner_notifications, 1);
    assert_eq!(traffic.accepts, 1);
    assert_eq!(traffic.rejects, 0);

    let management = harness.participant(0).management();
    assert_eq!(management.queued_len(), 1);
    let committed = &management.current_ordering()[0];
    assert_eq!(committed.task.id(), task.id());
    let metrics = committed.metrics_composition.current_metrics();
    assert!((metrics.loaded_travel_time - 11.0).abs() < EPS);
    assert!((metrics.empty_travel_time - 0.0).abs() < EPS);
}

#[test]
fn closer_of_two_bidders_wins() {
    let mut harness = harness(&[(0.0, 0.0), (5.0, 0.0)]);
    let task = transport_task("t", (0.0, 0.0), (10.0, 0.0), vec![]);
    harness
        .submit_material_flow(MaterialFlow::new(vec![task]).unwrap())
        .unwrap();
    harness.run(&mut crate::NoopObserver).unwrap();

    assert!(harness.is_idle());
    // The robot already at the pickup has zero empty travel and wins.
    assert_eq!(harness.participant(0).management().queued_len(), 1);
    assert_eq!(harness.participant(1).management().queued_len(), 0);
}

#[test]
fn precedence_chain_takes_one_iteration_per_layer() {
    let a = transport_task("a", (0.0, 0.0), (10.0, 0.0), vec![]);
    let b = transport_task("b", (10.0, 0.0), (20.0, 0.0), vec![a.id()]);
    let c = transport_task("c", (20.0, 0.0), (30.0, 0.0), vec![b.id()]);
    let flow = MaterialFlow::new(vec![a.clone(), b.clone(), c.clone()]).unwrap();

    let mut harness = harness(&[(0.0, 0.0)]);
    harness.submit_material_flow(flow).unwrap();
    let mut traffic = TrafficCounter::default();
    harness.run(&mut traffic).unwrap();

    assert!(harness.is_idle());
    // Depth 3 chain: exactly three iterations, each opening with one CFP.
    assert_eq!(traffic.cfps_to_participants, 3);
    assert_eq!(traffic.accepts, 3);

    let management = harness.participant(0).management();
    assert_eq!(management.queued_len(), 3);
    let ordering: Vec<TaskId> = management
        .current_ordering()
        .iter()
        .map(|info| info.task.id())
        .collect();
    assert_eq!(ordering, vec![a.id(), b.id(), c.id()]);
}

#[test]
fn impossible_window_starves_the_auction() {
    let mut harness = harness(&[(0.0, 0.0)]);
    // 11 s of work inside a 5 s window: nobody can bid.
    let task = transport_task("tight", (0.0, 0.0), (10.0, 0.0), vec![])
        .with_time_window(TimeWindow::new(0.0, 5.0));
    harness
        .submit_material_flow(MaterialFlow::new(vec![task]).unwrap())
        .unwrap();

    let result = harness.run(&mut crate::NoopObserver);
    assert!(matches!(
        result,
        Err(SimError::Auction(AuctionError::BidStarvation(_)))
    ));
}

#[test]
fn two_tasks_in_one_layer_resolve_within_one_iteration() {
    // Both tasks are free from the start; two robots each take one.
    let t1 = transport_task("t1", (0.0, 0.0), (10.0, 0.0), vec![]);
    let t2 = transport_task("t2", (50.0, 0.0), (60.0, 0.0), vec![]);
    let flow = MaterialFlow::new(vec![t1, t2]).unwrap();

    let mut harness = harness(&[(0.0, 0.0), (50.0, 0.0)]);
    harness.submit_material_flow(flow).unwrap();
    harness.run(&mut crate::NoopObserver).unwrap();

    assert!(harness.is_idle());
    assert_eq!(harness.participant(0).management().queued_len(), 1);
    assert_eq!(harness.participant(1).management().queued_len(), 1);
}

// ── Central allocator ─────────────────────────────────────────────────────────

#[test]
fn round_robin_deals_tasks_evenly() {
    let participants = vec![
        CentralParticipant::new(
            "amr-0",
            SimpleOrderManagement::new(unit_robot(0), topology(), Pose::from(Position::new(0.0, 0.0))),
        ),
        CentralParticipant::new(
            "amr-1",
            SimpleOrderManagement::new(unit_robot(1), topology(), Pose::from(Position::new(0.0, 0.0))),
        ),
    ];
    let abilities = vec![fleet_ability(), fleet_ability()];
    let mut harness = CentralHarness::new("central", participants, abilities).unwrap();

    let t1 = transport_task("t1", (0.0, 0.0), (10.0, 0.0), vec![]);
    let t2 = transport_task("t2", (10.0, 0.0), (20.0, 0.0), vec![]);
    let t3 = transport_task("t3", (20.0, 0.0), (30.0, 0.0), vec![]);
    let flow = MaterialFlow::new(vec![t1, t2, t3]).unwrap();

    harness.submit_material_flow(&flow).unwrap();
    harness.run(&mut crate::NoopObserver).unwrap();

    // Every assignment was acknowledged.
    assert_eq!(harness.initiator().confirmed_assignments().len(), 3);
    let queued: Vec<usize> = (0..2)
        .map(|i| harness.participant(i).management().queued_len())
        .collect();
    let mut sorted = queued.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2]);
}

#[test]
fn status_updates_report_totals() {
    let participants = vec![CentralParticipant::new(
        "amr-0",
        SimpleOrderManagement::new(unit_robot(0), topology(), Pose::from(Position::new(0.0, 0.0))),
    )];
    let mut harness =
        CentralHarness::new("central", participants, vec![fleet_ability()]).unwrap();

    let task = transport_task("t", (0.0, 0.0), (10.0, 0.0), vec![]);
    let flow = MaterialFlow::new(vec![task]).unwrap();
    harness.submit_material_flow(&flow).unwrap();
    harness.run(&mut crate::NoopObserver).unwrap();

    harness.poll_status().unwrap();
    harness.run(&mut crate::NoopObserver).unwrap();

    let status = harness.initiator().latest_status("amr-0").unwrap();
    assert_eq!(status.end_position, Position::new(10.0, 0.0));
    assert!((status.metrics.loaded_travel_time - 11.0).abs() < EPS);
}
