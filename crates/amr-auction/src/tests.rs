//! Unit tests for amr-auction.

use amr_core::Position;
use amr_flow::{
    Location, MaterialFlow, Order, Task, TransportOrder, TransportOrderStep,
};
use amr_model::{AmrAbility, LoadCarrier};
use amr_order::{Metrics, MetricsComposition, UtilityFn};

use crate::initiator_state::AuctionInitiatorState;
use crate::messages::{BidSubmission, Message, WinnerResponse};
use crate::participant_state::AuctionParticipantState;
use crate::precedence::{LayeredPrecedenceGraph, PrecedenceLayer};
use crate::AuctionError;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ability(payload: f64) -> AmrAbility {
    AmrAbility::new(LoadCarrier::Package, payload)
}

fn transport_task(name: &str, preceding: Vec<amr_core::TaskId>) -> Task {
    let order = TransportOrder::new(
        vec![TransportOrderStep::new(
            "pickup",
            Location::new("p", "station", Position::new(0.0, 0.0)),
        )],
        TransportOrderStep::new(
            "delivery",
            Location::new("d", "station", Position::new(10.0, 0.0)),
        ),
    );
    Task::new(name, vec![Order::Transport(order)], preceding, ability(10.0))
}

/// A composition whose diff-insertion empty travel is `empty_s` seconds.
fn composition(empty_s: f64) -> MetricsComposition {
    let mut current = Metrics::new(empty_s, 10.0, 0.0, empty_s, 10.0);
    current.set_start_time(0.0);
    let mut c = MetricsComposition::new(current);
    c.set_diff_insertion_metrics(current);
    c
}

fn bid(task: &Task, connection: &str, payload: f64, empty_s: f64) -> BidSubmission {
    BidSubmission::new(task.id(), connection, ability(payload), composition(empty_s))
}

// ── LayeredPrecedenceGraph ────────────────────────────────────────────────────

#[cfg(test)]
mod precedence {
    use super::*;

    fn chain() -> (Task, Task, Task, LayeredPrecedenceGraph) {
        let a = transport_task("a", vec![]);
        let b = transport_task("b", vec![a.id()]);
        let c = transport_task("c", vec![b.id()]);
        let flow = MaterialFlow::new(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        let graph = LayeredPrecedenceGraph::new(&flow);
        (a, b, c, graph)
    }

    #[test]
    fn initial_layers_of_a_chain() {
        let (a, b, c, graph) = chain();
        assert_eq!(graph.layer_of(a.id()).unwrap(), PrecedenceLayer::Free);
        assert_eq!(graph.layer_of(b.id()).unwrap(), PrecedenceLayer::Second);
        assert_eq!(graph.layer_of(c.id()).unwrap(), PrecedenceLayer::Hidden);
        assert_eq!(graph.auctionable_tasks().len(), 1);
    }

    #[test]
    fn next_promotes_layer_by_layer() {
        let (a, b, c, mut graph) = chain();
        graph.set_latest_finish_time(a.id(), 25.0).unwrap();

        graph.next();
        assert_eq!(graph.layer_of(a.id()).unwrap(), PrecedenceLayer::Scheduled);
        assert_eq!(graph.layer_of(b.id()).unwrap(), PrecedenceLayer::Free);
        assert_eq!(graph.layer_of(c.id()).unwrap(), PrecedenceLayer::Second);
        // PC[b] = F[a].
        assert_eq!(graph.earliest_valid_start_time(b.id()).unwrap(), Some(25.0));

        graph.next();
        assert_eq!(graph.layer_of(c.id()).unwrap(), PrecedenceLayer::Free);

        graph.next();
        assert!(graph.are_all_tasks_scheduled());
    }

    #[test]
    fn chain_depth_equals_iteration_count() {
        let (_, _, _, mut graph) = chain();
        let mut iterations = 0;
        while !graph.are_all_tasks_scheduled() {
            graph.next();
            iterations += 1;
        }
        assert_eq!(iterations, 3);
    }

    #[test]
    fn diamond_joins_wait_for_both_parents() {
        let a = transport_task("a", vec![]);
        let b = transport_task("b", vec![a.id()]);
        let c = transport_task("c", vec![a.id()]);
        let d = transport_task("d", vec![b.id(), c.id()]);
        let flow =
            MaterialFlow::new(vec![a.clone(), b.clone(), c.clone(), d.clone()]).unwrap();
        let mut graph = LayeredPrecedenceGraph::new(&flow);
        graph.set_latest_finish_time(a.id(), 10.0).unwrap();

        graph.next(); // a scheduled; b, c free
        assert_eq!(graph.layer_of(b.id()).unwrap(), PrecedenceLayer::Free);
        assert_eq!(graph.layer_of(c.id()).unwrap(), PrecedenceLayer::Free);
        assert_eq!(graph.layer_of(d.id()).unwrap(), PrecedenceLayer::Second);

        graph.set_latest_finish_time(b.id(), 30.0).unwrap();
        graph.set_latest_finish_time(c.id(), 40.0).unwrap();
        graph.next(); // b, c scheduled; d free with PC = max(F[b], F[c])
        assert_eq!(graph.layer_of(d.id()).unwrap(), PrecedenceLayer::Free);
        assert_eq!(graph.earliest_valid_start_time(d.id()).unwrap(), Some(40.0));
    }

    #[test]
    fn scheduled_flag_gates_iteration_progress() {
        let (a, _, _, mut graph) = chain();
        assert!(!graph.are_all_free_tasks_scheduled());
        graph.set_task_scheduled(a.id()).unwrap();
        assert!(graph.are_all_free_tasks_scheduled());
        assert!(graph.is_free_task_scheduled(a.id()).unwrap());
        graph.set_task_unscheduled(a.id()).unwrap();
        assert!(!graph.are_all_free_tasks_scheduled());
    }
}

// ── AuctionInitiatorState ─────────────────────────────────────────────────────

#[cfg(test)]
mod initiator_state {
    use super::*;

    fn single_task_setup() -> (Task, LayeredPrecedenceGraph, AuctionInitiatorState) {
        let task = transport_task("t", vec![]);
        let flow = MaterialFlow::new(vec![task.clone()]).unwrap();
        let graph = LayeredPrecedenceGraph::new(&flow);
        let state = AuctionInitiatorState::new(UtilityFn::default());
        (task, graph, state)
    }

    #[test]
    fn best_utility_wins() {
        let (task, mut graph, mut state) = single_task_setup();
        state.add_bid(bid(&task, "amr-far", 20.0, 6.0));
        state.add_bid(bid(&task, "amr-near", 20.0, 1.0));

        let winners = state.select_winners(&mut graph).unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].connection, "amr-near");
        assert!(graph.is_free_task_scheduled(task.id()).unwrap());
        assert!(!state.has_bids());
    }

    #[test]
    fn equal_utility_prefers_the_less_able_robot() {
        let (task, mut graph, mut state) = single_task_setup();
        state.add_bid(bid(&task, "amr-big", 40.0, 2.0));
        state.add_bid(bid(&task, "amr-small", 15.0, 2.0));

        let winners = state.select_winners(&mut graph).unwrap();
        assert_eq!(winners[0].connection, "amr-small");
    }

    #[test]
    fn rejection_rolls_the_task_back_and_keeps_other_bids() {
        let (task, mut graph, mut state) = single_task_setup();
        state.add_bid(bid(&task, "amr-a", 20.0, 1.0));
        state.add_bid(bid(&task, "amr-b", 20.0, 3.0));

        let winners = state.select_winners(&mut graph).unwrap();
        assert_eq!(winners[0].connection, "amr-a");

        // Winner selection dropped all bids on the task; the loser re-bids.
        state.add_bid(bid(&task, "amr-b", 20.0, 3.0));
        let response = WinnerResponse::new(task.id(), "amr-a", false);
        state.add_winner_response(response, &mut graph).unwrap();
        assert!(!graph.is_free_task_scheduled(task.id()).unwrap());

        let winners = state.select_winners(&mut graph).unwrap();
        assert_eq!(winners[0].connection, "amr-b");
    }

    #[test]
    fn five_empty_bid_windows_are_fatal() {
        let (_, _, mut state) = single_task_setup();
        for _ in 0..4 {
            state.count_bid_window().unwrap();
        }
        assert!(matches!(
            state.count_bid_window(),
            Err(AuctionError::BidStarvation(5))
        ));
    }

    #[test]
    fn bids_reset_the_starvation_counter() {
        let (task, _, mut state) = single_task_setup();
        for _ in 0..4 {
            state.count_bid_window().unwrap();
        }
        state.add_bid(bid(&task, "amr-a", 20.0, 1.0));
        state.count_bid_window().unwrap();
        for _ in 0..4 {
            state.clear_iteration_info();
            state.count_bid_window().unwrap();
        }
    }
}

// ── AuctionParticipantState ───────────────────────────────────────────────────

#[cfg(test)]
mod participant_state {
    use super::*;

    #[test]
    fn prune_drops_entries_without_bid_information() {
        let a = transport_task("a", vec![]);
        let b = transport_task("b", vec![]);
        let mut state = AuctionParticipantState::new(vec![a, b]);
        assert_eq!(state.task_states.len(), 2);

        // No entry ever received metrics or an insertion point.
        state.prune();
        assert!(!state.has_entries());
    }

    #[test]
    fn unknown_iteration_ids_are_a_no_op() {
        let a = transport_task("a", vec![]);
        let mut state = AuctionParticipantState::new(vec![a.clone()]);
        state.task_states.remove(&transport_task("ghost", vec![]).id());
        assert_eq!(state.task_states.len(), 1);
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

#[test]
fn wire_encoding_is_symmetric() {
    let task = transport_task("t", vec![]);
    let message = Message::BidSubmission(bid(&task, "amr-1", 20.0, 2.0));
    let decoded = Message::decode(&message.encode()).unwrap();
    match decoded {
        Message::BidSubmission(decoded_bid) => {
            assert_eq!(decoded_bid.task_id, task.id());
            assert_eq!(decoded_bid.participant_connection, "amr-1");
        }
        other => panic!("decoded the wrong variant: {other:?}"),
    }
}
