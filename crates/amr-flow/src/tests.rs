//! Unit tests for amr-flow.

use amr_core::Position;
use amr_model::{AmrAbility, LoadCarrier};

use crate::{
    ActionOrder, ActionOrderStep, FlowError, Location, MaterialFlow, MoveOrder, MoveOrderStep,
    Order, Task, TimeWindow, TransportOrder, TransportOrderStep,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ability() -> AmrAbility {
    AmrAbility::new(LoadCarrier::Package, 20.0)
}

fn location(name: &str, x: f64, y: f64) -> Location {
    Location::new(name, "station", Position::new(x, y))
}

fn transport_task(name: &str, preceding: Vec<amr_core::TaskId>) -> Task {
    let order = TransportOrder::new(
        vec![TransportOrderStep::new("pickup", location("p", 0.0, 0.0))],
        TransportOrderStep::new("delivery", location("d", 10.0, 0.0)),
    );
    Task::new(name, vec![Order::Transport(order)], preceding, ability())
}

// ── Orders ────────────────────────────────────────────────────────────────────

#[test]
fn end_locations_per_variant() {
    let mv = Order::Move(MoveOrder::new(MoveOrderStep {
        name: "m".into(),
        location: location("a", 1.0, 2.0),
    }));
    assert_eq!(mv.end_location().unwrap().position(), Position::new(1.0, 2.0));

    let action = Order::Action(ActionOrder::new(ActionOrderStep::load("l")));
    assert!(action.end_location().is_none());

    let transport = Order::Transport(TransportOrder::new(
        vec![TransportOrderStep::new("p", location("p", 0.0, 0.0))],
        TransportOrderStep::new("d", location("d", 3.0, 4.0)),
    ));
    assert_eq!(
        transport.end_location().unwrap().position(),
        Position::new(3.0, 4.0)
    );
}

// ── TimeWindow ────────────────────────────────────────────────────────────────

#[test]
fn window_absolute_accessors_after_anchor() {
    let mut w = TimeWindow::new(5.0, 60.0);
    assert!(!w.has_spawn_time());
    w.set_spawn_time(100.0);
    assert_eq!(w.absolute_earliest_start(), 105.0);
    assert_eq!(w.absolute_latest_finish(), 160.0);
}

#[test]
#[should_panic(expected = "no spawn time")]
fn window_absolute_accessor_panics_without_spawn() {
    TimeWindow::new(0.0, 10.0).absolute_earliest_start();
}

// ── Task ──────────────────────────────────────────────────────────────────────

#[test]
fn task_equality_is_by_id() {
    let a = transport_task("a", vec![]);
    let mut b = a.clone();
    b.anchor_time_window(5.0); // no window; still equal by id either way
    assert_eq!(a, b);
    assert_ne!(a, transport_task("a", vec![]));
}

// ── MaterialFlow ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod material_flow {
    use super::*;

    #[test]
    fn chain_is_valid() {
        let a = transport_task("a", vec![]);
        let b = transport_task("b", vec![a.id()]);
        let c = transport_task("c", vec![b.id()]);
        let flow = MaterialFlow::new(vec![a, b, c]).unwrap();
        assert_eq!(flow.len(), 3);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut a = transport_task("a", vec![]);
        let b = transport_task("b", vec![a.id()]);
        a.set_preceding_tasks(vec![b.id()]);
        let result = MaterialFlow::new(vec![a, b]);
        assert!(matches!(result, Err(FlowError::Cyclic)));
    }

    #[test]
    fn unknown_predecessor_is_rejected() {
        let ghost = transport_task("ghost", vec![]);
        let a = transport_task("a", vec![ghost.id()]);
        let result = MaterialFlow::new(vec![a]);
        assert!(matches!(result, Err(FlowError::UnknownPredecessor { .. })));
    }

    #[test]
    fn anchor_stamps_every_window() {
        let task = transport_task("a", vec![]).with_time_window(TimeWindow::new(0.0, 30.0));
        let mut flow = MaterialFlow::new(vec![task]).unwrap();
        flow.anchor_time_windows(7.0);
        let window = flow.tasks()[0].time_window().unwrap();
        assert_eq!(window.absolute_latest_finish(), 37.0);
    }
}
