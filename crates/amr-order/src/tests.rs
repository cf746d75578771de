//! Unit tests for amr-order.

use amr_core::{Pose, Position, Topology};
use amr_flow::{Location, Order, Task, TimeWindow, TransportOrder, TransportOrderStep};
use amr_model::{
    AmrAbility, AmrDescription, AmrKinematics, AmrLoadHandling, AmrPhysicalProperties,
    AmrProperties, LoadCarrier,
};

use crate::stn::{Stn, VertexKey};
use crate::{Metrics, MetricsComposition, OrderError, StnOrderManagement, UtilityFn};

// ── Helpers ───────────────────────────────────────────────────────────────────

const EPS: f64 = 1e-9;

fn unit_robot() -> AmrDescription {
    AmrDescription::new(
        7,
        AmrKinematics::new(1.0, 0.0, 1.0, -1.0),
        AmrLoadHandling::new(0.0, 0.0, AmrAbility::new(LoadCarrier::Package, 20.0)),
        AmrProperties::standard("acme", "carrier-one"),
        AmrPhysicalProperties {
            weight_kg: 80.0,
            footprint: amr_core::Vec2::new(0.8, 0.6),
        },
    )
}

fn management_at(x: f64, y: f64) -> StnOrderManagement {
    StnOrderManagement::new(
        unit_robot(),
        Topology::new(100.0, 100.0).unwrap(),
        Pose::from(Position::new(x, y)),
        UtilityFn::default(),
    )
}

fn transport_task(name: &str, from: (f64, f64), to: (f64, f64)) -> Task {
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
        vec![],
        AmrAbility::new(LoadCarrier::Package, 10.0),
    )
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod metrics {
    use super::*;

    #[test]
    fn sum_takes_max_makespan() {
        let mut a = Metrics::new(1.0, 2.0, 3.0, 10.0, 20.0);
        a.set_makespan(50.0);
        let mut b = Metrics::new(4.0, 5.0, 6.0, 30.0, 40.0);
        b.set_makespan(80.0);

        let sum = a + b;
        assert_eq!(sum.empty_travel_time, 5.0);
        assert_eq!(sum.loaded_travel_distance, 60.0);
        assert_eq!(sum.makespan(), 80.0);
    }

    #[test]
    fn difference_takes_min_makespan() {
        let mut a = Metrics::new(4.0, 5.0, 6.0, 30.0, 40.0);
        a.set_makespan(80.0);
        let mut b = Metrics::new(1.0, 2.0, 3.0, 10.0, 20.0);
        b.set_makespan(50.0);

        let diff = a - b;
        assert_eq!(diff.empty_travel_time, 3.0);
        assert_eq!(diff.makespan(), 50.0);
    }

    #[test]
    fn makespan_from_execution_start() {
        let mut m = Metrics::new(2.0, 3.0, 1.0, 0.0, 0.0);
        m.start_up_time = 2.0;
        m.set_execution_start_time(10.0);
        // execution time = 6 - 2.
        assert_eq!(m.makespan(), 14.0);
    }

    #[test]
    #[should_panic(expected = "start time is already set")]
    fn anchors_are_mutually_exclusive() {
        let mut m = Metrics::default();
        m.set_start_time(1.0);
        m.set_execution_start_time(2.0);
    }

    #[test]
    fn default_utility_prefers_less_empty_travel() {
        let utility = UtilityFn::default();
        let near = Metrics::new(2.0, 9.0, 1.0, 0.0, 0.0);
        let far = Metrics::new(7.0, 9.0, 1.0, 0.0, 0.0);
        assert!(utility.evaluate(&near) > utility.evaluate(&far));
    }
}

// ── MetricsComposition ────────────────────────────────────────────────────────

#[cfg(test)]
mod composition {
    use super::*;

    #[test]
    #[should_panic(expected = "already set")]
    fn diff_insertion_is_set_once() {
        let mut c = MetricsComposition::default();
        c.set_diff_insertion_metrics(Metrics::default());
        c.set_diff_insertion_metrics(Metrics::default());
    }

    #[test]
    #[should_panic(expected = "already fixed")]
    fn insertion_is_fixed_once() {
        let mut c = MetricsComposition::default();
        c.fix_insertion_metrics();
        c.fix_insertion_metrics();
    }

    #[test]
    fn update_current_leaves_insertion_untouched() {
        let mut c = MetricsComposition::new(Metrics::new(1.0, 0.0, 0.0, 0.0, 0.0));
        c.fix_insertion_metrics();
        c.update_current_metrics(Metrics::new(9.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(c.insertion_metrics().empty_travel_time, 1.0);
        assert_eq!(c.current_metrics().empty_travel_time, 9.0);
    }
}

// ── STN ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stn {
    use amr_core::OrderId;

    use super::*;

    #[test]
    fn consistent_chain_solves() {
        let mut stn = Stn::new();
        let a = OrderId::random();
        stn.add_vertex(VertexKey::start_of(a));
        stn.add_vertex(VertexKey::finish_of(a));
        // start >= 0, finish - start >= 5, finish <= 10.
        stn.add_binary_constraint(VertexKey::Origin, VertexKey::start_of(a), 0.0, None);
        stn.add_binary_constraint(VertexKey::start_of(a), VertexKey::finish_of(a), 5.0, None);
        stn.add_unary_constraint(VertexKey::finish_of(a), None, Some(10.0));
        assert!(stn.solve());

        let start_index = stn.index_of(VertexKey::start_of(a)).unwrap();
        let earliest_start = -stn.distance(start_index, 0);
        assert_eq!(earliest_start, 0.0);
    }

    #[test]
    fn over_tight_window_is_inconsistent() {
        let mut stn = Stn::new();
        let a = OrderId::random();
        stn.add_vertex(VertexKey::start_of(a));
        stn.add_vertex(VertexKey::finish_of(a));
        stn.add_binary_constraint(VertexKey::Origin, VertexKey::start_of(a), 0.0, None);
        stn.add_binary_constraint(VertexKey::start_of(a), VertexKey::finish_of(a), 11.0, None);
        stn.add_unary_constraint(VertexKey::finish_of(a), None, Some(5.0));
        assert!(!stn.solve());
    }

    #[test]
    fn solving_twice_yields_identical_distances() {
        let mut stn = Stn::new();
        let a = OrderId::random();
        stn.add_vertex(VertexKey::start_of(a));
        stn.add_vertex(VertexKey::finish_of(a));
        stn.add_binary_constraint(VertexKey::start_of(a), VertexKey::finish_of(a), 3.0, None);
        stn.add_unary_constraint(VertexKey::finish_of(a), None, Some(9.0));
        assert!(stn.solve());
        let first = stn.d_graph().to_vec();
        assert!(stn.solve());
        assert_eq!(first, stn.d_graph());
    }

    #[test]
    fn multi_weight_lower_bound_takes_the_tightest() {
        let mut stn = Stn::new();
        let a = OrderId::random();
        stn.add_vertex(VertexKey::start_of(a));
        // Ordering constraint (>= 0) plus travel constraint (>= 4) share the
        // edge; the effective earliest start is 4.
        stn.add_binary_constraint(VertexKey::Origin, VertexKey::start_of(a), 0.0, None);
        stn.update_last_lower_bound(VertexKey::Origin, VertexKey::start_of(a), 4.0);
        assert!(stn.solve());
        let index = stn.index_of(VertexKey::start_of(a)).unwrap();
        assert_eq!(-stn.distance(index, 0), 4.0);
    }
}

// ── StnOrderManagement ────────────────────────────────────────────────────────

#[cfg(test)]
mod management {
    use super::*;

    #[test]
    fn single_transport_task_costs_loaded_eleven_seconds() {
        let mut management = management_at(0.0, 0.0);
        let task = transport_task("t", (0.0, 0.0), (10.0, 0.0));

        assert!(management.can_add_task(&task, None).unwrap());
        let (metrics, _) = management.latest_calculated_insertion_info();

        let auction = metrics.auction_metrics();
        assert!((auction.loaded_travel_time - 11.0).abs() < EPS);
        assert!((auction.empty_travel_time - 0.0).abs() < EPS);
        // Single task: the diff equals the full task metric.
        assert!((auction.loaded_travel_time
            - metrics.current_metrics().loaded_travel_time)
            .abs()
            < EPS);
        // Bid makespan: execution starts at 0 and runs 11 s.
        assert!((metrics.current_metrics().makespan() - 11.0).abs() < EPS);
    }

    #[test]
    fn single_order_task_adds_two_vertices() {
        let mut management = management_at(0.0, 0.0);
        assert_eq!(management.stn_vertex_count(), 1); // origin only
        let task = transport_task("t", (0.0, 0.0), (10.0, 0.0));
        assert!(management.add_task(&task, None).unwrap());
        assert_eq!(management.stn_vertex_count(), 3); // origin + start + finish
    }

    #[test]
    fn can_add_is_non_mutating_and_add_replays_identically() {
        let mut management = management_at(0.0, 0.0);
        let task = transport_task("t", (0.0, 0.0), (10.0, 0.0));

        assert!(management.can_add_task(&task, None).unwrap());
        assert_eq!(management.queued_len(), 0);
        let (trial_metrics, point) = management.latest_calculated_insertion_info();

        assert!(management.add_task(&task, Some(&point)).unwrap());
        assert_eq!(management.queued_len(), 1);
        let (committed_metrics, _) = management.latest_calculated_insertion_info();
        assert_eq!(trial_metrics, committed_metrics);
    }

    #[test]
    fn missed_window_is_rejected_without_mutation() {
        let mut management = management_at(0.0, 0.0);
        management.set_current_time(100.0).unwrap();

        let mut task = transport_task("late", (0.0, 0.0), (10.0, 0.0))
            .with_time_window(TimeWindow::new(0.0, 50.0));
        task.anchor_time_window(0.0); // earliest start 0 < now 100

        assert!(!management.can_add_task(&task, None).unwrap());
        assert_eq!(management.queued_len(), 0);
    }

    #[test]
    fn window_opening_exactly_now_is_admissible() {
        let mut management = management_at(0.0, 0.0);
        let mut task = transport_task("punctual", (0.0, 0.0), (10.0, 0.0))
            .with_time_window(TimeWindow::new(0.0, 60.0));
        task.anchor_time_window(0.0);
        assert!(management.can_add_task(&task, None).unwrap());
    }

    #[test]
    fn over_tight_window_is_infeasible() {
        let mut management = management_at(0.0, 0.0);
        // 11 s of work inside a 5 s window.
        let mut task = transport_task("tight", (0.0, 0.0), (10.0, 0.0))
            .with_time_window(TimeWindow::new(0.0, 5.0));
        task.anchor_time_window(0.0);

        assert!(!management.can_add_task(&task, None).unwrap());
    }

    #[test]
    #[should_panic(expected = "unsuccessful")]
    fn insertion_info_after_failure_panics() {
        let mut management = management_at(0.0, 0.0);
        let mut task = transport_task("tight", (0.0, 0.0), (10.0, 0.0))
            .with_time_window(TimeWindow::new(0.0, 5.0));
        task.anchor_time_window(0.0);
        let _ = management.can_add_task(&task, None).unwrap();
        management.latest_calculated_insertion_info();
    }

    #[test]
    fn time_never_moves_backwards() {
        let mut management = management_at(0.0, 0.0);
        management.set_current_time(10.0).unwrap();
        assert!(matches!(
            management.set_current_time(5.0),
            Err(OrderError::TimeBackwards { .. })
        ));
        management.set_current_time(10.0).unwrap(); // equal is fine
    }

    #[test]
    fn second_task_accounts_for_repositioning() {
        let mut management = management_at(0.0, 0.0);
        let first = transport_task("first", (0.0, 0.0), (10.0, 0.0));
        assert!(management.add_task(&first, None).unwrap());

        // Second pickup at (20, 0): the empty leg from (10, 0) costs 11 s.
        let second = transport_task("second", (20.0, 0.0), (30.0, 0.0));
        assert!(management.add_task(&second, None).unwrap());
        let (metrics, _) = management.latest_calculated_insertion_info();
        assert!((metrics.auction_metrics().empty_travel_time - 11.0).abs() < EPS);
    }

    #[test]
    fn set_next_task_pops_in_start_order() {
        let mut management = management_at(0.0, 0.0);
        let first = transport_task("first", (0.0, 0.0), (10.0, 0.0));
        let second = transport_task("second", (10.0, 0.0), (20.0, 0.0));
        assert!(management.add_task(&first, None).unwrap());
        assert!(management.add_task(&second, None).unwrap());

        assert!(management.set_next_task());
        assert_eq!(management.current_task().unwrap().id(), first.id());
        assert_eq!(management.queued_len(), 1);

        assert!(management.set_next_task());
        assert_eq!(management.current_task().unwrap().id(), second.id());

        assert!(!management.set_next_task());
        assert!(!management.has_tasks());
    }

    #[test]
    fn precedence_inside_one_schedule_orders_the_pair() {
        let mut management = management_at(0.0, 0.0);
        let first = transport_task("first", (0.0, 0.0), (10.0, 0.0));
        let mut second = transport_task("second", (10.0, 0.0), (20.0, 0.0));
        second.set_preceding_tasks(vec![first.id()]);

        assert!(management.add_task(&first, None).unwrap());
        assert!(management.add_task(&second, None).unwrap());

        let ordering = management.current_ordering();
        assert_eq!(ordering[0].task.id(), first.id());
        assert_eq!(ordering[1].task.id(), second.id());
    }
}

// ── SimpleOrderManagement ─────────────────────────────────────────────────────

#[cfg(test)]
mod simple {
    use super::*;
    use crate::SimpleOrderManagement;

    #[test]
    fn accepts_everything_and_accumulates() {
        let mut management = SimpleOrderManagement::new(
            unit_robot(),
            Topology::new(100.0, 100.0).unwrap(),
            Pose::from(Position::new(0.0, 0.0)),
        );
        let first = transport_task("first", (0.0, 0.0), (10.0, 0.0));
        let second = transport_task("second", (10.0, 0.0), (20.0, 0.0));

        assert!(management.can_add_task(&first));
        management.add_task(&first).unwrap();
        management.add_task(&second).unwrap();

        assert_eq!(management.expected_end_position(), Position::new(20.0, 0.0));
        // Two loaded 10 m legs, no empty travel (each pickup is at the
        // previous end position).
        let metrics = management.final_metrics();
        assert!((metrics.loaded_travel_time - 22.0).abs() < EPS);
        assert!((metrics.empty_travel_time - 0.0).abs() < EPS);
        assert_eq!(management.queued_len(), 2);

        assert!(management.set_next_task());
        assert_eq!(management.current_task().unwrap().id(), first.id());
    }
}
