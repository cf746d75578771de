//! `StnOrderManagement` — insertion, trial solves, and commit.

use std::collections::HashMap;

use amr_core::{Duration, Pose, Position, TaskId, Topology};
use amr_flow::{Location, Order, Task};
use amr_mobility::{
    estimate_duration_along, metrics_by_domain, orders_to_functionalities, Functionality,
};
use amr_model::AmrDescription;

use crate::composition::MetricsComposition;
use crate::error::{OrderError, OrderResult};
use crate::metrics::{Metrics, UtilityFn};
use crate::stn::{Stn, VertexKey};

// ── InsertionPoint ────────────────────────────────────────────────────────────

/// Names a splice position in the schedule: between `previous_finish` (an
/// order's finish event, or the origin) and an optional `next_start`.
///
/// Opaque to everyone but the order management that minted it; a participant
/// stores it alongside its bid and replays it on commit.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertionPoint {
    pub(crate) previous_finish: VertexKey,
    pub(crate) next_start: Option<VertexKey>,
    pub(crate) index: usize,
}

// ── TaskInsertInfo ────────────────────────────────────────────────────────────

/// One queued task plus its bookkeeping: where the robot stands after each
/// order, and the task's metrics composition.
#[derive(Clone, Debug)]
pub struct TaskInsertInfo {
    pub task: Task,
    /// For each order, the robot's location at the end of its execution.
    pub end_locations: Vec<Location>,
    pub metrics_composition: MetricsComposition,
}

// ── StnOrderManagement ────────────────────────────────────────────────────────

/// The STN-backed schedule of one robot.
///
/// Cheaply clonable on purpose: `can_add_task` and the best-insertion-point
/// search trial-solve on clones and only commit to `self` once a consistent
/// schedule is found.
///
/// The current task is kept *outside* [`current_ordering`][Self] so insertion
/// indices never alias the order under execution.
#[derive(Clone, Debug)]
pub struct StnOrderManagement {
    description: AmrDescription,
    topology: Topology,
    current_pose: Pose,
    utility: UtilityFn,

    stn: Stn,
    time_now: Duration,

    current_task: Option<Task>,
    current_task_end_location: Option<Location>,
    current_task_expected_finish: Duration,

    current_ordering: Vec<TaskInsertInfo>,
    current_total_metrics: Metrics,
    newest_index: Option<usize>,

    latest_insertion_info: Option<(MetricsComposition, InsertionPoint)>,
}

impl StnOrderManagement {
    pub fn new(
        description: AmrDescription,
        topology: Topology,
        pose: Pose,
        utility: UtilityFn,
    ) -> Self {
        Self {
            description,
            topology,
            current_pose: pose,
            utility,
            stn: Stn::new(),
            time_now: 0.0,
            current_task: None,
            current_task_end_location: None,
            current_task_expected_finish: 0.0,
            current_ordering: Vec::new(),
            current_total_metrics: Metrics::with_start_time(0.0),
            newest_index: None,
            latest_insertion_info: None,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn has_tasks(&self) -> bool {
        self.current_task.is_some()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn queued_len(&self) -> usize {
        self.current_ordering.len()
    }

    pub fn current_ordering(&self) -> &[TaskInsertInfo] {
        &self.current_ordering
    }

    pub fn time_now(&self) -> Duration {
        self.time_now
    }

    #[cfg(test)]
    pub(crate) fn stn_vertex_count(&self) -> usize {
        self.stn.vertex_count()
    }

    /// Metrics and insertion point of the most recent successful
    /// `can_add_task`/`add_task`.
    ///
    /// # Panics
    /// Panics when the last trial failed — querying a failed trial is a
    /// programming error, not a recoverable condition.
    pub fn latest_calculated_insertion_info(&self) -> (MetricsComposition, InsertionPoint) {
        self.latest_insertion_info
            .clone()
            .expect("no insertion info: the last can_add_task/add_task was unsuccessful")
    }

    // ── Time ──────────────────────────────────────────────────────────────

    /// Advance the time origin to `now`.  Moving backwards is invalid.
    pub fn set_current_time(&mut self, now: Duration) -> OrderResult<()> {
        if now < self.time_now {
            return Err(OrderError::TimeBackwards {
                now: self.time_now,
                requested: now,
            });
        }
        self.stn.advance_origin(now - self.time_now);
        self.time_now = now;
        Ok(())
    }

    // ── Execution handover ────────────────────────────────────────────────

    /// Pop the earliest queued task as the new current task, removing its
    /// vertices from the STN.  Returns `false` when the queue is empty.
    pub fn set_next_task(&mut self) -> bool {
        if self.current_ordering.is_empty() {
            self.current_task = None;
            return false;
        }

        let info = self.current_ordering.remove(0);
        self.current_task_expected_finish =
            self.time_now + info.metrics_composition.current_metrics().total_time();
        self.current_task_end_location = info.end_locations.last().cloned();

        let expected_finish = self.current_task_expected_finish;
        self.set_current_time(expected_finish)
            .expect("expected finish cannot precede now");

        for order in info.task.orders() {
            self.stn.remove_vertex(VertexKey::start_of(order.id()));
            self.stn.remove_vertex(VertexKey::finish_of(order.id()));
        }

        self.current_task = Some(info.task);
        true
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Non-mutating trial: can `task` be inserted (at `insertion_point`, or
    /// anywhere if `None`)?  On success the resulting metrics and insertion
    /// point are retrievable via
    /// [`latest_calculated_insertion_info`][Self::latest_calculated_insertion_info].
    pub fn can_add_task(
        &mut self,
        task: &Task,
        insertion_point: Option<&InsertionPoint>,
    ) -> OrderResult<bool> {
        self.latest_insertion_info = None;

        let mut trial = self.clone();
        if trial.add_task(task, insertion_point)? {
            self.latest_insertion_info = trial.latest_insertion_info;
            return Ok(true);
        }
        Ok(false)
    }

    /// Mutating insertion.  Returns `Ok(false)` — with `self` untouched —
    /// when the schedule would become inconsistent or the task has already
    /// missed its window.
    pub fn add_task(
        &mut self,
        task: &Task,
        insertion_point: Option<&InsertionPoint>,
    ) -> OrderResult<bool> {
        self.latest_insertion_info = None;

        let orders = task.orders();
        if orders.is_empty() {
            return Err(OrderError::EmptyTask);
        }

        let snapshot = self.clone();

        let mut info = TaskInsertInfo {
            task: task.clone(),
            end_locations: Vec::new(),
            metrics_composition: MetricsComposition::default(),
        };

        for (i, order) in orders.iter().enumerate() {
            let start = VertexKey::start_of(order.id());
            let finish = VertexKey::finish_of(order.id());
            self.stn.add_vertex(start);
            self.stn.add_vertex(finish);

            if let Some(window) = task.time_window() {
                if i == 0 {
                    let earliest = window.absolute_earliest_start() - self.time_now;
                    if earliest < 0.0 {
                        // The window opened in the past; the task is lost.
                        *self = snapshot;
                        return Ok(false);
                    }
                    self.stn.add_unary_constraint(start, Some(earliest), None);
                }
                if i == orders.len() - 1 {
                    let latest = window.absolute_latest_finish() - self.time_now;
                    self.stn.add_unary_constraint(finish, None, Some(latest));
                }
            }

            // Orders within a task are strictly sequential.
            if i > 0 {
                let previous_finish = VertexKey::finish_of(orders[i - 1].id());
                self.stn
                    .add_binary_constraint(previous_finish, start, 0.0, None);
            }

            let duration = match self.order_duration_for_insert(order, &info) {
                Ok(duration) => duration,
                Err(e) => {
                    *self = snapshot;
                    return Err(e);
                }
            };
            self.stn.add_binary_constraint(start, finish, duration, None);

            match order.end_location() {
                Some(location) => info.end_locations.push(location.clone()),
                None => {
                    let last = info.end_locations.last().cloned();
                    match last {
                        Some(location) => info.end_locations.push(location),
                        None => {
                            *self = snapshot;
                            return Err(OrderError::TaskMustStartWithTransport);
                        }
                    }
                }
            }
        }

        // Precedence against predecessors that are still queued here.
        for &predecessor in task.preceding_tasks() {
            self.add_precedence_constraint(VertexKey::start_of(orders[0].id()), predecessor);
        }

        let added = if let Some(point) = insertion_point {
            self.replay_insertion(point, info)
        } else {
            self.best_insertion(info)
        };
        match added {
            Ok(true) => Ok(true),
            Ok(false) => {
                *self = snapshot;
                Ok(false)
            }
            Err(e) => {
                *self = snapshot;
                Err(e)
            }
        }
    }

    /// Splice at a previously minted insertion point and re-solve.
    fn replay_insertion(
        &mut self,
        point: &InsertionPoint,
        info: TaskInsertInfo,
    ) -> OrderResult<bool> {
        // The schedule may have changed since the point was minted; a stale
        // token is an infeasible insertion, not a fault.
        if point.index > self.current_ordering.len()
            || self.stn.index_of(point.previous_finish).is_none()
            || point
                .next_start
                .is_some_and(|next| self.stn.index_of(next).is_none())
        {
            return Ok(false);
        }

        self.add_ordering_constraint(point.clone(), info)?;
        if self.solve()? {
            let metrics = self.newest_metrics_composition();
            self.latest_insertion_info = Some((metrics, point.clone()));
            return Ok(true);
        }
        Ok(false)
    }

    /// Trial-solve every possible insertion position on a scratch clone and
    /// commit the one with the best diff-insertion utility.
    fn best_insertion(&mut self, info: TaskInsertInfo) -> OrderResult<bool> {
        let points = self.insertion_points();

        let mut best: Option<(usize, f64)> = None;
        for (i, point) in points.iter().enumerate() {
            let mut trial = self.clone();
            trial.add_ordering_constraint(point.clone(), info.clone())?;
            if trial.solve()? {
                let metrics = trial.newest_metrics_composition();
                let value = self.utility.evaluate(metrics.auction_metrics());
                if best.is_none_or(|(_, best_value)| value > best_value) {
                    best = Some((i, value));
                }
            }
        }

        let Some((best_index, _)) = best else {
            return Ok(false);
        };
        let point = points[best_index].clone();
        self.add_ordering_constraint(point.clone(), info)?;
        let solved = self.solve()?;
        assert!(solved, "insertion solvable on the trial clone must solve here");

        let metrics = self.newest_metrics_composition();
        self.latest_insertion_info = Some((metrics, point));
        Ok(true)
    }

    fn newest_metrics_composition(&self) -> MetricsComposition {
        let index = self.newest_index.expect("no task was inserted yet");
        self.current_ordering[index].metrics_composition.clone()
    }

    /// All splice positions: before the first queued task, between any two,
    /// and after the last.
    fn insertion_points(&self) -> Vec<InsertionPoint> {
        let mut points = Vec::with_capacity(self.current_ordering.len() + 1);

        let first_start = self
            .current_ordering
            .first()
            .map(|info| VertexKey::start_of(info.task.orders()[0].id()));
        points.push(InsertionPoint {
            previous_finish: VertexKey::Origin,
            next_start: first_start,
            index: 0,
        });

        for (i, info) in self.current_ordering.iter().enumerate() {
            let previous_finish =
                VertexKey::finish_of(info.task.orders().last().expect("non-empty task").id());
            let next_start = self
                .current_ordering
                .get(i + 1)
                .map(|next| VertexKey::start_of(next.task.orders()[0].id()));
            points.push(InsertionPoint {
                previous_finish,
                next_start,
                index: i + 1,
            });
        }

        points
    }

    /// Insert `info` at `point`: ordering vector, glue edges, and the
    /// get-to-start travel constraints on both sides of the splice.
    fn add_ordering_constraint(
        &mut self,
        point: InsertionPoint,
        info: TaskInsertInfo,
    ) -> OrderResult<()> {
        let first_order = info.task.orders()[0].id();
        let last_order = info.task.orders().last().expect("non-empty task").id();
        self.current_ordering.insert(point.index, info);

        self.stn.add_binary_constraint(
            point.previous_finish,
            VertexKey::start_of(first_order),
            0.0,
            None,
        );
        self.update_get_to_start_constraint(point.index)?;

        if let Some(next_start) = point.next_start {
            self.stn
                .add_binary_constraint(VertexKey::finish_of(last_order), next_start, 0.0, None);
            self.update_get_to_start_constraint(point.index + 1)?;
        }
        Ok(())
    }

    fn add_precedence_constraint(&mut self, start: VertexKey, predecessor: TaskId) {
        let Some(info) = self
            .current_ordering
            .iter()
            .find(|info| info.task.id() == predecessor)
        else {
            return; // predecessor executes elsewhere (or already ran)
        };
        let last_finish =
            VertexKey::finish_of(info.task.orders().last().expect("non-empty task").id());
        self.stn.add_binary_constraint(last_finish, start, 0.0, None);
    }

    // ── Solving ───────────────────────────────────────────────────────────

    fn solve(&mut self) -> OrderResult<bool> {
        if !self.stn.solve() {
            return Ok(false);
        }
        self.update_current_ordering()?;
        Ok(true)
    }

    /// Refresh every queued task after a successful solve: current metrics,
    /// execution start times, ordering by start time, schedule total, and the
    /// one-time diff assignment to the freshly inserted task.
    fn update_current_ordering(&mut self) -> OrderResult<()> {
        // First pass is read-only: per-task metrics and start times.
        let mut computed: Vec<(Metrics, Duration, Duration)> =
            Vec::with_capacity(self.current_ordering.len());
        for (i, info) in self.current_ordering.iter().enumerate() {
            let mut metrics = Metrics::default();
            let mut order_starts = Vec::with_capacity(info.task.orders().len());
            for order in info.task.orders() {
                let start_index = self
                    .stn
                    .index_of(VertexKey::start_of(order.id()))
                    .expect("queued order must have an STN vertex");
                let start_time = -self.stn.distance(start_index, 0);
                order_starts.push(start_time + self.time_now);
                self.order_metrics_contribution(order, &mut metrics, info, i)?;
            }
            let task_start = order_starts.iter().copied().fold(f64::INFINITY, f64::min);
            let start_up = self.get_to_start_duration(i)?;
            computed.push((metrics, task_start, start_up));
        }

        // Second pass writes the refreshed compositions.
        let mut start_times: HashMap<TaskId, Duration> =
            HashMap::with_capacity(self.current_ordering.len());
        for (info, (mut metrics, task_start, start_up)) in
            self.current_ordering.iter_mut().zip(computed)
        {
            metrics.set_execution_start_time(task_start);
            metrics.start_up_time = start_up;
            start_times.insert(info.task.id(), task_start);
            info.metrics_composition.update_current_metrics(metrics);
        }

        self.current_ordering.sort_by(|a, b| {
            start_times[&a.task.id()]
                .partial_cmp(&start_times[&b.task.id()])
                .expect("start times are finite")
        });

        let previous_total = self.current_total_metrics;
        let mut new_total = Metrics::with_start_time(0.0);
        for info in &self.current_ordering {
            new_total = new_total + *info.metrics_composition.current_metrics();
        }
        self.current_total_metrics = new_total;

        let fresh: Vec<usize> = self
            .current_ordering
            .iter()
            .enumerate()
            .filter(|(_, info)| !info.metrics_composition.has_diff_insertion_metrics())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(
            fresh.len(),
            1,
            "exactly one queued task may lack diff-insertion metrics"
        );
        let newest = fresh[0];
        let composition = &mut self.current_ordering[newest].metrics_composition;
        composition.set_diff_insertion_metrics(new_total - previous_total);
        composition.fix_insertion_metrics();
        self.newest_index = Some(newest);
        Ok(())
    }

    // ── Durations and metrics per order ───────────────────────────────────

    /// Estimated execution duration of `order` for the duration constraint
    /// `start → finish`, relative to the end location of the order before it.
    ///
    /// A transport order at the head of a task is special: its get-to-pickup
    /// leg is *excluded* here (it belongs to the get-to-start constraint) —
    /// the duration starts at the pickup itself.
    fn order_duration_for_insert(
        &self,
        order: &Order,
        info: &TaskInsertInfo,
    ) -> OrderResult<Duration> {
        let order_index = info
            .task
            .orders()
            .iter()
            .position(|o| o.id() == order.id())
            .unwrap_or(info.end_locations.len());

        match order {
            Order::Move(_) | Order::Action(_) => {
                if order_index == 0 {
                    return Err(OrderError::TaskMustStartWithTransport);
                }
                let previous = info.end_locations[order_index - 1].position();
                let functionalities = orders_to_functionalities(
                    std::slice::from_ref(order),
                    Some(previous),
                )?;
                Ok(estimate_duration_along(
                    &Pose::from(previous),
                    &functionalities,
                    &self.description,
                    &self.topology,
                    false,
                )?)
            }

            Order::Transport(_) => {
                if order_index > 0 {
                    let previous = info.end_locations[order_index - 1].position();
                    let functionalities =
                        orders_to_functionalities(std::slice::from_ref(order), Some(previous))?;
                    return Ok(estimate_duration_along(
                        &Pose::from(previous),
                        &functionalities,
                        &self.description,
                        &self.topology,
                        false,
                    )?);
                }

                let functionalities =
                    orders_to_functionalities(std::slice::from_ref(order), None)?;
                let Some(Functionality::MoveTo { destination }) = functionalities.first() else {
                    unreachable!("a transport order always starts with a move to its pickup");
                };
                let start = *destination;
                Ok(estimate_duration_along(
                    &Pose::from(start),
                    &functionalities[1..],
                    &self.description,
                    &self.topology,
                    false,
                )?)
            }
        }
    }

    /// Add `order`'s cost contribution to `metrics`, splitting transport
    /// orders into empty (get-to-pickup) and loaded (pickup-to-delivery)
    /// domains.
    fn order_metrics_contribution(
        &self,
        order: &Order,
        metrics: &mut Metrics,
        info: &TaskInsertInfo,
        ordering_index: usize,
    ) -> OrderResult<()> {
        let order_index = info
            .task
            .orders()
            .iter()
            .position(|o| o.id() == order.id())
            .expect("order belongs to the task");

        match order {
            Order::Move(_) => {
                if order_index == 0 {
                    return Err(OrderError::TaskMustStartWithTransport);
                }
                let previous = info.end_locations[order_index - 1].position();
                let functionalities =
                    orders_to_functionalities(std::slice::from_ref(order), Some(previous))?;
                metrics.empty_travel_time += estimate_duration_along(
                    &Pose::from(previous),
                    &functionalities,
                    &self.description,
                    &self.topology,
                    false,
                )?;
                metrics.empty_travel_distance +=
                    amr_mobility::calculate_distance_along(previous, &functionalities);
            }

            Order::Transport(_) => {
                let previous = if order_index > 0 {
                    info.end_locations[order_index - 1].position()
                } else {
                    self.last_position_before(ordering_index)
                };
                let functionalities =
                    orders_to_functionalities(std::slice::from_ref(order), None)?;
                let breakdown = metrics_by_domain(
                    previous,
                    &functionalities,
                    &self.description,
                    &self.topology,
                )?;
                metrics.empty_travel_time += breakdown.empty_travel_time;
                metrics.loaded_travel_time += breakdown.loaded_travel_time;
                metrics.action_time += breakdown.action_time;
                metrics.empty_travel_distance += breakdown.empty_travel_distance;
                metrics.loaded_travel_distance += breakdown.loaded_travel_distance;
            }

            Order::Action(_) => {
                if order_index == 0 {
                    return Err(OrderError::TaskMustStartWithTransport);
                }
                let previous = info.end_locations[order_index - 1].position();
                let functionalities =
                    orders_to_functionalities(std::slice::from_ref(order), Some(previous))?;
                metrics.action_time += estimate_duration_along(
                    &Pose::from(previous),
                    &functionalities,
                    &self.description,
                    &self.topology,
                    false,
                )?;
            }
        }
        Ok(())
    }

    // ── Get-to-start handling ─────────────────────────────────────────────

    /// Where the robot stands before the task at `ordering_index` begins.
    fn last_position_before(&self, ordering_index: usize) -> Position {
        if ordering_index == 0 {
            return match &self.current_task_end_location {
                Some(location) => location.position(),
                None => self.current_pose.position,
            };
        }
        self.current_ordering[ordering_index - 1]
            .end_locations
            .last()
            .expect("queued task has end locations")
            .position()
    }

    /// Travel time from the previous task's end to this task's first pickup.
    fn get_to_start_duration(&self, ordering_index: usize) -> OrderResult<Duration> {
        let last_position = self.last_position_before(ordering_index);
        let first_order = &self.current_ordering[ordering_index].task.orders()[0];

        if !matches!(first_order, Order::Transport(_)) {
            return Err(OrderError::TaskMustStartWithTransport);
        }

        let functionalities =
            orders_to_functionalities(std::slice::from_ref(first_order), Some(last_position))?;
        let first_leg = functionalities.first().expect("transport order expands");
        Ok(estimate_duration_along(
            &Pose::from(last_position),
            std::slice::from_ref(first_leg),
            &self.description,
            &self.topology,
            false,
        )?)
    }

    /// Re-tighten the get-to-start lower bound of the task at
    /// `ordering_index` after its predecessor changed.
    fn update_get_to_start_constraint(&mut self, ordering_index: usize) -> OrderResult<()> {
        let duration = self.get_to_start_duration(ordering_index)?;

        let this_start = VertexKey::start_of(
            self.current_ordering[ordering_index].task.orders()[0].id(),
        );
        let previous_finish = if ordering_index == 0 {
            VertexKey::Origin
        } else {
            VertexKey::finish_of(
                self.current_ordering[ordering_index - 1]
                    .task
                    .orders()
                    .last()
                    .expect("non-empty task")
                    .id(),
            )
        };

        self.stn
            .update_last_lower_bound(previous_finish, this_start, duration);
        Ok(())
    }
}
