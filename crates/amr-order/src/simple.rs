//! `SimpleOrderManagement` — the append-only queue behind the central
//! allocator.
//!
//! No temporal network, no insertion search: tasks run in arrival order and
//! every admissible assignment is accepted.  Kept deliberately close to the
//! auction-side interface so the two participant kinds share their shape.

use std::collections::VecDeque;

use amr_core::{Pose, Position, Topology};
use amr_flow::Task;
use amr_mobility::{metrics_by_domain, orders_to_functionalities};
use amr_model::AmrDescription;

use crate::error::OrderResult;
use crate::metrics::Metrics;

/// First-come-first-served schedule of one robot.
#[derive(Clone, Debug)]
pub struct SimpleOrderManagement {
    description: AmrDescription,
    topology: Topology,
    current_pose: Pose,

    queue: VecDeque<Task>,
    current_task: Option<Task>,

    final_metrics: Metrics,
    expected_end_position: Position,
}

impl SimpleOrderManagement {
    pub fn new(description: AmrDescription, topology: Topology, pose: Pose) -> Self {
        Self {
            description,
            topology,
            current_pose: pose,
            queue: VecDeque::new(),
            current_task: None,
            final_metrics: Metrics::with_start_time(0.0),
            expected_end_position: pose.position,
        }
    }

    pub fn has_tasks(&self) -> bool {
        self.current_task.is_some()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Pop the next queued task as the current one.
    pub fn set_next_task(&mut self) -> bool {
        self.current_task = self.queue.pop_front();
        self.current_task.is_some()
    }

    /// The central contract: an assigned task is always accepted.
    pub fn can_add_task(&self, _task: &Task) -> bool {
        true
    }

    /// Append `task`, extending the final metrics and end position by its
    /// cost from the current expected end.
    pub fn add_task(&mut self, task: &Task) -> OrderResult<()> {
        let functionalities = orders_to_functionalities(
            task.orders(),
            Some(self.expected_end_position),
        )?;
        let breakdown = metrics_by_domain(
            self.expected_end_position,
            &functionalities,
            &self.description,
            &self.topology,
        )?;

        // Anchor the addition at the end of the existing queue so the summed
        // makespan extends instead of overlapping.
        let mut addition = Metrics::from(breakdown);
        addition.set_start_time(self.final_metrics.makespan());
        self.final_metrics = self.final_metrics + addition;
        if let Some(end) = task
            .orders()
            .iter()
            .rev()
            .find_map(|order| order.end_location())
        {
            self.expected_end_position = end.position();
        }
        self.queue.push_back(task.clone());
        Ok(())
    }

    /// Accumulated metrics over everything accepted so far.
    pub fn final_metrics(&self) -> &Metrics {
        &self.final_metrics
    }

    /// Where the robot will stand after its whole queue.
    pub fn expected_end_position(&self) -> Position {
        self.expected_end_position
    }

    pub fn current_pose(&self) -> Pose {
        self.current_pose
    }
}
