//! `Task` — a unit of work auctioned as a whole.

use std::hash::{Hash, Hasher};

use amr_core::TaskId;
use amr_model::AmrAbility;
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::time_window::TimeWindow;

/// An ordered, non-empty sequence of [`Order`]s plus scheduling constraints.
///
/// The orders of one task always run on one robot, strictly sequentially.
/// Equality and hashing are by [`TaskId`] — two snapshots of the same task
/// compare equal even when mutable details (the spawn-stamped window) differ.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    orders: Vec<Order>,
    time_window: Option<TimeWindow>,
    preceding_tasks: Vec<TaskId>,
    ability_requirement: AmrAbility,
}

impl Task {
    /// # Panics
    /// Panics in debug mode if `orders` is empty.
    pub fn new(
        name: impl Into<String>,
        orders: Vec<Order>,
        preceding_tasks: Vec<TaskId>,
        ability_requirement: AmrAbility,
    ) -> Self {
        debug_assert!(!orders.is_empty(), "a task needs at least one order");
        Self {
            id: TaskId::random(),
            name: name.into(),
            orders,
            time_window: None,
            preceding_tasks,
            ability_requirement,
        }
    }

    /// Attach a (relative) time window.
    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[inline]
    pub fn has_time_window(&self) -> bool {
        self.time_window.is_some()
    }

    #[inline]
    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Stamp the spawn time onto the window, if there is one.
    pub fn anchor_time_window(&mut self, spawn_time: f64) {
        if let Some(window) = self.time_window.as_mut() {
            window.set_spawn_time(spawn_time);
        }
    }

    #[inline]
    pub fn preceding_tasks(&self) -> &[TaskId] {
        &self.preceding_tasks
    }

    /// Replace the precedence edges.  Used by flow builders that only know
    /// the predecessors' IDs after creating all tasks.
    pub fn set_preceding_tasks(&mut self, preceding_tasks: Vec<TaskId>) {
        self.preceding_tasks = preceding_tasks;
    }

    #[inline]
    pub fn ability_requirement(&self) -> AmrAbility {
        self.ability_requirement
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
