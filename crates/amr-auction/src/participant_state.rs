//! Participant-side bookkeeping for one open auction.

use amr_core::TaskId;
use amr_flow::Task;
use amr_order::{InsertionPoint, MetricsComposition, UtilityFn};
use rustc_hash::FxHashMap;

// ── AuctionParticipantTaskState ───────────────────────────────────────────────

/// What the participant knows about one auctioned task: the task itself and,
/// while the trial insertion holds, the bid metrics and the insertion-point
/// token to replay on commit.
///
/// "Valid" means both are present.  The containing state owns these by value
/// in a map keyed by task ID — no back pointers.
#[derive(Clone, Debug)]
pub struct AuctionParticipantTaskState {
    task: Task,
    metrics_composition: Option<MetricsComposition>,
    insertion_point: Option<InsertionPoint>,
}

impl AuctionParticipantTaskState {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            metrics_composition: None,
            insertion_point: None,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn metrics_composition(&self) -> Option<&MetricsComposition> {
        self.metrics_composition.as_ref()
    }

    pub fn insertion_point(&self) -> Option<&InsertionPoint> {
        self.insertion_point.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.metrics_composition.is_some() && self.insertion_point.is_some()
    }

    pub fn set_information(
        &mut self,
        metrics_composition: MetricsComposition,
        insertion_point: InsertionPoint,
    ) {
        self.metrics_composition = Some(metrics_composition);
        self.insertion_point = Some(insertion_point);
    }

    pub fn remove_information(&mut self) {
        self.metrics_composition = None;
        self.insertion_point = None;
    }
}

// ── AuctionParticipantState ───────────────────────────────────────────────────

/// The participant's book for one initiator's auction: a task-state per
/// announced task plus the most recently submitted task, used to suppress
/// redundant resubmissions.
#[derive(Clone, Debug, Default)]
pub struct AuctionParticipantState {
    pub task_states: FxHashMap<TaskId, AuctionParticipantTaskState>,
    pub previously_submitted: Option<TaskId>,
}

impl AuctionParticipantState {
    pub fn new(tasks: Vec<Task>) -> Self {
        let task_states = tasks
            .into_iter()
            .map(|task| (task.id(), AuctionParticipantTaskState::new(task)))
            .collect();
        Self {
            task_states,
            previously_submitted: None,
        }
    }

    /// The task with the best bid metrics.
    ///
    /// # Panics
    /// Panics in debug mode when an invalid entry survives — prune first.
    pub fn pick_best(&self, utility: &UtilityFn) -> Option<&AuctionParticipantTaskState> {
        debug_assert!(
            self.task_states.values().all(|s| s.is_valid()),
            "prune invalid task states before picking a bid"
        );
        self.task_states.values().max_by(|a, b| {
            let ua = utility.evaluate(
                a.metrics_composition()
                    .expect("valid state")
                    .auction_metrics(),
            );
            let ub = utility.evaluate(
                b.metrics_composition()
                    .expect("valid state")
                    .auction_metrics(),
            );
            ua.partial_cmp(&ub)
                .expect("utilities are finite")
                // Deterministic tie-break so resubmission checks are stable.
                .then_with(|| a.task().id().cmp(&b.task().id()))
        })
    }

    /// Drop entries whose information was invalidated.
    pub fn prune(&mut self) {
        self.task_states.retain(|_, state| state.is_valid());
    }

    pub fn has_entries(&self) -> bool {
        !self.task_states.is_empty()
    }
}
