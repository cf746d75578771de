//! Cost metrics and the utility function that orders them.

use std::fmt;
use std::sync::Arc;

use amr_core::{Distance, Duration};
use amr_mobility::DomainBreakdown;
use serde::{Deserialize, Serialize};

// ── Metrics ───────────────────────────────────────────────────────────────────

/// The cost record of a task (or a whole schedule).
///
/// The five domain components are plain sums.  The makespan is either set
/// explicitly or derived from a start time: `start_time` anchors the whole
/// task (travel to it included), `execution_start_time` anchors only the
/// execution — the two are mutually exclusive and their setters enforce it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub empty_travel_time: Duration,
    pub loaded_travel_time: Duration,
    pub action_time: Duration,
    pub empty_travel_distance: Distance,
    pub loaded_travel_distance: Distance,
    /// Time spent getting to the start of the task's first order.
    pub start_up_time: Duration,

    makespan: Option<Duration>,
    start_time: Option<Duration>,
    execution_start_time: Option<Duration>,
}

impl Metrics {
    pub fn new(
        empty_travel_time: Duration,
        loaded_travel_time: Duration,
        action_time: Duration,
        empty_travel_distance: Distance,
        loaded_travel_distance: Distance,
    ) -> Self {
        Self {
            empty_travel_time,
            loaded_travel_time,
            action_time,
            empty_travel_distance,
            loaded_travel_distance,
            ..Self::default()
        }
    }

    /// A zero record anchored at `start_time` — the seed for totals.
    pub fn with_start_time(start_time: Duration) -> Self {
        let mut metrics = Self::default();
        metrics.set_start_time(start_time);
        metrics
    }

    // ── Anchors ───────────────────────────────────────────────────────────

    /// # Panics
    /// Panics if a start time or execution start time is already set.
    pub fn set_makespan(&mut self, makespan: Duration) {
        assert!(
            self.start_time.is_none() && self.execution_start_time.is_none(),
            "makespan cannot be set once a start time is set"
        );
        self.makespan = Some(makespan);
    }

    /// # Panics
    /// Panics if an execution start time is already set.
    pub fn set_start_time(&mut self, start_time: Duration) {
        assert!(
            self.execution_start_time.is_none(),
            "execution start time is already set"
        );
        self.start_time = Some(start_time);
    }

    pub fn is_start_time_set(&self) -> bool {
        self.start_time.is_some()
    }

    /// # Panics
    /// Panics if a start time is already set.
    pub fn set_execution_start_time(&mut self, execution_start_time: Duration) {
        assert!(self.start_time.is_none(), "start time is already set");
        self.execution_start_time = Some(execution_start_time);
    }

    pub fn is_execution_start_time_set(&self) -> bool {
        self.execution_start_time.is_some()
    }

    // ── Derived values ────────────────────────────────────────────────────

    /// When this record's work is finished, on the absolute time axis.
    ///
    /// # Panics
    /// Panics when neither an explicit makespan nor any start anchor is set.
    pub fn makespan(&self) -> Duration {
        if let Some(makespan) = self.makespan {
            return makespan;
        }
        if let Some(execution_start) = self.execution_start_time {
            return execution_start + self.execution_time();
        }
        if let Some(start) = self.start_time {
            return start + self.total_time();
        }
        panic!("no makespan value available");
    }

    /// Travel plus action time.
    #[inline]
    pub fn total_time(&self) -> Duration {
        self.empty_travel_time + self.loaded_travel_time + self.action_time
    }

    /// Total time minus the get-to-start share.
    #[inline]
    pub fn execution_time(&self) -> Duration {
        self.total_time() - self.start_up_time
    }

    #[inline]
    pub fn total_distance(&self) -> Distance {
        self.empty_travel_distance + self.loaded_travel_distance
    }
}

impl std::ops::Add for Metrics {
    type Output = Metrics;

    /// Component-wise sum; `makespan = max` of the operands.
    fn add(self, other: Metrics) -> Metrics {
        let mut sum = Metrics::new(
            self.empty_travel_time + other.empty_travel_time,
            self.loaded_travel_time + other.loaded_travel_time,
            self.action_time + other.action_time,
            self.empty_travel_distance + other.empty_travel_distance,
            self.loaded_travel_distance + other.loaded_travel_distance,
        );
        sum.set_makespan(self.makespan().max(other.makespan()));
        sum
    }
}

impl std::ops::Sub for Metrics {
    type Output = Metrics;

    /// Component-wise difference; `makespan = min` of the operands.
    fn sub(self, other: Metrics) -> Metrics {
        let mut diff = Metrics::new(
            self.empty_travel_time - other.empty_travel_time,
            self.loaded_travel_time - other.loaded_travel_time,
            self.action_time - other.action_time,
            self.empty_travel_distance - other.empty_travel_distance,
            self.loaded_travel_distance - other.loaded_travel_distance,
        );
        diff.set_makespan(self.makespan().min(other.makespan()));
        diff
    }
}

impl From<DomainBreakdown> for Metrics {
    fn from(breakdown: DomainBreakdown) -> Self {
        Metrics::new(
            breakdown.empty_travel_time,
            breakdown.loaded_travel_time,
            breakdown.action_time,
            breakdown.empty_travel_distance,
            breakdown.loaded_travel_distance,
        )
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "empty {:.1}s/{:.1}m, loaded {:.1}s/{:.1}m, action {:.1}s",
            self.empty_travel_time,
            self.empty_travel_distance,
            self.loaded_travel_time,
            self.loaded_travel_distance,
            self.action_time
        )
    }
}

// ── UtilityFn ─────────────────────────────────────────────────────────────────

/// The scalar evaluation that orders metrics: higher is better.
///
/// Injected into every component that compares metrics (order management,
/// auction state on both sides) — there is no process-wide utility.  Cloning
/// is cheap: the closure is shared behind an `Arc`.
#[derive(Clone)]
pub struct UtilityFn(Arc<dyn Fn(&Metrics) -> f64 + Send + Sync>);

impl UtilityFn {
    pub fn new(f: impl Fn(&Metrics) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn evaluate(&self, metrics: &Metrics) -> f64 {
        (self.0)(metrics)
    }
}

impl Default for UtilityFn {
    /// Minimize empty travel: `u(m) = -m.empty_travel_time`.
    fn default() -> Self {
        Self::new(|m| -m.empty_travel_time)
    }
}

impl fmt::Debug for UtilityFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UtilityFn(..)")
    }
}
