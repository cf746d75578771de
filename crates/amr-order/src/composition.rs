//! `MetricsComposition` — the three cost snapshots of a scheduled task.

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// Three snapshots of one task's cost:
///
/// - **current** — what the task costs in the schedule *now*, updated every
///   time a later insertion shifts it;
/// - **insertion** — the current metrics frozen at commit time, set exactly
///   once by [`fix_insertion_metrics`][Self::fix_insertion_metrics];
/// - **diff insertion** — the delta the insertion added to the whole
///   schedule, set exactly once.  This is the value bids are ranked by.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsComposition {
    current: Metrics,
    insertion: Option<Metrics>,
    diff_insertion: Option<Metrics>,
}

impl MetricsComposition {
    pub fn new(current: Metrics) -> Self {
        Self {
            current,
            insertion: None,
            diff_insertion: None,
        }
    }

    #[inline]
    pub fn current_metrics(&self) -> &Metrics {
        &self.current
    }

    pub fn update_current_metrics(&mut self, current: Metrics) {
        self.current = current;
    }

    /// The metrics frozen at insertion time.
    ///
    /// # Panics
    /// Panics before [`fix_insertion_metrics`][Self::fix_insertion_metrics]
    /// has been called.
    pub fn insertion_metrics(&self) -> &Metrics {
        self.insertion
            .as_ref()
            .expect("insertion metrics have not been fixed yet")
    }

    /// Freeze the current metrics as the insertion snapshot.
    ///
    /// # Panics
    /// Panics when called a second time.
    pub fn fix_insertion_metrics(&mut self) {
        assert!(
            self.insertion.is_none(),
            "insertion metrics are already fixed"
        );
        self.insertion = Some(self.current);
    }

    /// # Panics
    /// Panics when called a second time.
    pub fn set_diff_insertion_metrics(&mut self, diff: Metrics) {
        assert!(
            self.diff_insertion.is_none(),
            "diff insertion metrics are already set"
        );
        self.diff_insertion = Some(diff);
    }

    #[inline]
    pub fn has_diff_insertion_metrics(&self) -> bool {
        self.diff_insertion.is_some()
    }

    /// The snapshot bids are ranked by.
    ///
    /// # Panics
    /// Panics before the diff-insertion metrics are set.
    pub fn auction_metrics(&self) -> &Metrics {
        self.diff_insertion
            .as_ref()
            .expect("diff insertion metrics have not been set yet")
    }
}
