//! Relative time windows anchored to a spawn instant.
//!
//! A material flow is authored with windows *relative* to its own start
//! ("finish within 90 s").  When the flow enters the system the scheduler
//! stamps the spawn time, after which the absolute accessors are usable.

use amr_core::Duration;
use serde::{Deserialize, Serialize};

/// `[earliest_start, latest_finish]`, both relative to the spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest_start: Duration,
    latest_finish: Duration,
    spawn_time: Option<Duration>,
}

impl TimeWindow {
    pub fn new(earliest_start: Duration, latest_finish: Duration) -> Self {
        Self {
            earliest_start,
            latest_finish,
            spawn_time: None,
        }
    }

    #[inline]
    pub fn relative_earliest_start(&self) -> Duration {
        self.earliest_start
    }

    #[inline]
    pub fn relative_latest_finish(&self) -> Duration {
        self.latest_finish
    }

    #[inline]
    pub fn has_spawn_time(&self) -> bool {
        self.spawn_time.is_some()
    }

    pub fn set_spawn_time(&mut self, spawn_time: Duration) {
        self.spawn_time = Some(spawn_time);
    }

    /// Absolute earliest start.
    ///
    /// # Panics
    /// Panics if the spawn time has not been set — scheduling a window that
    /// was never anchored is a programming error.
    pub fn absolute_earliest_start(&self) -> Duration {
        self.spawn_time.expect("time window has no spawn time") + self.earliest_start
    }

    /// Absolute latest finish.
    ///
    /// # Panics
    /// Panics if the spawn time has not been set.
    pub fn absolute_latest_finish(&self) -> Duration {
        self.spawn_time.expect("time window has no spawn time") + self.latest_finish
    }
}
