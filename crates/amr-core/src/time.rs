//! Simulation time model.
//!
//! # Design
//!
//! The discrete-event harness orders events by an integer millisecond
//! counter, `SimTime`.  Using an integer as the canonical event key means
//! queue ordering is exact (no floating-point tie ambiguity) and comparisons
//! are O(1).
//!
//! Everything *inside* an agent — kinematics, STN arithmetic, metrics — works
//! in f64 seconds ([`Duration`][crate::geo::Duration]).  Conversion happens
//! only where a continuous duration becomes an event delay, and rounds up so
//! an agent never acts before the modelled instant.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::geo::Duration;

/// An absolute simulation instant in milliseconds since the run started.
///
/// Stored as `u64`: at millisecond resolution a u64 lasts ~585 million years,
/// far longer than any conceivable run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(Serialize, Deserialize)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Convert a continuous duration (seconds) to the event instant
    /// `self + secs`, rounding up to the next millisecond.
    ///
    /// # Panics
    /// Panics in debug mode if `secs` is negative or non-finite.
    #[inline]
    pub fn after_secs(self, secs: Duration) -> SimTime {
        debug_assert!(secs.is_finite() && secs >= 0.0, "delay must be non-negative");
        SimTime(self.0 + (secs * 1_000.0).ceil() as u64)
    }

    /// This instant as continuous seconds.
    #[inline]
    pub fn as_secs(self) -> Duration {
        self.0 as f64 / 1_000.0
    }
}

impl Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs_ms: u64) -> SimTime {
        SimTime(self.0 + rhs_ms)
    }
}

impl Sub for SimTime {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: SimTime) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ms", self.0)
    }
}
