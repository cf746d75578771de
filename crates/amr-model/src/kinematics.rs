//! Trapezoidal motion parameters.

use serde::{Deserialize, Serialize};

/// The kinematic envelope of a robot: it accelerates at `max_acceleration`
/// from rest, cruises at `max_velocity`, and brakes at `max_deceleration`.
///
/// `max_deceleration` is stored *negative* (it points against the motion);
/// use [`deceleration_magnitude`][Self::deceleration_magnitude] in formulas
/// that expect a positive braking rate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrKinematics {
    max_velocity: f64,
    min_velocity: f64,
    max_acceleration: f64,
    max_deceleration: f64,
}

impl AmrKinematics {
    /// # Panics
    /// Panics in debug mode unless `max_velocity > 0`,
    /// `max_acceleration > 0` and `max_deceleration < 0`.
    pub fn new(
        max_velocity: f64,
        min_velocity: f64,
        max_acceleration: f64,
        max_deceleration: f64,
    ) -> Self {
        debug_assert!(max_velocity > 0.0, "max_velocity must be positive");
        debug_assert!(max_acceleration > 0.0, "max_acceleration must be positive");
        debug_assert!(max_deceleration < 0.0, "max_deceleration must be negative");
        Self {
            max_velocity,
            min_velocity,
            max_acceleration,
            max_deceleration,
        }
    }

    #[inline]
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    #[inline]
    pub fn min_velocity(&self) -> f64 {
        self.min_velocity
    }

    #[inline]
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    /// The signed braking rate (negative).
    #[inline]
    pub fn max_deceleration(&self) -> f64 {
        self.max_deceleration
    }

    /// `|max_deceleration|` for use in the trapezoid formulas.
    #[inline]
    pub fn deceleration_magnitude(&self) -> f64 {
        self.max_deceleration.abs()
    }
}
