//! Phase records emitted by the phase decomposition.

use amr_core::{Acceleration, Duration, Position, Velocity};
use serde::{Deserialize, Serialize};

/// What the robot is doing during one phase of a motion profile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MobilityState {
    Accelerating,
    ConstSpeedTraveling,
    Decelerating,
    /// Standing still while a load/unload action runs.
    Stationary,
    /// Motion complete; the terminal state of every profile.
    Idle,
}

/// The kinematic state at the *start* of one phase.
///
/// A profile is a sequence of these with non-decreasing timestamps; the state
/// between two phase starts follows from classical kinematics (see
/// [`status_at`][crate::oracle::status_at]).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobilityStatus {
    pub state: MobilityState,
    pub position: Position,
    pub velocity: Velocity,
    pub acceleration: Acceleration,
    /// Absolute time (seconds) at which this phase begins.
    pub timestamp: Duration,
}

impl MobilityStatus {
    /// An idle status at `position` and `timestamp`.
    pub fn idle(position: Position, timestamp: Duration) -> Self {
        Self {
            state: MobilityState::Idle,
            position,
            velocity: Velocity::ZERO,
            acceleration: Acceleration::ZERO,
            timestamp,
        }
    }
}
