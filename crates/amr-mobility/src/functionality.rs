//! The atomic operations a robot executes.

use amr_core::Position;
use amr_model::FunctionalityKind;
use serde::{Deserialize, Serialize};

/// One atomic robot operation.
///
/// `Load`/`Unload` carry the position the handover happens at so the physical
/// layer (and the positioning check of the oracle) can verify the robot is
/// standing in the right place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Functionality {
    MoveTo { destination: Position },
    Load { destination: Position },
    Unload { destination: Position },
    Navigate { waypoints: Vec<Position> },
}

impl Functionality {
    #[inline]
    pub fn kind(&self) -> FunctionalityKind {
        match self {
            Functionality::MoveTo { .. } => FunctionalityKind::MoveTo,
            Functionality::Load { .. } => FunctionalityKind::Load,
            Functionality::Unload { .. } => FunctionalityKind::Unload,
            Functionality::Navigate { .. } => FunctionalityKind::Navigate,
        }
    }

    /// Where the robot ends up after executing this functionality, if it
    /// moves at all.
    pub fn end_position(&self) -> Option<Position> {
        match self {
            Functionality::MoveTo { destination } => Some(*destination),
            Functionality::Navigate { waypoints } => waypoints.last().copied(),
            Functionality::Load { .. } | Functionality::Unload { .. } => None,
        }
    }
}
