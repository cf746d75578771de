use amr_core::{Duration, Position};
use amr_model::FunctionalityKind;
use thiserror::Error;

/// Local argument faults of the cost oracle.  All of these are caller
/// errors, surfaced as values — infeasibility of a *schedule* is a different
/// concept and lives in the order-management layer.
#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("functionality {0:?} is not supported by this robot")]
    UnsupportedFunctionality(FunctionalityKind),

    #[error("start position {0} is outside the topology")]
    StartOutsideTopology(Position),

    #[error("destination {0} is outside the topology")]
    DestinationOutsideTopology(Position),

    #[error("robot at {actual} but the action requires being at {expected}")]
    Misplaced { expected: Position, actual: Position },

    #[error("timestamp {timestamp} is before the phase start {phase_start}")]
    TimestampBeforePhase {
        timestamp: Duration,
        phase_start: Duration,
    },

    #[error("a {0} order needs a prior position to start from")]
    NoPriorPosition(&'static str),

    #[error("action order carries no recognized parameter (expected \"load\" or \"unload\")")]
    UnrecognizedAction,

    #[error("navigate legs cannot be split into empty/loaded travel domains")]
    NavigateNotCosted,
}

pub type MobilityResult<T> = Result<T, MobilityError>;
