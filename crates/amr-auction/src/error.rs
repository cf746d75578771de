use amr_core::TaskId;
use amr_flow::FlowError;
use amr_order::OrderError;
use thiserror::Error;

/// Protocol faults.
///
/// Starvation and structural violations are fatal — they propagate out of
/// the run loop.  Recoverable situations (a stale winner notification, an
/// infeasible insertion) never surface here; they are handled in place by
/// rejecting or skipping.
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("no bids received in {0} consecutive bid windows")]
    BidStarvation(u8),

    #[error("no winner responses received in {0} consecutive response windows")]
    WinnerResponseStarvation(u8),

    #[error("a material flow is already being processed")]
    MaterialFlowInFlight,

    #[error("received a bid for already scheduled task {0}")]
    BidForScheduledTask(TaskId),

    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("call for proposal from {0} while its previous auction is still open")]
    DuplicateAuction(String),

    #[error("winner notification from {0}, but no auction with that initiator is known")]
    UnknownAuction(String),

    #[error("accepted the award for task {0} but the commit failed")]
    CommitFailed(TaskId),

    #[error("participant {0} rejected a central assignment")]
    AssignmentRejected(String),

    #[error("no capable participant for task {0}")]
    NoCapableParticipant(TaskId),

    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Flow(#[from] FlowError),
}

pub type AuctionResult<T> = Result<T, AuctionError>;
