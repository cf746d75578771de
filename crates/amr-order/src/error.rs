use amr_core::Duration;
use amr_mobility::MobilityError;
use thiserror::Error;

/// Argument faults of the order-management layer.
///
/// Infeasibility is *not* an error: `can_add_task`/`add_task` return
/// `Ok(false)` and leave state untouched when the STN rejects a schedule.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("task has no orders")]
    EmptyTask,

    #[error("time origin may not move backwards (now {now}, requested {requested})")]
    TimeBackwards { now: Duration, requested: Duration },

    #[error("only transport orders may start a task")]
    TaskMustStartWithTransport,

    #[error(transparent)]
    Mobility(#[from] MobilityError),
}

pub type OrderResult<T> = Result<T, OrderError>;
