use amr_core::TaskId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("task {0} appears more than once in the material flow")]
    DuplicateTask(TaskId),

    #[error("task {task} references unknown predecessor {predecessor}")]
    UnknownPredecessor { task: TaskId, predecessor: TaskId },

    #[error("the material flow contains a precedence cycle")]
    Cyclic,

    #[error("task {0} has no orders")]
    EmptyTask(TaskId),
}

pub type FlowResult<T> = Result<T, FlowError>;
