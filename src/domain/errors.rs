//! Domain errors for the hackathon coordinator.

use thiserror::Error;

use super::models::{TaskId, TaskStatus};

/// Domain-level errors raised by the task store and coordinator.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invalid state transition for task {task_id} from {from} to {to}")]
    InvalidStateTransition {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Agent {agent} failed to respond: {reason}")]
    AgentFailed { agent: String, reason: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
