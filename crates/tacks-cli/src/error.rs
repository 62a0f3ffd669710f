use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tacks_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Task ID cannot be empty")]
    EmptyTaskId,
    #[error("Task not found for id/prefix: {0}")]
    TaskNotFound(String),
    #[error("{0}")]
    AmbiguousTaskId(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid due date '{0}'; expected YYYY-MM-DD")]
    InvalidDueDate(String),
    #[error(
        "API access is not configured. Set TACKS_API_URL and TACKS_API_TOKEN to reach your board."
    )]
    ApiNotConfigured,
}
