// Error taxonomy for store operations

use thiserror::Error;

/// Errors reported by `TaskStore` operations
///
/// None of these are fatal; each leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// `add` was called with blank text
    #[error("task text cannot be empty")]
    EmptyInput,

    /// No task has this id
    #[error("task not found: {0}")]
    NotFound(i64),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
