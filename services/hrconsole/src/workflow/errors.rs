use crate::store::StoreError;
use thiserror::Error;

/// Failure of a workflow operation.
///
/// Authentication failures never reach this type; they are rejected by the
/// HTTP layer before a principal exists.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Role, ownership, or record-status check failed.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Missing record, or a record outside the caller's department.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    /// Status change not allowed from the stored status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => WorkflowError::NotFound(what),
            other => WorkflowError::Store(other),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
