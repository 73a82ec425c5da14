//! Errors surfaced by the rhythm service.
//!
//! Analysis itself never fails; everything here comes from a collaborator.

use crate::db::RepositoryError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, RhythmError>;

#[derive(Debug, thiserror::Error)]
pub enum RhythmError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The blocking analysis task panicked or was aborted.
    #[error("Analysis task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for RhythmError {
    fn from(err: tokio::task::JoinError) -> Self {
        RhythmError::Task(err.to_string())
    }
}
