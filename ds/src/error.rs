//! Search error types

use dialogstore::StoreError;
use thiserror::Error;

use crate::contiguity::ContiguityError;

/// Errors returned by the query planner
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Dialog not found: {0}")]
    NotFound(i64),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Store returned an inconsistent id list: {0}")]
    InconsistentIds(#[from] ContiguityError),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Check if the caller can fix this error by changing the request
    pub fn is_client_error(&self) -> bool {
        match self {
            SearchError::InvalidRequest(_) | SearchError::NotFound(_) => true,
            SearchError::StoreUnavailable(_) | SearchError::InconsistentIds(_) | SearchError::TaskFailed(_) => false,
        }
    }
}
