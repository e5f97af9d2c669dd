//! Error handling module
//!
//! Centralized error type for engine operations.

use crate::domain::DomainError;
use crate::storage::StorageError;

/// Engine-wide Result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error types
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    // Business outcomes: recorded on the transaction, never retried
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Persistence failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Submission attempted after the pool shut down
    #[error("transaction queue is closed")]
    QueueClosed,
}

impl EngineError {
    /// Whether this is a business outcome (the submission's fault) rather
    /// than an infrastructure fault.
    pub fn is_business_failure(&self) -> bool {
        matches!(self, EngineError::Domain(_))
    }
}
