use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A conditional write observed state newer than the caller's snapshot.
    /// Nothing was applied.
    #[error("stale state: {0}")]
    Precondition(String),

    #[error("multi-aggregate transactions unavailable")]
    TransactionsUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}
