use rust_decimal::Decimal;
use thiserror::Error;

/// Caller-facing outcome taxonomy for every engine command.
///
/// All variants except `Invariant` are expected, recoverable rejections
/// surfaced to the originating caller. `Invariant` marks an internal
/// consistency failure that should be unreachable; the triggering command
/// aborts without mutating state and the condition is logged for operator
/// attention. The engine never retries on its own: the admissible bid
/// amount can change between attempts, so every retry decision belongs to
/// the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuctionError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient funds: budget {budget}, required {required}")]
    InsufficientFunds { budget: Decimal, required: Decimal },

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl AuctionError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether resubmitting the same command against fresh state can
    /// plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
