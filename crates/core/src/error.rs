//! Error types for the recommendation engine
//!
//! One caller-facing taxonomy is used across all crates. The type is `Clone`
//! because the single-flight cache hands the same failure to every waiter of
//! a failed computation; variants therefore carry strings rather than
//! non-clonable sources.

use crate::types::ProductId;
use thiserror::Error;

/// Result type alias for recommendation operations
pub type RecoResult<T> = std::result::Result<T, RecoError>;

/// Error taxonomy for recommendation operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecoError {
    /// The subject product has no vector in the queried store
    #[error("no vector for product {0}")]
    NotFound(ProductId),

    /// Malformed request (empty text, unknown kind, zero-length vector, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vector length differs from the store's fixed dimensionality
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality fixed by the store's first upsert
        expected: usize,
        /// Length of the rejected vector
        got: usize,
    },

    /// The embedding provider exhausted its retry budget
    #[error("embedding provider unavailable after {attempts} attempts: {last}")]
    ProviderUnavailable {
        /// Attempts made before giving up
        attempts: u32,
        /// Last underlying cause, as text
        last: String,
    },

    /// The rerank provider failed
    ///
    /// Read paths never surface this to callers; they fall back to the
    /// pre-rerank ordering instead.
    #[error("rerank provider unavailable: {0}")]
    RerankUnavailable(String),

    /// Internal invariant violation or infrastructure failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecoError {
    /// True for failures a caller may meaningfully retry later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RecoError::ProviderUnavailable { .. }
                | RecoError::RerankUnavailable(_)
                | RecoError::Internal(_)
        )
    }
}
