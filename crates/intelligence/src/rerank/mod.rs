//! Re-ranking gateway
//!
//! An optional second ranking stage: after a primary source (vector
//! similarity, co-purchase counts) produces candidates, a model scores each
//! candidate's relevance to the subject and the scores are blended back into
//! the list. One API call scores all candidates, keeping latency bounded to
//! a single round-trip.
//!
//! The output of blending is always a permutation of the input candidates -
//! reranking never adds or drops items. Callers degrade gracefully: on any
//! rerank failure they keep the original ordering.

pub mod api;
pub mod blend;
pub mod mock;
pub mod prompt;

pub use api::ApiReranker;
pub use blend::{blend_candidates, DEFAULT_RERANK_ALPHA};
pub use mock::{FailingReranker, MockReranker};

use reco_core::RecoError;
use thiserror::Error;

/// A relevance score assigned by the reranker to a candidate
#[derive(Debug, Clone, PartialEq)]
pub struct RerankScore {
    /// Index into the original candidate list (0-based position)
    pub index: usize,
    /// Normalized relevance score in [0.0, 1.0]
    pub relevance_score: f32,
}

/// Errors from the rerank gateway
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RerankError {
    /// HTTP request failed (network unreachable, connection refused, ...)
    #[error("network error: {0}")]
    Network(String),
    /// Model responded but no valid scores could be parsed
    #[error("parse error: {0}")]
    Parse(String),
    /// Model request timed out
    #[error("rerank request timed out")]
    Timeout,
}

impl From<RerankError> for RecoError {
    fn from(err: RerankError) -> Self {
        RecoError::RerankUnavailable(err.to_string())
    }
}

/// Capability: score candidate relevance to a subject
///
/// `summaries` contains `(original_index, summary_text)` pairs describing
/// each candidate. Returned scores map back to original indices; a
/// candidate may be missing from the result (the blend keeps its primary
/// score then). Object-safe for use as `Arc<dyn Reranker>`.
pub trait Reranker: Send + Sync {
    /// Score each candidate's relevance to the subject description
    fn rerank(
        &self,
        subject: &str,
        summaries: &[(usize, &str)],
    ) -> Result<Vec<RerankScore>, RerankError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rerank_error_maps_into_reco_error() {
        let err: RecoError = RerankError::Timeout.into();
        assert!(matches!(err, RecoError::RerankUnavailable(_)));
    }

    #[test]
    fn test_rerank_score_fields() {
        let score = RerankScore {
            index: 3,
            relevance_score: 0.85,
        };
        assert_eq!(score.index, 3);
        assert!((score.relevance_score - 0.85).abs() < f32::EPSILON);
    }
}
