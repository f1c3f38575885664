//! Deterministic rerankers for tests and offline runs

use super::{RerankError, RerankScore, Reranker};

/// Reranker that scores candidates by reversed position
///
/// The last candidate gets 1.0, the first gets the lowest score. This makes
/// reordering observable in tests without any network dependency.
#[derive(Debug, Default, Clone)]
pub struct MockReranker;

impl MockReranker {
    pub fn new() -> Self {
        Self
    }
}

impl Reranker for MockReranker {
    fn rerank(
        &self,
        _subject: &str,
        summaries: &[(usize, &str)],
    ) -> Result<Vec<RerankScore>, RerankError> {
        let count = summaries.len();
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(summaries
            .iter()
            .enumerate()
            .map(|(pos, (index, _))| RerankScore {
                index: *index,
                relevance_score: (pos + 1) as f32 / count as f32,
            })
            .collect())
    }
}

/// Reranker that always fails with a network error
///
/// Used to exercise the graceful-degradation path: callers must fall back
/// to the primary ordering.
#[derive(Debug, Default, Clone)]
pub struct FailingReranker;

impl FailingReranker {
    pub fn new() -> Self {
        Self
    }
}

impl Reranker for FailingReranker {
    fn rerank(
        &self,
        _subject: &str,
        _summaries: &[(usize, &str)],
    ) -> Result<Vec<RerankScore>, RerankError> {
        Err(RerankError::Network("mock provider down".to_string()))
    }
}
