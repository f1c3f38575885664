//! Score blending for re-ranking
//!
//! Blends primary ranking scores with reranker relevance scores:
//! `alpha * llm + (1 - alpha) * primary`, where the primary scores are
//! min-max normalized to [0, 1] first so association counts and cosine
//! similarities blend on the same scale.

use super::RerankScore;
use reco_core::{Candidate, RankedList};

/// Default blend weight for the reranker's scores
pub const DEFAULT_RERANK_ALPHA: f32 = 0.75;

/// Blend reranker scores into a ranked list.
///
/// Candidates without a matching reranker score keep their normalized
/// primary score. The output is re-ranked by blended score (descending, ties
/// by product id ascending) and is always a permutation of the input - no
/// candidate is added or dropped.
pub fn blend_candidates(list: RankedList, scores: &[RerankScore], alpha: f32) -> RankedList {
    if list.is_empty() || scores.is_empty() {
        return list;
    }

    let items = list.into_items();
    let len = items.len();

    // Normalize primary scores to [0, 1]
    let max_primary = items.iter().map(|c| c.score).fold(f32::NEG_INFINITY, f32::max);
    let min_primary = items.iter().map(|c| c.score).fold(f32::INFINITY, f32::min);
    let range = max_primary - min_primary;

    let alpha = alpha.clamp(0.0, 1.0);
    let blended: Vec<Candidate> = items
        .into_iter()
        .enumerate()
        .map(|(pos, mut candidate)| {
            let norm_primary = if range > 0.0 {
                (candidate.score - min_primary) / range
            } else {
                1.0 // all same score -> treat as 1.0
            };

            candidate.score = match scores.iter().find(|s| s.index == pos) {
                Some(rerank) => alpha * rerank.relevance_score + (1.0 - alpha) * norm_primary,
                None => norm_primary,
            };
            candidate
        })
        .collect();

    RankedList::ranked(blended, len)
}
