//! Ranking output types
//!
//! Every compute path produces a [`RankedList`]: an ordered, deduplicated,
//! capped sequence of scored candidates. Score semantics depend on the stage
//! that produced the list (cosine similarity, association count, purchase
//! count); ordering and tie-break rules are uniform:
//!
//! 1. Sort by score descending
//! 2. Break ties by product id ascending (deterministic results)
//! 3. Deduplicate by product id, first occurrence wins
//! 4. Truncate to the requested limit

use crate::types::ProductId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A scored product produced during a ranking stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The recommended product
    pub product: ProductId,
    /// Stage-dependent score (similarity, association weight, count, ...)
    pub score: f32,
}

impl Candidate {
    /// Create a candidate
    pub fn new(product: impl Into<ProductId>, score: f32) -> Self {
        Self {
            product: product.into(),
            score,
        }
    }
}

/// Compare candidates by score descending, product id ascending
///
/// NaN scores compare equal to everything, falling through to the id
/// tie-break so ordering stays total and deterministic.
pub fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.product.cmp(&b.product))
}

/// Ordered, deduplicated, capped sequence of candidates
///
/// Immutable once cached: the cache clones lists out, never hands out
/// mutable access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RankedList {
    items: Vec<Candidate>,
}

impl RankedList {
    /// Empty list
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a list by ranking arbitrary candidates
    ///
    /// Sorts (score desc, id asc), deduplicates by product id keeping the
    /// first occurrence after the sort, and truncates to `limit`.
    pub fn ranked(candidates: Vec<Candidate>, limit: usize) -> Self {
        let mut items = candidates;
        items.sort_by(rank_order);
        Self::sequenced(items, limit)
    }

    /// Build a list preserving the given order
    ///
    /// Used for recency lists (last-seen) where the input order is the
    /// contract and must not be re-sorted. Still deduplicates and caps.
    pub fn sequenced(candidates: Vec<Candidate>, limit: usize) -> Self {
        let mut seen: HashSet<ProductId> = HashSet::with_capacity(candidates.len());
        let mut items = Vec::with_capacity(limit.min(candidates.len()));
        for candidate in candidates {
            if items.len() >= limit {
                break;
            }
            if seen.insert(candidate.product.clone()) {
                items.push(candidate);
            }
        }
        Self { items }
    }

    /// Candidates in rank order
    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    /// Consume the list, returning its candidates
    pub fn into_items(self) -> Vec<Candidate> {
        self.items
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list holds no candidates
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the list contains the given product
    pub fn contains(&self, product: &ProductId) -> bool {
        self.items.iter().any(|c| &c.product == product)
    }

    /// Product ids in rank order
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|c| c.product.clone()).collect()
    }
}
