//! VectorStore: dimension-fixed product-vector store
//!
//! ## Design
//!
//! One store per embedding space. Dimensionality is fixed by the first
//! upsert; every later vector must match it. Search is a brute-force scan -
//! sufficient for catalog-scale data, and exactly deterministic:
//!
//! 1. Iterate vectors in product-id order (`BTreeMap` iteration)
//! 2. Compute cosine scores single-threaded
//! 3. Sort by (score desc, product id asc)
//! 4. Truncate to k
//!
//! ## Thread Safety
//!
//! `Send + Sync`; all state sits behind one `parking_lot::RwLock`, so a
//! search sees a consistent snapshot and concurrent upserts serialize.

use parking_lot::RwLock;
use reco_core::{Candidate, ProductId, RankedList, RecoError, RecoResult};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Default)]
struct Inner {
    /// Fixed on first upsert, immutable afterwards
    dimension: Option<usize>,
    /// CRITICAL: BTreeMap for deterministic scan order
    vectors: BTreeMap<ProductId, Vec<f32>>,
}

/// Product-vector store with deterministic cosine search
#[derive(Default)]
pub struct VectorStore {
    inner: RwLock<Inner>,
}

impl VectorStore {
    /// Create an empty store; dimensionality is fixed by the first upsert
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product's vector
    ///
    /// # Errors
    /// - `InvalidInput` for a zero-length vector
    /// - `DimensionMismatch` if the length differs from the store's fixed
    ///   dimensionality
    pub fn upsert(&self, product: ProductId, vector: Vec<f32>) -> RecoResult<()> {
        if vector.is_empty() {
            return Err(RecoError::InvalidInput(
                "vector must not be zero-length".to_string(),
            ));
        }

        let mut inner = self.inner.write();
        match inner.dimension {
            None => inner.dimension = Some(vector.len()),
            Some(expected) if expected != vector.len() => {
                return Err(RecoError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
            Some(_) => {}
        }

        debug!(
            target: "reco::stores::vector",
            product = %product,
            dim = vector.len(),
            "vector upserted"
        );
        inner.vectors.insert(product, vector);
        Ok(())
    }

    /// Up to k nearest neighbors of `product` by cosine similarity
    ///
    /// Excludes the subject itself. Ties are broken by product id ascending.
    ///
    /// # Errors
    /// - `NotFound` if the subject has no vector in this store
    pub fn similar(&self, product: &ProductId, k: usize) -> RecoResult<RankedList> {
        let inner = self.inner.read();
        let subject = inner
            .vectors
            .get(product)
            .ok_or_else(|| RecoError::NotFound(product.clone()))?;

        let mut candidates = Vec::with_capacity(inner.vectors.len().saturating_sub(1));
        for (id, vector) in &inner.vectors {
            if id == product {
                continue;
            }
            candidates.push(Candidate::new(
                id.clone(),
                super::distance::cosine_similarity(subject, vector),
            ));
        }

        debug!(
            target: "reco::stores::vector",
            product = %product,
            scanned = candidates.len(),
            k,
            "similarity scan complete"
        );
        Ok(RankedList::ranked(candidates, k))
    }

    /// The stored vector for a product, if any
    pub fn get(&self, product: &ProductId) -> Option<Vec<f32>> {
        self.inner.read().vectors.get(product).cloned()
    }

    /// True when the product has a vector in this store
    pub fn contains(&self, product: &ProductId) -> bool {
        self.inner.read().vectors.contains_key(product)
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.inner.read().vectors.len()
    }

    /// True when no vectors are stored
    pub fn is_empty(&self) -> bool {
        self.inner.read().vectors.is_empty()
    }

    /// Dimensionality fixed by the first upsert, or None while empty
    pub fn dimension(&self) -> Option<usize> {
        self.inner.read().dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, &[f32])]) -> VectorStore {
        let store = VectorStore::new();
        for (id, v) in entries {
            store.upsert(ProductId::from(*id), v.to_vec()).unwrap();
        }
        store
    }

    #[test]
    fn test_first_upsert_fixes_dimension() {
        let store = VectorStore::new();
        assert_eq!(store.dimension(), None);
        store.upsert(ProductId::from("P1"), vec![1.0, 0.0]).unwrap();
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let store = store_with(&[("P1", &[1.0, 0.0])]);
        let err = store
            .upsert(ProductId::from("P2"), vec![1.0, 0.0, 0.0])
            .unwrap_err();
        assert_eq!(
            err,
            RecoError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_empty_vector_rejected() {
        let store = VectorStore::new();
        assert!(matches!(
            store.upsert(ProductId::from("P1"), vec![]),
            Err(RecoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let store = store_with(&[("P1", &[1.0, 0.0])]);
        store.upsert(ProductId::from("P1"), vec![0.0, 1.0]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ProductId::from("P1")), Some(vec![0.0, 1.0]));
    }

    #[test]
    fn test_similar_unknown_subject_is_not_found() {
        let store = store_with(&[("P1", &[1.0, 0.0])]);
        assert_eq!(
            store.similar(&ProductId::from("ghost"), 5).unwrap_err(),
            RecoError::NotFound(ProductId::from("ghost"))
        );
    }

    #[test]
    fn test_similar_excludes_subject_and_caps() {
        let store = store_with(&[
            ("P1", &[1.0, 0.0]),
            ("P2", &[0.9, 0.1]),
            ("P3", &[0.8, 0.2]),
            ("P4", &[0.0, 1.0]),
        ]);
        let list = store.similar(&ProductId::from("P1"), 2).unwrap();
        assert_eq!(list.len(), 2);
        assert!(!list.contains(&ProductId::from("P1")));
    }

    #[test]
    fn test_similar_identical_then_orthogonal() {
        // {P1:[1,0], P2:[1,0], P3:[0,1]} -> similar(P1, 2) = [P2@1.0, P3@0.0]
        let store = store_with(&[("P1", &[1.0, 0.0]), ("P2", &[1.0, 0.0]), ("P3", &[0.0, 1.0])]);
        let list = store.similar(&ProductId::from("P1"), 2).unwrap();
        assert_eq!(
            list.product_ids(),
            vec![ProductId::from("P2"), ProductId::from("P3")]
        );
        assert!((list.items()[0].score - 1.0).abs() < 1e-6);
        assert!(list.items()[1].score.abs() < 1e-6);
    }

    #[test]
    fn test_similar_ties_break_by_id_ascending() {
        let store = store_with(&[
            ("P1", &[1.0, 0.0]),
            ("PB", &[2.0, 0.0]),
            ("PA", &[3.0, 0.0]),
        ]);
        let list = store.similar(&ProductId::from("P1"), 5).unwrap();
        // Both PA and PB score exactly 1.0 -> id order decides
        assert_eq!(
            list.product_ids(),
            vec![ProductId::from("PA"), ProductId::from("PB")]
        );
    }

    #[test]
    fn test_similar_scores_non_increasing() {
        let store = store_with(&[
            ("P1", &[1.0, 0.0]),
            ("P2", &[0.5, 0.5]),
            ("P3", &[0.0, 1.0]),
            ("P4", &[1.0, 0.1]),
        ]);
        let list = store.similar(&ProductId::from("P1"), 10).unwrap();
        let scores: Vec<f32> = list.items().iter().map(|c| c.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_zero_subject_vector_scores_everything_zero() {
        let store = store_with(&[("P1", &[0.0, 0.0]), ("P2", &[1.0, 0.0])]);
        let list = store.similar(&ProductId::from("P1"), 5).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].score, 0.0);
    }
}
