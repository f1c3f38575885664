//! CoPurchaseGraph: incremental co-purchase association counts
//!
//! An undirected weighted graph over products. Each completed transaction
//! contributes +1 to every unordered pair within its product set. Edge keys
//! are order-normalized (smaller id first) so (A,B) and (B,A) are the same
//! edge. Counters are monotonic - nothing ever decrements.
//!
//! The graph does NOT deduplicate transactions: recording the same set twice
//! double-counts by contract. Deduplicate upstream by transaction id if the
//! event source is at-least-once.
//!
//! ## Thread Safety
//!
//! Edge increments go through a `DashMap` entry guard, so each per-edge
//! increment is atomic. Concurrent `record` calls for overlapping sets may
//! interleave their per-pair increments; counts are commutative, so no
//! interleaving produces an inconsistent read.

use dashmap::DashMap;
use parking_lot::RwLock;
use reco_core::{Candidate, ProductId, RankedList};
use std::collections::BTreeSet;
use tracing::debug;

/// Order-normalized undirected edge key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey(ProductId, ProductId);

impl EdgeKey {
    /// Normalize so the lexicographically smaller id comes first
    fn new(a: &ProductId, b: &ProductId) -> Self {
        if a <= b {
            EdgeKey(a.clone(), b.clone())
        } else {
            EdgeKey(b.clone(), a.clone())
        }
    }
}

/// Incremental co-purchase association graph
#[derive(Default)]
pub struct CoPurchaseGraph {
    /// Edge counters, keyed by normalized pair
    edges: DashMap<EdgeKey, u64>,
    /// Neighbor index per product; BTreeSet keeps read order deterministic
    neighbors: DashMap<ProductId, RwLock<BTreeSet<ProductId>>>,
}

impl CoPurchaseGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed transaction's product set
    ///
    /// Increments every unordered pair within the set by 1. Sets with fewer
    /// than two distinct products contribute nothing.
    pub fn record(&self, products: &BTreeSet<ProductId>) {
        if products.len() < 2 {
            return;
        }

        let items: Vec<&ProductId> = products.iter().collect();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                *self.edges.entry(EdgeKey::new(a, b)).or_insert(0) += 1;
                self.link(a, b);
                self.link(b, a);
            }
        }

        debug!(
            target: "reco::stores::copurchase",
            products = products.len(),
            pairs = items.len() * (items.len() - 1) / 2,
            "co-purchase recorded"
        );
    }

    fn link(&self, from: &ProductId, to: &ProductId) {
        self.neighbors
            .entry(from.clone())
            .or_insert_with(|| RwLock::new(BTreeSet::new()))
            .write()
            .insert(to.clone());
    }

    /// Up to k products most often purchased together with `product`
    ///
    /// Ranked by edge count descending, ties broken by product id ascending.
    /// A product with no recorded edges yields an empty list, not an error.
    pub fn cross_sell(&self, product: &ProductId, k: usize) -> RankedList {
        let Some(neighbor_set) = self.neighbors.get(product) else {
            return RankedList::empty();
        };

        // Snapshot the neighbor ids before touching the edge map so no lock
        // is held across the counter reads.
        let ids: Vec<ProductId> = neighbor_set.read().iter().cloned().collect();
        drop(neighbor_set);

        let candidates: Vec<Candidate> = ids
            .into_iter()
            .map(|id| {
                let count = self.edge_count(product, &id);
                Candidate::new(id, count as f32)
            })
            .collect();

        RankedList::ranked(candidates, k)
    }

    /// Times `a` and `b` were purchased in the same transaction
    pub fn edge_count(&self, a: &ProductId, b: &ProductId) -> u64 {
        self.edges
            .get(&EdgeKey::new(a, b))
            .map(|e| *e)
            .unwrap_or(0)
    }

    /// Distinct products `product` has ever co-occurred with
    pub fn neighbor_count(&self, product: &ProductId) -> usize {
        self.neighbors
            .get(product)
            .map(|set| set.read().len())
            .unwrap_or(0)
    }

    /// Total distinct edges recorded
    pub fn edge_total(&self) -> usize {
        self.edges.len()
    }
}
