//! SalesAggregator: fixed-window purchase-count ranking
//!
//! Purchases land in fixed-size, non-overlapping windows derived from the
//! event timestamp (`window_index = ts_micros / window_len_micros`). Ranking
//! sums the newest `active_windows` windows relative to the caller-supplied
//! "now", so results are reproducible for a pinned clock.
//!
//! ## Thread Safety
//!
//! Per-product bucket maps are guarded individually; increments for the
//! same product serialize through the `DashMap` entry guard while different
//! products proceed independently.

use dashmap::DashMap;
use reco_core::{Candidate, ProductId, RankedList, Timestamp};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Default window length: one day
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Windowed purchase-count aggregator
pub struct SalesAggregator {
    /// Per product: window index -> units sold
    buckets: DashMap<ProductId, BTreeMap<u64, u64>>,
    window_len_micros: u64,
    /// How many trailing windows (including the current one) rankings cover
    active_windows: u64,
}

impl SalesAggregator {
    /// Create an aggregator with the default 24h window, current window only
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW, 1)
    }

    /// Create an aggregator with an explicit window length and active span
    ///
    /// `active_windows` is clamped to at least 1 (the current window).
    pub fn with_window(window_len: Duration, active_windows: u64) -> Self {
        Self {
            buckets: DashMap::new(),
            window_len_micros: (window_len.as_micros() as u64).max(1),
            active_windows: active_windows.max(1),
        }
    }

    fn window_index(&self, at: Timestamp) -> u64 {
        at.as_micros() / self.window_len_micros
    }

    /// Record a purchase of `quantity` units at `at`
    pub fn record(&self, product: &ProductId, quantity: u32, at: Timestamp) {
        if quantity == 0 {
            return;
        }
        let window = self.window_index(at);
        let mut buckets = self.buckets.entry(product.clone()).or_default();
        *buckets.entry(window).or_insert(0) += u64::from(quantity);

        debug!(
            target: "reco::stores::sales",
            product = %product,
            quantity,
            window,
            "purchase recorded"
        );
    }

    /// Units sold for `product` across the active windows at `now`
    pub fn total_for(&self, product: &ProductId, now: Timestamp) -> u64 {
        let current = self.window_index(now);
        let oldest = current.saturating_sub(self.active_windows - 1);
        self.buckets
            .get(product)
            .map(|b| b.range(oldest..=current).map(|(_, count)| count).sum())
            .unwrap_or(0)
    }

    /// Up to k best sellers across the active windows at `now`
    ///
    /// Ranked by count descending, ties broken by product id ascending.
    pub fn top_sales(&self, k: usize, now: Timestamp) -> RankedList {
        let current = self.window_index(now);
        let oldest = current.saturating_sub(self.active_windows - 1);

        let candidates: Vec<Candidate> = self
            .buckets
            .iter()
            .filter_map(|entry| {
                let total: u64 = entry
                    .value()
                    .range(oldest..=current)
                    .map(|(_, count)| count)
                    .sum();
                (total > 0).then(|| Candidate::new(entry.key().clone(), total as f32))
            })
            .collect();

        RankedList::ranked(candidates, k)
    }

    /// Number of products with any recorded sales (any window)
    pub fn product_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Default for SalesAggregator {
    fn default() -> Self {
        Self::new()
    }
}
