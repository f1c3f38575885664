//! ActivityLedger: per-user recency-ordered view history
//!
//! Each user holds a deduplicated sequence of (product, last_seen_at)
//! entries, most-recent-first. A repeat view promotes the existing entry to
//! the front with the new timestamp - at most one entry per (user, product).
//! The sequence is capped; the oldest entry is evicted first.
//!
//! ## Thread Safety
//!
//! Per-user operations are linearized through the `DashMap` entry guard:
//! concurrent `record` calls for the same user serialize, while different
//! users proceed independently.

use dashmap::DashMap;
use reco_core::{ProductId, Timestamp, UserId};
use std::collections::VecDeque;
use tracing::debug;

/// One remembered view
#[derive(Debug, Clone, PartialEq)]
pub struct SeenEntry {
    /// Viewed product
    pub product: ProductId,
    /// Timestamp of the most recent view
    pub last_seen_at: Timestamp,
}

/// Per-user capped, deduplicated recency history
pub struct ActivityLedger {
    histories: DashMap<UserId, VecDeque<SeenEntry>>,
    /// Maximum retained entries per user
    cap: usize,
}

/// Default retained history length per user
pub const DEFAULT_HISTORY_CAP: usize = 50;

impl ActivityLedger {
    /// Create a ledger with the default per-user cap
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_HISTORY_CAP)
    }

    /// Create a ledger with an explicit per-user cap (minimum 1)
    pub fn with_cap(cap: usize) -> Self {
        Self {
            histories: DashMap::new(),
            cap: cap.max(1),
        }
    }

    /// Record a view: insert or promote (user, product) to the front
    ///
    /// A repeat view updates the timestamp and moves the entry to the most
    /// recent position. If the cap is exceeded the oldest entry is evicted.
    pub fn record(&self, user: &UserId, product: &ProductId, at: Timestamp) {
        let mut history = self.histories.entry(user.clone()).or_default();

        if let Some(pos) = history.iter().position(|e| &e.product == product) {
            history.remove(pos);
        }
        history.push_front(SeenEntry {
            product: product.clone(),
            last_seen_at: at,
        });
        while history.len() > self.cap {
            history.pop_back();
        }

        debug!(
            target: "reco::stores::activity",
            user = %user,
            product = %product,
            len = history.len(),
            "view recorded"
        );
    }

    /// Up to `limit` entries, most-recent-first, unique by product
    ///
    /// An unknown user yields an empty sequence, not an error.
    pub fn last_seen(&self, user: &UserId, limit: usize) -> Vec<SeenEntry> {
        self.histories
            .get(user)
            .map(|h| h.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of users with any history
    pub fn user_count(&self) -> usize {
        self.histories.len()
    }
}

impl Default for ActivityLedger {
    fn default() -> Self {
        Self::new()
    }
}
