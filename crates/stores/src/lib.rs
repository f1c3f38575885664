//! Shared in-process stores for the recommendation engine
//!
//! Four process-wide structures, each internally responsible for safe
//! concurrent mutation:
//!
//! - **VectorStore**: product vectors + deterministic cosine nearest-neighbor
//! - **CoPurchaseGraph**: monotonic co-purchase edge counters
//! - **ActivityLedger**: per-user capped, deduplicated recency history
//! - **SalesAggregator**: fixed-window purchase counts
//!
//! All are mutated only through their own write operations; read paths never
//! mutate. No store takes a caller-held lock across a call into another
//! store, which keeps the components deadlock-free by construction.

#![warn(clippy::all)]

pub mod activity;
pub mod copurchase;
pub mod sales;
pub mod vector;

pub use activity::ActivityLedger;
pub use copurchase::CoPurchaseGraph;
pub use sales::SalesAggregator;
pub use vector::{cosine_similarity, VectorStore};
