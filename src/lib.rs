//! Reco - Embedded product-recommendation engine
//!
//! Reco serves product recommendations (similar, complementary, cross-sell,
//! top-sales, last-seen) by combining vector-embedding similarity, co-purchase
//! association mining, recency-ordered activity tracking, and a cache-aside
//! layer with single-flight computation.
//!
//! # Quick Start
//!
//! ```ignore
//! use reco::{
//!     EngineBuilder, MockEmbedder, RecoConfig, RecoKind, RecoRequest,
//!     Timestamp, ViewEvent,
//! };
//!
//! let engine = EngineBuilder::new(RecoConfig::default())
//!     .embedder(std::sync::Arc::new(MockEmbedder::new(16)))
//!     .build();
//!
//! engine.record_view(ViewEvent::new("u1", "p1", Timestamp::now()));
//! let recs = engine.recommend(&RecoRequest::last_seen("u1", 10))?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`RecommendationEngine`], which dispatches
//! per recommendation kind to the underlying stores and gateways. The engine
//! owns its collaborators explicitly - there are no ambient globals.
//!
//! Internal store and gateway crates are re-exported through the engine
//! surface; most applications only need this crate.

// Re-export the public API from reco-engine
pub use reco_engine::*;
