//! Recommendation engine facade
//!
//! Wires the stores, gateways, and cache into [`RecommendationEngine`] and
//! re-exports the types an application needs, so depending on this crate
//! (or the root facade) is enough.

#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod keys;
pub mod request;
pub mod texts;

pub use config::{ComplementarySource, ModelConfig, RecoConfig, CONFIG_FILE_NAME};
pub use engine::{EngineBuilder, RecommendationEngine};
pub use request::RecoRequest;
pub use texts::embedding_text;

// Re-export the layers below so callers need only one dependency
pub use reco_cache::RecoCache;
pub use reco_core::{
    Candidate, EmbeddingSpace, InMemoryCatalog, Product, ProductCatalog, ProductId, PurchaseEvent,
    PurchaseLine, RankedList, RecoError, RecoKind, RecoResult, Timestamp, TransactionId, UserId,
    ViewEvent,
};
pub use reco_intelligence::{
    ApiEmbedder, ApiReranker, Embedder, EmbedError, FailingReranker, MockEmbedder, MockReranker,
    Reranker, RerankError, RerankScore, RetryPolicy,
};
pub use reco_stores::{ActivityLedger, CoPurchaseGraph, SalesAggregator, VectorStore};
