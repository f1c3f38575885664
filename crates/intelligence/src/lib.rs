//! Model-provider gateways for Reco
//!
//! Wraps the external embedding/LLM provider behind two capability traits:
//!
//! - [`Embedder`]: texts in, vectors out (order-preserving, batched)
//! - [`Reranker`]: candidate list in, relevance scores out
//!
//! Both ship an API implementation against any OpenAI-compatible endpoint
//! (Ollama, vLLM, llama.cpp server, OpenAI, ...) plus deterministic mocks
//! for tests. Retry behavior is a [`RetryPolicy`] value injected at
//! construction, never hardcoded, so backoff schedules are testable with a
//! fake sleeper.

#![warn(clippy::all)]

pub mod embed;
pub mod llm_client;
pub mod rerank;
pub mod retry;

pub use embed::{ApiEmbedder, EmbedError, Embedder, MockEmbedder, DEFAULT_EMBED_BATCH};
pub use llm_client::LlmClientError;
pub use rerank::{
    blend_candidates, ApiReranker, FailingReranker, MockReranker, RerankError, RerankScore,
    Reranker, DEFAULT_RERANK_ALPHA,
};
pub use retry::{RetryFailure, RetryPolicy};
