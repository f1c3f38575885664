//! Embedding gateway
//!
//! Texts in, vectors out - order-preserving, one vector per input.
//! [`ApiEmbedder`] talks to an OpenAI-compatible `/embeddings` endpoint with
//! batching and retries; [`MockEmbedder`] produces deterministic vectors for
//! tests.

pub mod api;
pub mod mock;

pub use api::{ApiEmbedder, DEFAULT_EMBED_BATCH};
pub use mock::MockEmbedder;

use reco_core::RecoError;
use thiserror::Error;

/// Errors from the embedding gateway
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmbedError {
    /// Malformed input (blank text); never retried
    #[error("invalid embedding input: {0}")]
    InvalidInput(String),

    /// Provider failed after exhausting the retry budget
    #[error("embedding provider unavailable after {attempts} attempts: {last}")]
    ProviderUnavailable {
        /// Attempts made before giving up
        attempts: u32,
        /// Last underlying cause, as text
        last: String,
    },
}

impl From<EmbedError> for RecoError {
    fn from(err: EmbedError) -> Self {
        match err {
            EmbedError::InvalidInput(msg) => RecoError::InvalidInput(msg),
            EmbedError::ProviderUnavailable { attempts, last } => {
                RecoError::ProviderUnavailable { attempts, last }
            }
        }
    }
}

/// Capability: given texts, return one vector per text, order-preserving
///
/// Object-safe so engines hold `Arc<dyn Embedder>`.
pub trait Embedder: Send + Sync {
    /// Embed every text; all-or-nothing (no partial results)
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}
