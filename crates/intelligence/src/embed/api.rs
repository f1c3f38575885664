//! API-based embedder against an OPENAI-compatible `/embeddings` endpoint
//!
//! Oversized requests are split into sequential sub-batches of at most
//! `max_batch` texts; every sub-batch must succeed for the call to succeed.
//! Transient failures (timeout, connectivity) retry per the injected
//! [`RetryPolicy`]; malformed input is rejected up front and never retried.

use super::{EmbedError, Embedder};
use crate::llm_client::{self, LlmClientError};
use crate::retry::RetryPolicy;
use tracing::{debug, info};

/// Default maximum texts per provider call
pub const DEFAULT_EMBED_BATCH: usize = 64;

/// Embedder that calls an OpenAI-compatible embeddings endpoint
///
/// Works with Ollama, vLLM, llama.cpp server, OpenAI, and other compatible
/// providers.
pub struct ApiEmbedder {
    /// Full URL to the embeddings endpoint
    url: String,
    /// Model name to request
    model: String,
    /// Optional bearer token
    api_key: Option<String>,
    /// Request timeout
    timeout: std::time::Duration,
    /// Maximum texts per call; larger requests are split
    max_batch: usize,
    /// Backoff policy for transient failures
    retry: RetryPolicy,
}

impl ApiEmbedder {
    /// Create a new ApiEmbedder.
    ///
    /// `endpoint` should be the base URL (e.g. "http://localhost:11434/v1").
    /// The `/embeddings` path is appended automatically.
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            url: format!("{}/embeddings", base),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: std::time::Duration::from_millis(timeout_ms),
            max_batch: DEFAULT_EMBED_BATCH,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the maximum batch size (minimum 1)
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(1);
        self
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        self.retry
            .run_blocking(
                "embed",
                || {
                    llm_client::call_embeddings(
                        &self.url,
                        self.api_key.as_deref(),
                        self.timeout,
                        &body,
                        texts.len(),
                    )
                },
                LlmClientError::is_transient,
            )
            .map_err(|failure| EmbedError::ProviderUnavailable {
                attempts: failure.attempts,
                last: failure.error.to_string(),
            })
    }
}

impl Embedder for ApiEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(pos) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(EmbedError::InvalidInput(format!(
                "text at position {} is blank",
                pos
            )));
        }

        let mut vectors = Vec::with_capacity(texts.len());
        let batches = texts.chunks(self.max_batch);
        let batch_total = (texts.len() + self.max_batch - 1) / self.max_batch;
        debug!(
            target: "reco::embed",
            texts = texts.len(),
            batches = batch_total,
            "embedding request"
        );

        // Sequential sub-batches; any failure aborts the whole call so no
        // partial embedding results ever escape.
        for batch in batches {
            vectors.extend(self.embed_batch(batch)?);
        }

        info!(
            target: "reco::embed",
            texts = texts.len(),
            "embedding request complete"
        );
        Ok(vectors)
    }
}
