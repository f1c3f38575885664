//! API-based reranker using an OpenAI-compatible chat completions endpoint
//!
//! Sends a single batch prompt with the subject plus candidate summaries,
//! asks the model to score each candidate 0-10, parses scores, and returns
//! normalized results. Retries follow the injected [`RetryPolicy`]; an
//! unparseable (empty-score) response counts as a failed attempt.

use super::{RerankError, RerankScore, Reranker};
use crate::llm_client::{self, LlmClientError};
use crate::retry::RetryPolicy;
use std::time::Duration;
use tracing::debug;

/// Default rerank temperature - deterministic for consistent scoring.
const DEFAULT_RERANK_TEMPERATURE: f32 = 0.0;
/// Default max tokens for rerank responses.
const DEFAULT_RERANK_MAX_TOKENS: u32 = 200;

/// Reranker that calls an OpenAI-compatible chat completions endpoint.
///
/// Works with Ollama, vLLM, llama.cpp server, OpenAI, and other compatible
/// providers.
pub struct ApiReranker {
    /// Full URL to the chat completions endpoint
    url: String,
    /// Model name to request
    model: String,
    /// Optional bearer token
    api_key: Option<String>,
    /// Request timeout
    timeout: Duration,
    /// Sampling temperature (default: 0.0 for deterministic scoring)
    temperature: f32,
    /// Maximum response tokens (default: 200)
    max_tokens: u32,
    /// Backoff policy for failed calls
    retry: RetryPolicy,
}

impl ApiReranker {
    /// Create a new ApiReranker.
    ///
    /// `endpoint` should be the base URL (e.g. "http://localhost:11434/v1").
    /// The `/chat/completions` path is appended automatically.
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            url: format!("{}/chat/completions", base),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            temperature: DEFAULT_RERANK_TEMPERATURE,
            max_tokens: DEFAULT_RERANK_MAX_TOKENS,
            retry: RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(100),
                backoff_multiplier: 1.0,
            },
        }
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the maximum response tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn call_api(&self, subject: &str, summaries: &[(usize, &str)]) -> Result<String, RerankError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": super::prompt::build_rerank_messages(subject, summaries),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        llm_client::call_chat_completions(&self.url, self.api_key.as_deref(), self.timeout, &body)
            .map_err(|e| match e {
                LlmClientError::Timeout => RerankError::Timeout,
                LlmClientError::Network(msg) => RerankError::Network(msg),
                LlmClientError::Parse(msg) => RerankError::Parse(msg),
            })
    }
}

impl Reranker for ApiReranker {
    fn rerank(
        &self,
        subject: &str,
        summaries: &[(usize, &str)],
    ) -> Result<Vec<RerankScore>, RerankError> {
        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        self.retry
            .run_blocking(
                "rerank",
                || {
                    let text = self.call_api(subject, summaries)?;
                    let scores = parse_rerank_response(&text, summaries);
                    if scores.is_empty() {
                        return Err(RerankError::Parse(
                            "model returned no parseable scores".to_string(),
                        ));
                    }
                    debug!(
                        target: "reco::rerank",
                        candidates = summaries.len(),
                        scored = scores.len(),
                        "rerank scores parsed"
                    );
                    Ok(scores)
                },
                // Every rerank failure (including a bad response) is worth
                // one more shot; the list falls back unchanged afterwards.
                |_| true,
            )
            .map_err(|failure| failure.error)
    }
}

/// Parse the model's response text into rerank scores.
///
/// Expects lines like "1: 8" or "2: 5.5". Maps 1-based line numbers back to
/// the original candidate indices. Scores are clamped to [0, 10] and
/// normalized to [0.0, 1.0].
pub fn parse_rerank_response(text: &str, summaries: &[(usize, &str)]) -> Vec<RerankScore> {
    let mut scores = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Parse "N: score" format
        if let Some((num_part, score_part)) = line.split_once(':') {
            if let (Ok(line_num), Ok(raw_score)) = (
                num_part.trim().parse::<usize>(),
                score_part.trim().parse::<f32>(),
            ) {
                // line_num is 1-based, convert to 0-based index into summaries
                if line_num >= 1 && line_num <= summaries.len() {
                    let (orig_index, _) = summaries[line_num - 1];
                    let clamped = raw_score.clamp(0.0, 10.0);
                    scores.push(RerankScore {
                        index: orig_index,
                        relevance_score: clamped / 10.0,
                    });
                }
            }
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_lines() {
        let summaries = vec![(0, "a"), (1, "b"), (2, "c")];
        let scores = parse_rerank_response("1: 8\n2: 5.5\n3: 0", &summaries);
        assert_eq!(scores.len(), 3);
        assert!((scores[0].relevance_score - 0.8).abs() < 1e-6);
        assert!((scores[1].relevance_score - 0.55).abs() < 1e-6);
        assert_eq!(scores[2].relevance_score, 0.0);
    }

    #[test]
    fn test_parse_maps_back_to_original_indices() {
        // summaries carry non-contiguous original indices
        let summaries = vec![(4, "a"), (9, "b")];
        let scores = parse_rerank_response("1: 10\n2: 2", &summaries);
        assert_eq!(scores[0].index, 4);
        assert_eq!(scores[1].index, 9);
    }

    #[test]
    fn test_parse_skips_garbage_and_out_of_range() {
        let summaries = vec![(0, "a"), (1, "b")];
        let text = "nonsense\n0: 5\n3: 5\n2: not-a-number\n1: 7";
        let scores = parse_rerank_response(text, &summaries);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].index, 0);
        assert!((scores[0].relevance_score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_parse_clamps_wild_scores() {
        let summaries = vec![(0, "a"), (1, "b")];
        let scores = parse_rerank_response("1: 99\n2: -3", &summaries);
        assert_eq!(scores[0].relevance_score, 1.0);
        assert_eq!(scores[1].relevance_score, 0.0);
    }

    #[test]
    fn test_empty_summaries_short_circuit() {
        let reranker = ApiReranker::new("http://127.0.0.1:9", "m", None, 50);
        assert_eq!(reranker.rerank("subject", &[]).unwrap(), Vec::new());
    }

    #[test]
    fn test_unreachable_provider_fails_after_retry() {
        let reranker = ApiReranker::new("http://127.0.0.1:9", "m", None, 50).with_retry(
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                backoff_multiplier: 1.0,
            },
        );
        let err = reranker.rerank("subject", &[(0, "a")]).unwrap_err();
        assert!(matches!(err, RerankError::Network(_) | RerankError::Timeout));
    }
}
