//! Shared HTTP client for OpenAI-compatible model endpoints
//!
//! One place for agent construction, auth headers, response extraction, and
//! error classification, shared by the embedding and rerank gateways.

use thiserror::Error;

/// Errors from calling an external model endpoint
#[derive(Debug, Clone, Error)]
pub enum LlmClientError {
    /// HTTP request failed (network unreachable, connection refused, 5xx, ...)
    #[error("network error: {0}")]
    Network(String),
    /// Provider responded but the body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),
    /// Request exceeded the configured timeout
    #[error("model request timed out")]
    Timeout,
}

impl LlmClientError {
    /// True for failures worth retrying (connectivity, timeout, rate limit)
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmClientError::Network(_) | LlmClientError::Timeout)
    }
}

fn send_json(
    url: &str,
    api_key: Option<&str>,
    timeout: std::time::Duration,
    body: &serde_json::Value,
) -> Result<serde_json::Value, LlmClientError> {
    let body_bytes = serde_json::to_vec(body)
        .map_err(|e| LlmClientError::Parse(format!("failed to serialize request: {}", e)))?;

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let mut request = agent.post(url).header("Content-Type", "application/json");
    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {}", key));
    }

    let mut response = request.send(&body_bytes[..]).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("timed out") || msg.contains("Timeout") {
            LlmClientError::Timeout
        } else {
            LlmClientError::Network(msg)
        }
    })?;

    let response_text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| LlmClientError::Network(format!("failed to read response: {}", e)))?;

    serde_json::from_str(&response_text)
        .map_err(|e| LlmClientError::Parse(format!("invalid JSON response: {}", e)))
}

/// Call a chat completions endpoint and extract `choices[0].message.content`.
pub fn call_chat_completions(
    url: &str,
    api_key: Option<&str>,
    timeout: std::time::Duration,
    body: &serde_json::Value,
) -> Result<String, LlmClientError> {
    let json = send_json(url, api_key, timeout, body)?;

    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            LlmClientError::Parse(format!(
                "unexpected chat response shape: {}",
                preview(&json)
            ))
        })?;

    Ok(content.to_string())
}

/// Call an embeddings endpoint and extract one vector per input.
///
/// Expects the OpenAI shape `{"data": [{"index": N, "embedding": [...]}]}`.
/// Entries are re-ordered by `index` so the output is order-preserving
/// regardless of how the provider orders its response, and the count must
/// match `expected` - a provider returning partial results is a parse error,
/// never a partial success.
pub fn call_embeddings(
    url: &str,
    api_key: Option<&str>,
    timeout: std::time::Duration,
    body: &serde_json::Value,
    expected: usize,
) -> Result<Vec<Vec<f32>>, LlmClientError> {
    let json = send_json(url, api_key, timeout, body)?;

    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| {
            LlmClientError::Parse(format!(
                "unexpected embeddings response shape: {}",
                preview(&json)
            ))
        })?;

    let mut vectors: Vec<Option<Vec<f32>>> = vec![None; expected];
    for entry in data {
        let index = entry
            .get("index")
            .and_then(|i| i.as_u64())
            .ok_or_else(|| LlmClientError::Parse("embedding entry missing index".to_string()))?
            as usize;
        let embedding = entry
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| LlmClientError::Parse("embedding entry missing vector".to_string()))?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| LlmClientError::Parse("non-numeric embedding component".to_string()))?;

        if index >= expected {
            return Err(LlmClientError::Parse(format!(
                "embedding index {} out of range (expected {} inputs)",
                index, expected
            )));
        }
        vectors[index] = Some(embedding);
    }

    vectors
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| LlmClientError::Parse(format!("no embedding returned for input {}", i)))
        })
        .collect()
}

fn preview(json: &serde_json::Value) -> String {
    json.to_string().chars().take(200).collect()
}
