//! Engine configuration via `reco.toml`
//!
//! A plain config file instead of a builder forest: on first open a
//! commented default `reco.toml` is written next to the data, and changing
//! settings means editing the file and restarting. [`RecoConfig`] is also a
//! plain value, so embedded callers can construct it directly.

use reco_core::{RecoError, RecoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "reco.toml";

/// Configuration for an external inference model endpoint.
///
/// When present, the engine builder constructs an API embedder and an API
/// reranker against it unless explicit gateways were supplied. Persisted
/// under the `[model]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// OpenAI-compatible API endpoint (e.g. "http://localhost:11434/v1")
    pub endpoint: String,
    /// Model name (e.g. "qwen3:1.7b")
    pub model: String,
    /// Optional API key for authenticated endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Where complementary recommendations come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ComplementarySource {
    /// Complementary-space vectors first, co-purchase graph as fallback
    /// when the product has no complementary vector
    #[default]
    VectorsThenCrossSell,
    /// Complementary-space vectors only
    VectorsOnly,
    /// Co-purchase graph only
    CrossSellOnly,
}

/// Engine configuration loaded from `reco.toml`
///
/// Every field has a default, so an empty file (or `RecoConfig::default()`)
/// yields a working engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoConfig {
    /// Algorithm version tag, part of every cache key. Bumping it cold-starts
    /// the cache without touching stored data.
    #[serde(default = "default_algo_version")]
    pub algo_version: String,
    /// TTL for similar / complementary / cross-sell lists, in seconds
    #[serde(default = "default_product_ttl_secs")]
    pub product_ttl_secs: u64,
    /// TTL for top-sales lists, in seconds
    #[serde(default = "default_top_sales_ttl_secs")]
    pub top_sales_ttl_secs: u64,
    /// Per-user view-history capacity
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Sales window length in seconds
    #[serde(default = "default_sales_window_secs")]
    pub sales_window_secs: u64,
    /// Number of whole past windows counted in addition to the current one
    #[serde(default = "default_sales_active_windows")]
    pub sales_active_windows: u64,
    /// Blend weight for reranker scores (0.0 = ignore reranker, 1.0 = only
    /// reranker)
    #[serde(default = "default_rerank_alpha")]
    pub rerank_alpha: f32,
    /// How long a request waits for another request's in-flight computation
    /// of the same key, in milliseconds
    #[serde(default = "default_cache_wait_timeout_ms")]
    pub cache_wait_timeout_ms: u64,
    /// Complementary recommendation sourcing policy
    #[serde(default)]
    pub complementary_source: ComplementarySource,
    /// Optional model endpoint for embeddings and re-ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
}

fn default_algo_version() -> String {
    "v1".to_string()
}

fn default_product_ttl_secs() -> u64 {
    86_400 // 24h
}

fn default_top_sales_ttl_secs() -> u64 {
    300 // 5min
}

fn default_history_cap() -> usize {
    50
}

fn default_sales_window_secs() -> u64 {
    86_400
}

fn default_sales_active_windows() -> u64 {
    1
}

fn default_rerank_alpha() -> f32 {
    0.75
}

fn default_cache_wait_timeout_ms() -> u64 {
    5000
}

impl Default for RecoConfig {
    fn default() -> Self {
        Self {
            algo_version: default_algo_version(),
            product_ttl_secs: default_product_ttl_secs(),
            top_sales_ttl_secs: default_top_sales_ttl_secs(),
            history_cap: default_history_cap(),
            sales_window_secs: default_sales_window_secs(),
            sales_active_windows: default_sales_active_windows(),
            rerank_alpha: default_rerank_alpha(),
            cache_wait_timeout_ms: default_cache_wait_timeout_ms(),
            complementary_source: ComplementarySource::default(),
            model: None,
        }
    }
}

impl RecoConfig {
    /// TTL for product-subject recommendation lists
    pub fn product_ttl(&self) -> Duration {
        Duration::from_secs(self.product_ttl_secs)
    }

    /// TTL for top-sales lists
    pub fn top_sales_ttl(&self) -> Duration {
        Duration::from_secs(self.top_sales_ttl_secs)
    }

    /// Length of one sales window
    pub fn sales_window(&self) -> Duration {
        Duration::from_secs(self.sales_window_secs)
    }

    /// Bound on follower waits in the single-flight cache
    pub fn cache_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_wait_timeout_ms)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Reco engine configuration
#
# Algorithm version: part of every cache key. Bump to cold-start the cache.
algo_version = "v1"

# Cache TTLs in seconds
product_ttl_secs = 86400     # similar / complementary / cross-sell (24h)
top_sales_ttl_secs = 300     # top-sales (5min)

# Per-user view-history capacity
history_cap = 50

# Sales windowing
sales_window_secs = 86400    # window length (24h)
sales_active_windows = 1     # whole past windows counted beyond the current one

# Reranker blend weight: 0.0 = primary scores only, 1.0 = reranker only
rerank_alpha = 0.75

# Bound on waiting for another request's in-flight computation (milliseconds)
cache_wait_timeout_ms = 5000

# Complementary sourcing: "vectors-then-cross-sell" (default),
# "vectors-only", or "cross-sell-only"
complementary_source = "vectors-then-cross-sell"

# Model endpoint for embeddings and re-ranking.
# Uncomment and configure to enable API-backed vectorization and reranking.
# [model]
# endpoint = "http://localhost:11434/v1"
# model = "qwen3:1.7b"
# api_key = "your-api-key"      # optional
# timeout_ms = 5000              # optional, default 5000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> RecoResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecoError::Internal(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: RecoConfig = toml::from_str(&content).map_err(|e| {
            RecoError::InvalidInput(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> RecoResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                RecoError::Internal(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Load the config from `dir/reco.toml`, creating the default file first
    /// when missing.
    pub fn load_or_create(dir: &Path) -> RecoResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        Self::write_default_if_missing(&path)?;
        Self::from_file(&path)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> RecoResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RecoError::Internal(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            RecoError::Internal(format!(
                "failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    fn validate(&self) -> RecoResult<()> {
        if self.algo_version.is_empty() {
            return Err(RecoError::InvalidInput(
                "algo_version must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.rerank_alpha) {
            return Err(RecoError::InvalidInput(format!(
                "rerank_alpha must be in [0.0, 1.0], got {}",
                self.rerank_alpha
            )));
        }
        if self.sales_window_secs == 0 {
            return Err(RecoError::InvalidInput(
                "sales_window_secs must be positive".to_string(),
            ));
        }
        if self.history_cap == 0 {
            return Err(RecoError::InvalidInput(
                "history_cap must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
