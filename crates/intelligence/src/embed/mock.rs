//! Mock embedder for deterministic testing

use super::{EmbedError, Embedder};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedder that derives vectors from a hash of the text
///
/// The same text always embeds to the same vector, and different texts land
/// in different directions with overwhelming likelihood, which is enough to
/// exercise similarity ranking without a real model.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimensionality
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn component(text: &str, index: usize) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        index.hash(&mut hasher);
        // Map the hash into [-1, 1)
        (hasher.finish() % 2_000) as f32 / 1_000.0 - 1.0
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if let Some(pos) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(EmbedError::InvalidInput(format!(
                "text at position {} is blank",
                pos
            )));
        }
        Ok(texts
            .iter()
            .map(|text| {
                (0..self.dimension)
                    .map(|i| Self::component(text, i))
                    .collect()
            })
            .collect())
    }
}
