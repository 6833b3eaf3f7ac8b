use std::hash::BuildHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::RangeInclusive;

use ahash::RandomState;
use async_trait::async_trait;

use crate::embeddings::Embedder;
use crate::errors::GovRagError;
use crate::errors::Result;

const DIMENSION_RANGE: RangeInclusive<usize> = 8..=4096;

/// Deterministic embedder that hashes lowercase tokens into a fixed-size vector.
///
/// Not a semantic model; it keeps the pipeline usable without a model server
/// as long as the index was built with the same embedder and dimension.
pub struct HashingEmbedder {
    model_name: String,
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn try_new(model_name: impl Into<String>, dimensions: usize) -> Result<Self> {
        if !DIMENSION_RANGE.contains(&dimensions) {
            return Err(GovRagError::ConfigError(format!(
                "hash embedding dimension must be within {}..={}, got {dimensions}",
                DIMENSION_RANGE.start(),
                DIMENSION_RANGE.end()
            )));
        }
        Ok(Self {
            model_name: model_name.into(),
            dimensions,
        })
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
    }

    fn hash_token(token: &str) -> usize {
        // Explicit seeds: an index written by one process must match queries from another
        let mut hasher = RandomState::with_seeds(
            0x6f76_7261_675f_6b30,
            0x6f76_7261_675f_6b31,
            0x6f76_7261_675f_6b32,
            0x6f76_7261_675f_6b33,
        )
        .build_hasher();
        token.hash(&mut hasher);
        hasher.finish() as usize
    }

    /// Embed synchronously; L2-normalised, all zeros for token-free text
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in Self::tokenize(text) {
            vector[Self::hash_token(&token) % self.dimensions] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
