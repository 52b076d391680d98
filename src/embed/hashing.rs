//! Deterministic local embedder based on signed feature hashing

use super::{EmbedError, EmbedResult, Embedder};
use async_trait::async_trait;
use regex::Regex;
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Hashes lower-cased word tokens into a fixed number of buckets.
///
/// Output is L2-normalized; text without tokens maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    token: Regex,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> EmbedResult<Self> {
        if dimensions == 0 {
            return Err(EmbedError::ConfigError(
                "embedding dimensions must be positive".to_string(),
            ));
        }
        let token = Regex::new(r"[\p{L}\p{N}]+").map_err(|e| EmbedError::ConfigError(e.to_string()))?;
        Ok(Self { dimensions, token })
    }

    /// Embed one text synchronously
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in self.token.find_iter(&lowered) {
            let mut hasher = FxHasher::default();
            hasher.write(token.as_str().as_bytes());
            let hash = hasher.finish();

            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> EmbedResult<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
