//! Text embedding backends
//!
//! [`Embedder`] is the seam between the vector index and whatever turns text
//! into vectors: the local [`HashingEmbedder`] or a remote provider through
//! [`EmbeddingClient`].

pub mod client;
pub mod hashing;

pub use client::EmbeddingClient;
pub use hashing::HashingEmbedder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "LEAKGRAPH_EMBED_API_KEY";

/// Embed errors
#[derive(Error, Debug)]
pub enum EmbedError {
    /// API error from the embedding provider
    #[error("Embedding API error: {0}")]
    ApiError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Provider returned {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

pub type EmbedResult<T> = Result<T, EmbedError>;

/// Turns text into fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of documents, one vector per input in order
    async fn embed_documents(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> EmbedResult<Vec<f32>>;

    /// Length of every vector this embedder produces
    fn dimensions(&self) -> usize;
}

/// Embedding provider options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local feature hashing, no network
    #[default]
    Hashing,
    OpenAI,
    Ollama,
    Gemini,
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// Model name (e.g., "text-embedding-3-small", "nomic-embed-text")
    pub model: String,
    /// API key; falls back to `LEAKGRAPH_EMBED_API_KEY`
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    /// Vector dimension size
    pub dimensions: usize,
    /// Texts per provider request
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hashing,
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            api_base_url: None,
            dimensions: 384,
            batch_size: 64,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Configured key, or the environment fallback
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Construct the embedder selected by `config`
pub fn build_embedder(config: &EmbeddingConfig) -> EmbedResult<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimensions)?)),
        _ => Ok(Arc::new(EmbeddingClient::new(config)?)),
    }
}
