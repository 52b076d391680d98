//! Embedding client for remote providers

use crate::embed::{EmbedError, EmbedResult, Embedder, EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for interacting with provider APIs to generate embeddings
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: Client,
    provider: EmbeddingProvider,
    model: String,
    api_key: Option<String>,
    api_base_url: String,
    dimensions: usize,
    batch_size: usize,
}

impl EmbeddingClient {
    /// Create a new embedding client based on configuration
    pub fn new(config: &EmbeddingConfig) -> EmbedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbedError::ConfigError(e.to_string()))?;

        let api_base_url = match (&config.api_base_url, config.provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, EmbeddingProvider::OpenAI) => "https://api.openai.com/v1".to_string(),
            (None, EmbeddingProvider::Ollama) => "http://localhost:11434".to_string(),
            (None, EmbeddingProvider::Gemini) => {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }
            (None, EmbeddingProvider::Hashing) => {
                return Err(EmbedError::ConfigError(
                    "hashing embeddings are computed locally".to_string(),
                ))
            }
        };

        Ok(Self {
            client,
            provider: config.provider,
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            api_base_url,
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }

    pub fn provider(&self) -> EmbeddingProvider {
        self.provider
    }

    /// Generate embeddings for a batch of texts
    pub async fn generate_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        let embeddings = match self.provider {
            EmbeddingProvider::OpenAI => self.openai_embeddings(texts).await?,
            EmbeddingProvider::Ollama => self.ollama_embeddings(texts).await?,
            EmbeddingProvider::Gemini => self.gemini_embeddings(texts).await?,
            EmbeddingProvider::Hashing => {
                return Err(EmbedError::ConfigError(
                    "hashing embeddings are computed locally".to_string(),
                ))
            }
        };

        if embeddings.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                expected: texts.len(),
                got: embeddings.len(),
            });
        }
        Ok(embeddings)
    }

    fn require_key(&self) -> EmbedResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            EmbedError::ConfigError(format!("{:?} requires an API key", self.provider))
        })
    }

    async fn openai_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a [String],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<OpenAIData>,
        }

        #[derive(Deserialize)]
        struct OpenAIData {
            embedding: Vec<f32>,
        }

        let api_key = self.require_key()?;

        let url = format!("{}/embeddings", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&OpenAIRequest {
                input: texts,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError(format!("OpenAI returned error: {}", error_text)));
        }

        let result: OpenAIResponse = resp
            .json()
            .await
            .map_err(|e| EmbedError::SerializationError(e.to_string()))?;
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn ollama_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.api_base_url);
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let resp = self
                .client
                .post(&url)
                .json(&OllamaRequest {
                    model: &self.model,
                    prompt: text,
                })
                .send()
                .await
                .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

            if !resp.status().is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                return Err(EmbedError::ApiError(format!("Ollama returned error: {}", error_text)));
            }

            let result: OllamaResponse = resp
                .json()
                .await
                .map_err(|e| EmbedError::SerializationError(e.to_string()))?;
            results.push(result.embedding);
        }

        Ok(results)
    }

    async fn gemini_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct GeminiBatchRequest<'a> {
            requests: Vec<GeminiRequest<'a>>,
        }

        #[derive(Serialize)]
        struct GeminiRequest<'a> {
            model: String,
            content: GeminiContent<'a>,
        }

        #[derive(Serialize)]
        struct GeminiContent<'a> {
            parts: Vec<GeminiPart<'a>>,
        }

        #[derive(Serialize)]
        struct GeminiPart<'a> {
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct GeminiBatchResponse {
            embeddings: Vec<GeminiEmbedding>,
        }

        #[derive(Deserialize)]
        struct GeminiEmbedding {
            values: Vec<f32>,
        }

        let api_key = self.require_key()?;
        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.api_base_url, self.model, api_key
        );

        let requests = texts
            .iter()
            .map(|t| GeminiRequest {
                model: format!("models/{}", self.model),
                content: GeminiContent {
                    parts: vec![GeminiPart { text: t }],
                },
            })
            .collect();

        let resp = self
            .client
            .post(&url)
            .json(&GeminiBatchRequest { requests })
            .send()
            .await
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError(format!("Gemini returned error: {}", error_text)));
        }

        let result: GeminiBatchResponse = resp
            .json()
            .await
            .map_err(|e| EmbedError::SerializationError(e.to_string()))?;
        Ok(result.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed_documents(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!("Embedding batch {} ({} texts)", i, batch.len());
            vectors.extend(self.generate_embeddings(batch).await?);
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let mut vectors = self.generate_embeddings(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or(EmbedError::CountMismatch { expected: 1, got: 0 })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_urls() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Ollama,
            ..Default::default()
        };
        let client = EmbeddingClient::new(&config).unwrap();
        assert_eq!(client.api_base_url, "http://localhost:11434");
        assert_eq!(client.provider(), EmbeddingProvider::Ollama);
    }

    #[test]
    fn test_custom_base_url_trims_slash() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::OpenAI,
            api_base_url: Some("http://localhost:8000/v1/".to_string()),
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let client = EmbeddingClient::new(&config).unwrap();
        assert_eq!(client.api_base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn test_hashing_provider_rejected() {
        let result = EmbeddingClient::new(&EmbeddingConfig::default());
        assert!(matches!(result, Err(EmbedError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Ollama,
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = EmbeddingClient::new(&config).unwrap();
        let result = client.embed_query("offshore").await;
        assert!(matches!(result, Err(EmbedError::NetworkError(_))));
    }
}
