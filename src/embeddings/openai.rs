use crate::cache::EmbeddingCache;
use crate::config::EmbeddingsConfig;
use crate::embeddings::Embedder;
use crate::error::{MemexError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const MAX_BATCH_SIZE: usize = 2048;
const MAX_RETRIES: usize = 3;

/// Request structure for the embeddings API
#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

/// Response structure from the embeddings API
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI-compatible embeddings client
///
/// Splits large inputs into API-sized batches, retries transient failures
/// with exponential backoff, and optionally consults an LRU cache for
/// repeated query texts.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    batch_size: usize,
    dimensions: usize,
    cache: Option<Arc<EmbeddingCache>>,
}

impl OpenAiEmbedder {
    /// Create an embedder from config, resolving the API key from the
    /// configured environment variable.
    pub fn from_config(config: &EmbeddingsConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            MemexError::Config(format!(
                "Environment variable {} not set",
                config.api_key_env
            ))
        })?;

        let cache = (config.cache_capacity > 0)
            .then(|| Arc::new(EmbeddingCache::new(config.cache_capacity)));

        Self::new(
            api_key,
            config.model.clone(),
            config.batch_size,
            config.dimensions,
            Duration::from_secs(config.timeout_secs),
            cache,
        )
    }

    /// Create an embedder with explicit parameters
    pub fn new(
        api_key: String,
        model: String,
        batch_size: usize,
        dimensions: usize,
        timeout: Duration,
        cache: Option<Arc<EmbeddingCache>>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemexError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            dimensions,
            cache,
        })
    }

    /// One API round trip for a single batch
    async fn request_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts,
        };

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| MemexError::Embedding(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(MemexError::Embedding(format!(
                "Embeddings API error {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| MemexError::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.data.len() != expected {
            return Err(MemexError::Embedding(format!(
                "Expected {} embeddings, got {}",
                expected,
                result.data.len()
            )));
        }

        for data in &result.data {
            if data.embedding.len() != self.dimensions {
                return Err(MemexError::Embedding(format!(
                    "Unexpected embedding dimension: expected {}, got {}",
                    self.dimensions,
                    data.embedding.len()
                )));
            }
        }

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// One batch with retry on rate limits and server errors
    async fn request_batch_with_retry(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.request_batch(texts.clone()).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) if attempt < MAX_RETRIES && is_retryable(&e) => {
                    log::warn!("Retry {}/{} after error: {}", attempt + 1, MAX_RETRIES, e);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// 429 and 5xx responses are worth retrying; anything else fails immediately
fn is_retryable(e: &MemexError) -> bool {
    let msg = e.to_string();
    ["429", "500", "502", "503", "504"]
        .iter()
        .any(|code| msg.contains(code))
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embeddings = self.request_batch_with_retry(batch.to_vec()).await?;
            all_embeddings.extend(embeddings);

            // Small delay between full batches to stay under rate limits
            if batch.len() == self.batch_size {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        Ok(all_embeddings)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(text) {
                log::debug!("embedding cache hit");
                return Ok(cached);
            }
        }

        let mut out = self
            .request_batch_with_retry(vec![text.to_string()])
            .await?;
        let embedding = out
            .pop()
            .ok_or_else(|| MemexError::Embedding("Empty response from embeddings API".to_string()))?;

        if let Some(cache) = &self.cache {
            cache.put(text.to_string(), embedding.clone());
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder(batch_size: usize) -> OpenAiEmbedder {
        OpenAiEmbedder::new(
            "test-key".to_string(),
            "text-embedding-3-small".to_string(),
            batch_size,
            1536,
            Duration::from_secs(5),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_batch_size_capped() {
        assert_eq!(embedder(5000).batch_size, MAX_BATCH_SIZE);
        assert_eq!(embedder(2048).batch_size, 2048);
        assert_eq!(embedder(100).batch_size, 100);
        // Zero would loop forever in chunks(); clamp to 1
        assert_eq!(embedder(0).batch_size, 1);
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&MemexError::Embedding(
            "Embeddings API error 429 Too Many Requests: slow down".to_string()
        )));
        assert!(is_retryable(&MemexError::Embedding(
            "Embeddings API error 503 Service Unavailable".to_string()
        )));
        assert!(!is_retryable(&MemexError::Embedding(
            "Embeddings API error 401 Unauthorized".to_string()
        )));
    }

    #[tokio::test]
    async fn test_embed_batch_empty_is_noop() {
        let out = embedder(10).embed_batch(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    // Integration tests against the real API require a key and run separately
}
