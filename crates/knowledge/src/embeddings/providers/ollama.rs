//! Ollama embedding provider.
//!
//! Neural semantic embeddings via Ollama's local API, using models like
//! nomic-embed-text. Failures here mean the retrieval backend is effectively
//! down, so errors surface as `IndexUnavailable`.

use crate::embeddings::provider::{EmbeddingConfig, EmbeddingProvider};
use courseqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Per-request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One retry before the failure escalates to the caller
const RETRY_BACKOFF_MS: u64 = 200;

/// Request payload for Ollama embeddings API.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response from Ollama embeddings API.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider.
#[derive(Debug)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder from configuration.
    ///
    /// Endpoint resolution: explicit config, then `OLLAMA_URL`, then the
    /// local default. Connectivity is not probed here; the first embed call
    /// surfaces an unreachable backend.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Embed a single text, retrying once on failure.
    async fn embed_with_retry(&self, text: &str) -> AppResult<Vec<f32>> {
        match self.embed_once(text).await {
            Ok(embedding) => Ok(embedding),
            Err(first) => {
                warn!("Embedding request failed, retrying once: {}", first);
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS)).await;
                self.embed_once(text).await
            }
        }
    }

    /// Embed a single text (no retries).
    async fn embed_once(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::IndexUnavailable(format!("Failed to reach Ollama at {}: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::IndexUnavailable(format!(
                "Ollama embeddings API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::IndexUnavailable(format!("Failed to parse Ollama response: {}", e))
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::IndexUnavailable(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        debug!(
            dimensions = body.embedding.len(),
            "Generated embedding via Ollama"
        );

        Ok(body.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Embedding batch of {} texts", texts.len());

        // Ollama has no batch endpoint; embed sequentially
        let mut embeddings = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                warn!("Skipping empty text at index {}", i);
                embeddings.push(vec![0.0; self.dimensions]);
                continue;
            }

            embeddings.push(self.embed_with_retry(text).await?);
        }

        Ok(embeddings)
    }
}
