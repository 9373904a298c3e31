use crate::embeddings::EmbeddingProvider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Embedding provider backed by a local Ollama server
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingProvider {
    /// Create a provider without contacting the server
    pub fn new(base_url: &str, model: &str, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
        }
    }

    /// Create a provider and probe the server once, so an unreachable server,
    /// an unknown model or a model of the wrong dimension fails here instead
    /// of on every file.
    pub async fn connect(base_url: &str, model: &str, dimension: usize) -> Result<Self> {
        let provider = Self::new(base_url, model, dimension);
        let probe = provider
            .request("probe")
            .await
            .with_context(|| format!("Embedding model '{}' is not available", model))?;
        if probe.len() != dimension {
            anyhow::bail!(
                "Embedding model '{}' produces {} dimensions but embedding.dims is {}",
                model,
                probe.len(),
                dimension
            );
        }
        Ok(provider)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, content: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: content,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama API returned error: {}", response.status());
        }

        let body: OllamaEmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse Ollama embedding response")?;

        Ok(body.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        let content = content.trim();
        if content.is_empty() {
            anyhow::bail!("Cannot generate embedding for empty content");
        }

        let embedding = self.request(content).await?;
        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Model '{}' returned dimension {}, expected {}",
                self.model,
                embedding.len(),
                self.dimension
            );
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
