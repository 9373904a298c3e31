use crate::embeddings::EmbeddingProvider;
use anyhow::{Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;

/// In-process all-MiniLM-L6-v2 embeddings through fastembed (ONNX runtime)
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Native dimension of all-MiniLM-L6-v2
    pub const DIMENSION: usize = 384;

    /// Load the model, downloading it to the fastembed cache on first use.
    /// Blocking; call from a blocking thread.
    pub fn load() -> Result<Self> {
        let options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options).context("Failed to load fastembed model")?;
        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        let model = self.model.clone();
        let text = content.to_string();

        let mut embeddings = tokio::task::spawn_blocking(move || model.embed(vec![text], None))
            .await
            .context("Embedding task panicked")?
            .context("fastembed inference failed")?;

        embeddings
            .pop()
            .context("fastembed returned no embedding")
    }

    fn dimension(&self) -> usize {
        Self::DIMENSION
    }
}
