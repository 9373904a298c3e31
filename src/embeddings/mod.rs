pub mod embedder;
pub mod ollama;
pub mod r#trait;

#[cfg(feature = "local-embeddings")]
pub mod local;

pub use embedder::Embedder;
pub use ollama::OllamaEmbeddingProvider;
pub use r#trait::EmbeddingProvider;

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedProvider;

#[cfg(not(feature = "local-embeddings"))]
pub struct FastEmbedProvider;

#[cfg(not(feature = "local-embeddings"))]
impl FastEmbedProvider {
    pub const DIMENSION: usize = 384;

    pub fn load() -> anyhow::Result<Self> {
        Err(crate::error::OrganizeError::ModelUnavailable(
            "fastembed backend is not enabled. Compile with --features local-embeddings.".to_string(),
        )
        .into())
    }
}

#[cfg(not(feature = "local-embeddings"))]
#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn compute_embedding(&self, _content: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("fastembed backend is not enabled. Compile with --features local-embeddings.")
    }

    fn dimension(&self) -> usize {
        Self::DIMENSION
    }
}
