use crate::constants::MAX_EMBED_CHARS;
use crate::embeddings::EmbeddingProvider;
use crate::utils::{flatten_newlines, truncate_chars};
use std::sync::Arc;
use tracing::warn;

/// Text-to-vector facade used by the organizer.
///
/// Never fails: empty input, provider errors and vectors of the wrong size
/// all come back as a zero vector of the provider's dimension, which the
/// clusterer accepts like any other point.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// First MAX_EMBED_CHARS characters on a single line, trimmed
    pub fn clean(text: &str) -> String {
        flatten_newlines(truncate_chars(text, MAX_EMBED_CHARS))
            .trim()
            .to_string()
    }

    pub fn zeros(&self) -> Vec<f32> {
        vec![0.0; self.dimension()]
    }

    pub async fn embed(&self, text: &str) -> Vec<f32> {
        let clean = Self::clean(text);
        if clean.is_empty() {
            return self.zeros();
        }

        match self.provider.compute_embedding(&clean).await {
            Ok(vector) if vector.len() == self.dimension() => vector,
            Ok(vector) => {
                warn!(
                    "Embedding has dimension {}, expected {}; using zero vector",
                    vector.len(),
                    self.dimension()
                );
                self.zeros()
            }
            Err(e) => {
                warn!("Embedding failed: {:#}", e);
                self.zeros()
            }
        }
    }
}
