use crate::config::{ChatBackend, Config, EmbeddingBackend, EmbeddingConfig, NamingConfig};
use crate::embeddings::{Embedder, EmbeddingProvider, FastEmbedProvider, OllamaEmbeddingProvider};
use crate::error::OrganizeError;
use crate::llm::bootstrap::{download_model, DownloadOutcome};
use crate::llm::{ChatModel, LlamaChatModel, OllamaChatModel};
use crate::organizer::StopSignal;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Owns the embedding and chat models of the organizer.
///
/// Each model is built at most once, on first use, even when several runs
/// share the registry. Tests inject fakes with `with_models`.
pub struct ModelRegistry {
    embedding: EmbeddingConfig,
    naming: NamingConfig,
    embedder: OnceCell<Embedder>,
    chat: OnceCell<Arc<dyn ChatModel>>,
}

impl ModelRegistry {
    pub fn from_config(config: &Config) -> Self {
        Self {
            embedding: config.embedding.clone(),
            naming: config.naming.clone(),
            embedder: OnceCell::new(),
            chat: OnceCell::new(),
        }
    }

    /// Registry with both models already in place
    pub fn with_models(
        config: &Config,
        embedding: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self::from_config(config)
            .with_embedding_provider(embedding)
            .with_chat_model(chat)
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = OnceCell::new_with(Some(Embedder::new(provider)));
        self
    }

    pub fn with_chat_model(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.chat = OnceCell::new_with(Some(chat));
        self
    }

    pub fn naming_config(&self) -> &NamingConfig {
        &self.naming
    }

    /// The embedder, loading the configured backend on first call
    pub async fn embedder(&self) -> Result<Embedder> {
        let embedder = self
            .embedder
            .get_or_try_init(|| async {
                let provider: Arc<dyn EmbeddingProvider> = match self.embedding.provider {
                    EmbeddingBackend::Ollama => Arc::new(
                        OllamaEmbeddingProvider::connect(
                            &self.embedding.url,
                            &self.embedding.model,
                            self.embedding.dims,
                        )
                        .await
                        .map_err(|e| OrganizeError::ModelUnavailable(format!("{:#}", e)))?,
                    ),
                    EmbeddingBackend::FastEmbed => {
                        if self.embedding.dims != FastEmbedProvider::DIMENSION {
                            return Err(anyhow::Error::from(OrganizeError::ModelUnavailable(format!(
                                "fastembed produces {} dimensions but embedding.dims is {}",
                                FastEmbedProvider::DIMENSION,
                                self.embedding.dims
                            ))));
                        }
                        Arc::new(
                            tokio::task::spawn_blocking(FastEmbedProvider::load)
                                .await
                                .context("Embedding model loader panicked")??,
                        )
                    }
                };
                info!("Embedding model ready ({} dimensions)", provider.dimension());
                Ok::<_, anyhow::Error>(Embedder::new(provider))
            })
            .await?;

        Ok(embedder.clone())
    }

    /// The chat model, loading it on first call.
    ///
    /// For the llama backend the model file must already exist; a missing
    /// file is reported as `OrganizeError::ModelMissing`.
    pub async fn chat(&self) -> Result<Arc<dyn ChatModel>> {
        let chat = self
            .chat
            .get_or_try_init(|| async {
                let model: Arc<dyn ChatModel> = match self.naming.provider {
                    ChatBackend::Ollama => Arc::new(OllamaChatModel::new(
                        &self.naming.ollama_url,
                        &self.naming.ollama_model,
                    )),
                    ChatBackend::Llama => {
                        let path = self.naming.resolved_model_path();
                        if !path.is_file() {
                            return Err(anyhow::Error::from(OrganizeError::ModelMissing(path)));
                        }
                        let (ctx, threads) = (self.naming.context_size, self.naming.threads);
                        Arc::new(
                            tokio::task::spawn_blocking(move || LlamaChatModel::load(&path, ctx, threads))
                                .await
                                .context("Chat model loader panicked")??,
                        )
                    }
                };
                Ok::<_, anyhow::Error>(model)
            })
            .await?;

        Ok(chat.clone())
    }

    /// Make sure the chat model can be loaded, downloading the GGUF file when
    /// it is missing and downloads are allowed. Returns `false` if the stop
    /// signal interrupted the download.
    pub async fn ensure_chat_model<F>(&self, stop: &StopSignal, mut on_line: F) -> Result<bool>
    where
        F: FnMut(String),
    {
        if self.chat.initialized() || self.naming.provider != ChatBackend::Llama {
            return Ok(true);
        }

        let path = self.naming.resolved_model_path();
        if path.is_file() {
            return Ok(true);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        on_line(format!("⚠️ Missing chat model: {}", name));

        if !self.naming.auto_download {
            return Err(anyhow::Error::from(OrganizeError::ModelMissing(path)));
        }

        if !LlamaChatModel::AVAILABLE {
            return Err(anyhow::Error::from(OrganizeError::ModelUnavailable(
                "llama.cpp backend is not compiled in; not downloading a model it cannot load".to_string(),
            )));
        }

        match download_model(&self.naming.model_url, &path, stop, on_line).await? {
            DownloadOutcome::Completed { .. } => Ok(true),
            DownloadOutcome::Stopped => Ok(false),
        }
    }
}
