use crate::llm::{ChatModel, ChatRequest};
use anyhow::{Context, Result};
use llama_cpp::standard_sampler::{SamplerStage, StandardSampler};
use llama_cpp::{LlamaModel, LlamaParams, SessionParams};
use std::path::Path;
use tracing::debug;

/// GGUF chat model run in-process through llama.cpp
pub struct LlamaChatModel {
    model: LlamaModel,
    context_size: u32,
    threads: u32,
}

impl LlamaChatModel {
    pub const AVAILABLE: bool = true;

    /// Load the model file. Blocking; call from a blocking thread.
    pub fn load(path: &Path, context_size: u32, threads: u32) -> Result<Self> {
        let model = LlamaModel::load_from_file(path, LlamaParams::default())
            .with_context(|| format!("Failed to load chat model: {}", path.display()))?;
        debug!("Loaded chat model {}", path.display());

        Ok(Self {
            model,
            context_size,
            threads,
        })
    }

    fn generate(&self, prompt: &str, temperature: f32, max_tokens: usize) -> Result<String> {
        let params = SessionParams {
            n_ctx: self.context_size,
            n_threads: self.threads,
            n_threads_batch: self.threads,
            ..Default::default()
        };
        let mut session = self
            .model
            .create_session(params)
            .context("Failed to create llama session")?;
        session
            .advance_context(prompt)
            .context("Failed to evaluate prompt")?;

        let sampler = StandardSampler::new_softmax(vec![SamplerStage::Temperature(temperature)], 1);
        let completion = session
            .start_completing_with(sampler, max_tokens)
            .context("Failed to start completion")?;

        let mut reply = String::new();
        for piece in completion.into_strings() {
            reply.push_str(&piece);
            if reply.contains("<|") {
                break;
            }
        }
        if let Some(end) = reply.find("<|") {
            reply.truncate(end);
        }

        Ok(reply)
    }
}

#[async_trait::async_trait]
impl ChatModel for LlamaChatModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let model = LlamaChatModel {
            model: self.model.clone(),
            context_size: self.context_size,
            threads: self.threads,
        };
        let prompt = request.to_llama3_prompt();
        let temperature = request.temperature;
        let max_tokens = request.max_tokens;

        tokio::task::spawn_blocking(move || model.generate(&prompt, temperature, max_tokens))
            .await
            .context("Chat task panicked")?
    }
}
