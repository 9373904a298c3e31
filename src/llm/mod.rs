pub mod bootstrap;
pub mod ollama;
pub mod r#trait;

#[cfg(feature = "llm")]
pub mod llama;

pub use ollama::OllamaChatModel;
pub use r#trait::{ChatModel, ChatRequest};

#[cfg(feature = "llm")]
pub use llama::LlamaChatModel;

#[cfg(not(feature = "llm"))]
pub struct LlamaChatModel;

#[cfg(not(feature = "llm"))]
impl LlamaChatModel {
    pub const AVAILABLE: bool = false;

    pub fn load(_path: &std::path::Path, _context_size: u32, _threads: u32) -> anyhow::Result<Self> {
        Err(crate::error::OrganizeError::ModelUnavailable(
            "llama.cpp backend is not enabled. Compile with --features llm, or set naming.provider = \"ollama\".".to_string(),
        )
        .into())
    }
}

#[cfg(not(feature = "llm"))]
#[async_trait::async_trait]
impl ChatModel for LlamaChatModel {
    async fn complete(&self, _request: &ChatRequest) -> anyhow::Result<String> {
        anyhow::bail!("LLM feature is not enabled. Compile with --features llm to use the local chat model.")
    }
}
