use anyhow::Result;

/// One system + user exchange sent to a chat model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl ChatRequest {
    /// Render with the Llama 3 instruct template, ending at the assistant turn
    pub fn to_llama3_prompt(&self) -> String {
        format!(
            "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{}<|eot_id|>\
             <|start_header_id|>user<|end_header_id|>\n\n{}<|eot_id|>\
             <|start_header_id|>assistant<|end_header_id|>\n\n",
            self.system.trim(),
            self.user.trim()
        )
    }
}

/// Trait for chat-completion models used to name folders
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Return the assistant's reply to `request`
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}
