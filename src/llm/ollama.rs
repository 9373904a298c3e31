use crate::llm::{ChatModel, ChatRequest};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Chat model served by a local Ollama instance
pub struct OllamaChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
    num_predict: usize,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl OllamaChatModel {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> ChatBody<'a> {
        ChatBody {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            stream: false,
            options: Options {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for OllamaChatModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.body(request))
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama API returned error: {}", response.status());
        }

        let reply: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama chat response")?;

        Ok(reply.message.content)
    }
}
