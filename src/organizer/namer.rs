use crate::config::NamingConfig;
use crate::constants::{
    EMPTY_NAME_FALLBACK, FALLBACK_GROUP_NAME, MAX_FOLDER_NAME_CHARS, MAX_NAMING_PREVIEWS,
    NAMING_PREVIEW_CHARS,
};
use crate::error::OrganizeError;
use crate::llm::ChatRequest;
use crate::models::FileEntry;
use crate::organizer::ModelRegistry;
use crate::utils::{flatten_newlines, truncate_chars};
use anyhow::Result;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a file organizer. \
Task: Generate a short, concise folder name (max 3 words) for these files. \
Rules: No punctuation. Use Underscores. PascalCase. No sentences. No explanation. \
No generic names like 'Files'. If unsure, output 'Documents'.";

/// Echo some models prepend to their answer
const ECHO_PREFIX: &str = "Folder Name:";

/// Names a cluster of files by asking the chat model
pub struct FolderNamer {
    temperature: f32,
    max_tokens: usize,
}

impl FolderNamer {
    pub fn new(temperature: f32, max_tokens: usize) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(config.temperature, config.max_tokens)
    }

    /// Prompt listing at most five files with a one-line preview each
    pub fn build_request(&self, files: &[FileEntry], excerpts: &[String]) -> ChatRequest {
        let previews: Vec<String> = files
            .iter()
            .zip(excerpts)
            .take(MAX_NAMING_PREVIEWS)
            .map(|(file, text)| {
                let preview = flatten_newlines(truncate_chars(text, NAMING_PREVIEW_CHARS));
                format!("- {}: {}...", file.file_name(), preview)
            })
            .collect();

        ChatRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("Files:\n{}\n\n{}", previews.join("\n"), ECHO_PREFIX),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Reduce a raw model reply to a safe folder name
    pub fn sanitize_folder_name(raw: &str) -> String {
        let cleaned = raw.trim().replace(ECHO_PREFIX, "").replace(['"', '\''], "");
        let name: String = cleaned
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .take(MAX_FOLDER_NAME_CHARS)
            .collect();

        if name.is_empty() {
            EMPTY_NAME_FALLBACK.to_string()
        } else {
            name
        }
    }

    /// Folder name for one cluster.
    ///
    /// Only a missing model file is an error; any other failure names the
    /// cluster "Group" so the run can go on.
    pub async fn folder_name(
        &self,
        models: &ModelRegistry,
        files: &[FileEntry],
        excerpts: &[String],
    ) -> Result<String> {
        let chat = match models.chat().await {
            Ok(chat) => chat,
            Err(e) if matches!(e.downcast_ref::<OrganizeError>(), Some(OrganizeError::ModelMissing(_))) => {
                return Err(e);
            }
            Err(e) => {
                warn!("Naming error: {:#}", e);
                return Ok(FALLBACK_GROUP_NAME.to_string());
            }
        };

        let request = self.build_request(files, excerpts);
        match chat.complete(&request).await {
            Ok(reply) => {
                debug!("Model proposed folder name {:?}", reply);
                Ok(Self::sanitize_folder_name(&reply))
            }
            Err(e) => {
                warn!("Naming error: {:#}", e);
                Ok(FALLBACK_GROUP_NAME.to_string())
            }
        }
    }
}

impl Default for FolderNamer {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}
