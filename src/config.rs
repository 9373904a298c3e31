use crate::constants::{
    CHAT_MODEL_FILENAME, CHAT_MODEL_URL, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_EMBEDDING_DIMS,
    MISC_FOLDER,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organizer: OrganizerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub naming: NamingConfig,
}

/// How a name collision in the destination folder is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionSuffix {
    /// `name_1.ext`, `name_2.ext`, ...
    #[default]
    Counter,
    /// `name_<unix seconds>.ext`, counter appended if still taken
    Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Ward linkage height at which clusters stop merging
    pub distance_threshold: f64,
    pub misc_folder: String,
    pub collision_suffix: CollisionSuffix,
    pub skip_confirmation: bool,
    /// Upper bound of the pre-sort phase in the progress fraction
    pub presort_end: f32,
    /// Upper bound of the extraction phase
    pub extraction_end: f32,
    /// Upper bound of the embedding phase; clustering fills the rest
    pub embedding_end: f32,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            misc_folder: MISC_FOLDER.to_string(),
            collision_suffix: CollisionSuffix::Counter,
            skip_confirmation: false,
            presort_end: 0.10,
            extraction_end: 0.40,
            embedding_end: 0.70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Ollama,
    FastEmbed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingBackend,
    pub url: String,
    pub model: String,
    pub dims: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Ollama,
            url: "http://127.0.0.1:11434".to_string(),
            model: "all-minilm".to_string(),
            dims: DEFAULT_EMBEDDING_DIMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatBackend {
    /// Local GGUF file through llama.cpp
    #[default]
    Llama,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub provider: ChatBackend,
    pub model_path: String,
    pub model_url: String,
    /// Download the GGUF file when it is missing
    pub auto_download: bool,
    pub ollama_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub context_size: u32,
    pub threads: u32,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            provider: ChatBackend::Llama,
            model_path: format!("models/{}", CHAT_MODEL_FILENAME),
            model_url: CHAT_MODEL_URL.to_string(),
            auto_download: true,
            ollama_url: "http://127.0.0.1:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            temperature: 0.1,
            max_tokens: 15,
            context_size: 2048,
            threads: 4,
        }
    }
}

impl NamingConfig {
    /// Model path with `~` and environment variables expanded
    pub fn resolved_model_path(&self) -> PathBuf {
        expand_path(&self.model_path)
    }
}

/// Expand `~` and `$VARS` in a configured path, leaving it untouched on failure
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw),
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from default location or return defaults
    pub fn load() -> Result<Self> {
        let default_paths = [
            PathBuf::from("config/settings.toml"),
            PathBuf::from("./config/settings.toml"),
            expand_path("~/.config/synaptiq/settings.toml"),
        ];

        for path in &default_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Reject settings that would break progress monotonicity or clustering
    pub fn validate(&self) -> Result<()> {
        let o = &self.organizer;
        if !(o.distance_threshold.is_finite() && o.distance_threshold > 0.0) {
            anyhow::bail!("organizer.distance_threshold must be positive");
        }
        let ordered = 0.0 <= o.presort_end
            && o.presort_end <= o.extraction_end
            && o.extraction_end <= o.embedding_end
            && o.embedding_end <= 1.0;
        if !ordered {
            anyhow::bail!("organizer phase bounds must satisfy 0 <= presort <= extraction <= embedding <= 1");
        }
        if !is_plain_folder_name(&o.misc_folder) {
            anyhow::bail!(
                "organizer.misc_folder must be a single folder name, got {:?}",
                o.misc_folder
            );
        }
        if self.embedding.dims == 0 {
            anyhow::bail!("embedding.dims must be greater than zero");
        }
        Ok(())
    }
}

/// One non-empty path component, so the folder stays directly inside the target
fn is_plain_folder_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.organizer.distance_threshold, 1.5);
        assert_eq!(config.organizer.misc_folder, "Misc_Files");
        assert_eq!(config.embedding.dims, 384);
        assert_eq!(config.naming.provider, ChatBackend::Llama);
        assert!(config.naming.model_path.ends_with(".gguf"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file_partial() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[organizer]
distance_threshold = 1.2
collision_suffix = "timestamp"

[embedding]
provider = "fastembed"

[naming]
provider = "ollama"
ollama_model = "qwen2.5:3b"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.organizer.distance_threshold, 1.2);
        assert_eq!(config.organizer.collision_suffix, CollisionSuffix::Timestamp);
        assert_eq!(config.organizer.presort_end, 0.10);
        assert_eq!(config.embedding.provider, EmbeddingBackend::FastEmbed);
        assert_eq!(config.embedding.dims, 384);
        assert_eq!(config.naming.provider, ChatBackend::Ollama);
        assert_eq!(config.naming.ollama_model, "qwen2.5:3b");
        assert_eq!(config.naming.max_tokens, 15);
    }

    #[test]
    fn test_config_rejects_unordered_phases() {
        let mut config = Config::default();
        config.organizer.extraction_end = 0.05;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_misc_folder_outside_target() {
        for bad in ["", "  ", ".", "..", "../x", "a/b", "a\\b"] {
            let mut config = Config::default();
            config.organizer.misc_folder = bad.to_string();
            assert!(config.validate().is_err(), "{:?} should be rejected", bad);
        }

        let mut config = Config::default();
        config.organizer.misc_folder = "Other Stuff".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("models/x.gguf"), PathBuf::from("models/x.gguf"));
    }
}
