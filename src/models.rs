use crate::utils;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A regular file found directly inside the target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Lower-cased extension without the dot
    pub extension: Option<String>,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileEntry {
    /// Create a new FileEntry instance
    pub fn new(path: PathBuf, extension: Option<String>, modified: SystemTime) -> Self {
        Self {
            path,
            extension,
            modified,
        }
    }

    /// Build an entry from the filesystem (follows symlinks)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("Not a regular file: {}", path.display());
        }
        let modified = metadata
            .modified()
            .or_else(|_| metadata.created())
            .unwrap_or_else(|_| SystemTime::now());

        Ok(Self::new(path.to_path_buf(), utils::get_extension(path), modified))
    }

    /// File name component, lossily converted
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension or the given default when the file has none
    pub fn extension_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.extension.as_deref().unwrap_or(default)
    }
}

/// How a directory gets organized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One folder per lower-cased file extension
    #[value(name = "extension", alias = "type")]
    ByExtension,
    /// One folder per modification month (YYYY-MM)
    #[value(name = "date")]
    ByDate,
    /// Semantic clustering with AI-generated folder names
    #[value(name = "ai")]
    ByAiCluster,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::ByExtension => "extension",
            Strategy::ByDate => "date",
            Strategy::ByAiCluster => "ai",
        };
        f.write_str(name)
    }
}

/// Counters reported to the observer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: usize,
    pub processed: usize,
    pub groups: usize,
}
