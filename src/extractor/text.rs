use crate::constants::{MAX_EXCERPT_CHARS, PLAIN_TEXT_EXTENSIONS};
use crate::extractor::r#trait::TextExtractor;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read from plain text files. Enough for MAX_EXCERPT_CHARS characters
/// of any UTF-8 text, so the excerpt is the same as reading the whole file.
const MAX_TEXT_BYTES: u64 = (MAX_EXCERPT_CHARS * 4) as u64;

/// Read at most `max_bytes` from the start of a file, replacing invalid UTF-8
pub fn read_prefix_lossy(path: &Path, max_bytes: u64) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut bytes = Vec::new();
    file.take(max_bytes)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Handler for plain text, source code and config files
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        read_prefix_lossy(path, MAX_TEXT_BYTES)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        PLAIN_TEXT_EXTENSIONS.contains(&ext)
    }
}
