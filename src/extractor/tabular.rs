use crate::constants::TABULAR_EXTENSIONS;
use crate::extractor::r#trait::TextExtractor;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Number of lines previewed from delimited files
const MAX_ROWS: usize = 30;

/// Handler for CSV/TSV files: the first rows only, fields joined with commas
pub struct TabularExtractor;

impl TabularExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TabularExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for TabularExtractor {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let delimiter = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("tsv")) {
            b'\t'
        } else {
            b','
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut lines = Vec::new();
        for record in reader.byte_records().take(MAX_ROWS) {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    debug!("Stopping CSV preview of {}: {}", path.display(), e);
                    break;
                }
            };
            let fields: Vec<Cow<str>> = record.iter().map(String::from_utf8_lossy).collect();
            lines.push(fields.join(", "));
        }

        Ok(lines.join("\n"))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        TABULAR_EXTENSIONS.contains(&ext)
    }
}
