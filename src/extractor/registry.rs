use crate::constants::MAX_EXCERPT_CHARS;
use crate::extractor::{
    docx::WordExtractor, generic::GenericExtractor, pdf::PdfExtractor, pptx::SlideDeckExtractor,
    spreadsheet::SpreadsheetExtractor, tabular::TabularExtractor, text::PlainTextExtractor,
    TextExtractor,
};
use crate::models::FileEntry;
use crate::utils::truncate_chars;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Registry mapping file extensions to text extractors
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn TextExtractor>>,
    generic: Arc<dyn TextExtractor>,
}

impl ExtractorRegistry {
    /// Create a new registry with the built-in extractors
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(PlainTextExtractor::new()));
        registry.register(Arc::new(TabularExtractor::new()));
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(WordExtractor::new()));
        registry.register(Arc::new(SlideDeckExtractor::new()));
        registry.register(Arc::new(SpreadsheetExtractor::new()));

        registry
    }

    /// Registry with only the generic fallback
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
            generic: Arc::new(GenericExtractor::new()),
        }
    }

    /// Register an extractor. Earlier registrations win on overlapping extensions.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        self.extractors.push(extractor);
    }

    /// Find the extractor for a lower-cased extension
    pub fn get_extractor(&self, ext: &str) -> Arc<dyn TextExtractor> {
        for extractor in &self.extractors {
            if extractor.supports_extension(ext) {
                return extractor.clone();
            }
        }

        self.generic.clone()
    }

    /// Extract a text excerpt of at most MAX_EXCERPT_CHARS characters.
    /// Parsing runs on the blocking pool.
    pub async fn try_excerpt(&self, file: &FileEntry) -> Result<String> {
        let extractor = self.get_extractor(file.extension_or(""));
        let path = file.path.clone();
        debug!("Extracting {} with {}", path.display(), extractor.name());

        let text = tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .context("Extraction task panicked")??;

        Ok(truncate_chars(&text, MAX_EXCERPT_CHARS).to_string())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
