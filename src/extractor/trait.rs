use anyhow::Result;
use std::path::Path;

/// Trait for text extractors that turn one file format into a plain-text preview
///
/// Implementations do blocking I/O; callers run them off the async runtime.
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Extract a bounded text preview from the file
    fn extract(&self, path: &Path) -> Result<String>;

    /// Check if this extractor supports the given (lower-cased) file extension
    fn supports_extension(&self, ext: &str) -> bool;
}
