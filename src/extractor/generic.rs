use crate::extractor::r#trait::TextExtractor;
use crate::extractor::text::read_prefix_lossy;
use crate::utils::is_mostly_alphanumeric;
use anyhow::Result;
use std::path::Path;

/// Bytes sniffed from files no other extractor claims
const SNIFF_BYTES: u64 = 1000;

/// Fallback for unknown extensions: keep the leading bytes only when they
/// look like readable text
pub struct GenericExtractor;

impl GenericExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for GenericExtractor {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let text = read_prefix_lossy(path, SNIFF_BYTES)?;
        if is_mostly_alphanumeric(&text) {
            Ok(text)
        } else {
            Ok(String::new())
        }
    }

    fn supports_extension(&self, _ext: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generic_keeps_readable_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.unknownext");
        std::fs::write(&path, "shopping list: eggs, flour, sugar").unwrap();

        let text = GenericExtractor::new().extract(&path).unwrap();
        assert_eq!(text, "shopping list: eggs, flour, sugar");
    }

    #[test]
    fn test_generic_drops_binary() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 255, 254, 0, 0, 7, 8, 9, 10]).unwrap();

        let text = GenericExtractor::new().extract(&path).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_generic_reads_first_kilobyte_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.dat");
        std::fs::write(&path, "a".repeat(5000)).unwrap();

        let text = GenericExtractor::new().extract(&path).unwrap();
        assert_eq!(text.len(), 1000);
    }
}
