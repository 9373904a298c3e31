use crate::extractor::office;
use crate::extractor::r#trait::TextExtractor;
use anyhow::Result;
use std::path::Path;

/// Number of paragraphs read from a word-processor document
const MAX_PARAGRAPHS: usize = 50;

/// Handler for .docx documents (word/document.xml inside the package)
pub struct WordExtractor;

impl WordExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for WordExtractor {
    fn name(&self) -> &'static str {
        "word"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let mut archive = office::open_package(path)?;
        let xml = office::read_part(&mut archive, "word/document.xml")?;
        let paragraphs = office::paragraphs(&xml, b"w:p", b"w:t", MAX_PARAGRAPHS)?;

        let mut text = String::new();
        for para in paragraphs {
            text.push_str(&para);
            text.push('\n');
        }
        Ok(text)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext == "docx"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Write a minimal .docx with one paragraph per entry
    pub(crate) fn write_docx(path: &Path, paragraphs: &[String]) {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        write_docx_body(path, &body);
    }

    /// Write a minimal .docx around raw `<w:body>` content
    fn write_docx_body(path: &Path, body: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        zip.start_file("word/document.xml", FileOptions::default()).unwrap();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_word_extractor_reads_paragraphs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("letter.docx");
        write_docx(&path, &["Dear team".to_string(), "Quarterly budget attached".to_string()]);

        let text = WordExtractor::new().extract(&path).unwrap();
        assert_eq!(text, "Dear team\nQuarterly budget attached\n");
    }

    #[test]
    fn test_word_extractor_stops_after_fifty_paragraphs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("long.docx");
        let paragraphs: Vec<String> = (0..80).map(|i| format!("para{}", i)).collect();
        write_docx(&path, &paragraphs);

        let text = WordExtractor::new().extract(&path).unwrap();
        assert_eq!(text.lines().count(), 50);
        assert!(text.contains("para49"));
        assert!(!text.contains("para50"));
    }

    #[test]
    fn test_blank_lines_use_up_the_paragraph_budget() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("spaced.docx");
        let body = format!(
            "{}<w:p><w:r><w:t>paragraph sixty one</w:t></w:r></w:p>",
            "<w:p/>".repeat(60)
        );
        write_docx_body(&path, &body);

        let text = WordExtractor::new().extract(&path).unwrap();
        assert!(!text.contains("paragraph sixty one"));
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_word_extractor_rejects_plain_zip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.docx");
        let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("readme.txt", FileOptions::default()).unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap();

        assert!(WordExtractor::new().extract(&path).is_err());
    }
}
