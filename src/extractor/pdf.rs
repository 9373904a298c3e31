use crate::extractor::r#trait::TextExtractor;
use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Number of pages read from a PDF
const MAX_PAGES: usize = 3;

/// PDF text extractor built on lopdf
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let doc = Document::load(path)
            .with_context(|| format!("Failed to load PDF: {}", path.display()))?;

        let mut text_content = String::new();

        // get_pages() is keyed by page number, so this is document order
        for page_num in doc.get_pages().keys().take(MAX_PAGES) {
            match doc.extract_text(&[*page_num]) {
                Ok(page_text) if !page_text.trim().is_empty() => {
                    text_content.push_str(&page_text);
                    text_content.push('\n');
                }
                Ok(_) => {}
                Err(e) => debug!("No text on page {} of {}: {}", page_num, path.display(), e),
            }
        }

        Ok(text_content)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext == "pdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    /// Write a PDF with one page per entry; `None` gives a page with no text
    fn write_pdf(path: &Path, pages: &[Option<&str>]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), Object::Integer(24)]),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(600)]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_pdf_reads_first_three_pages() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.pdf");
        write_pdf(
            &path,
            &[Some("alpha"), None, Some("gamma"), Some("delta"), Some("epsilon")],
        );

        let text = PdfExtractor::new().extract(&path).unwrap();
        assert!(text.contains("alpha"));
        assert!(text.contains("gamma"));
        assert!(!text.contains("delta"));
        assert!(!text.contains("epsilon"));
        assert!(text.trim_start().starts_with("alpha"));
    }

    #[test]
    fn test_pdf_extractor_supports_pdf() {
        let extractor = PdfExtractor::new();
        assert!(extractor.supports_extension("pdf"));
        assert!(!extractor.supports_extension("txt"));
    }

    #[test]
    fn test_pdf_without_text_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.pdf");
        write_pdf(&path, &[None, None]);

        assert_eq!(PdfExtractor::new().extract(&path).unwrap(), "");
    }

    #[test]
    fn test_pdf_extractor_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        assert!(PdfExtractor::new().extract(&path).is_err());
    }
}
