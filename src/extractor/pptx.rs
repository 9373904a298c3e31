use crate::extractor::office;
use crate::extractor::r#trait::TextExtractor;
use anyhow::Result;
use std::path::Path;

/// Number of slides read from a presentation
const MAX_SLIDES: usize = 5;

/// Handler for .pptx presentations
pub struct SlideDeckExtractor;

impl SlideDeckExtractor {
    pub fn new() -> Self {
        Self
    }

    /// `ppt/slides/slide12.xml` -> 12
    fn slide_number(part_name: &str) -> Option<u32> {
        part_name
            .strip_prefix("ppt/slides/slide")?
            .strip_suffix(".xml")?
            .parse()
            .ok()
    }
}

impl Default for SlideDeckExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for SlideDeckExtractor {
    fn name(&self) -> &'static str {
        "slide-deck"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let mut archive = office::open_package(path)?;

        // Part names are numbered in slide order
        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| Self::slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        slides.sort();

        let mut text = String::new();
        for (_, part) in slides.into_iter().take(MAX_SLIDES) {
            let xml = office::read_part(&mut archive, &part)?;
            for para in office::paragraphs(&xml, b"a:p", b"a:t", usize::MAX)? {
                if !para.trim().is_empty() {
                    text.push_str(&para);
                    text.push('\n');
                }
            }
        }
        Ok(text)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext == "pptx"
    }
}
