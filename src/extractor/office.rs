//! Helpers for the zipped XML formats (docx, pptx)

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Open an OOXML package
pub fn open_package(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open document: {}", path.display()))?;
    ZipArchive::new(file)
        .with_context(|| format!("Failed to read document archive: {}", path.display()))
}

/// Read one XML part of the package as text
pub fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .with_context(|| format!("Document has no part named {}", name))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .with_context(|| format!("Failed to read document part {}", name))?;
    Ok(xml)
}

/// Collect the text of each `paragraph_tag` element, reading only the
/// characters inside `text_tag` elements. Stops after `limit` paragraphs.
pub fn paragraphs(
    xml: &str,
    paragraph_tag: &[u8],
    text_tag: &[u8],
    limit: usize,
) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    while out.len() < limit {
        match reader.read_event().context("Malformed document XML")? {
            Event::Start(e) if e.name().as_ref() == text_tag => in_text = true,
            Event::End(e) if e.name().as_ref() == text_tag => in_text = false,
            Event::End(e) if e.name().as_ref() == paragraph_tag => {
                out.push(std::mem::take(&mut current));
            }
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().context("Bad XML text escape")?);
            }
            // blank paragraphs still count towards the limit
            Event::Empty(e) if e.name().as_ref() == paragraph_tag => out.push(String::new()),
            // tabs and soft breaks inside a paragraph
            Event::Empty(e) if matches!(e.local_name().as_ref(), b"tab" | b"br") => {
                current.push(' ');
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
