use crate::constants::SPREADSHEET_EXTENSIONS;
use crate::extractor::r#trait::TextExtractor;
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Number of rows previewed from the first worksheet
const MAX_ROWS: usize = 20;

/// Handler for workbooks (xlsx, xls, ods) through calamine
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self
    }

    fn row_text(row: &[Data]) -> String {
        row.iter()
            .filter(|cell| !matches!(cell, Data::Empty))
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for SpreadsheetExtractor {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range
                .with_context(|| format!("Failed to read first sheet: {}", path.display()))?,
            None => return Ok(String::new()),
        };

        let mut text = String::new();
        for row in range.rows().take(MAX_ROWS) {
            text.push_str(&Self::row_text(row));
            text.push('\n');
        }
        Ok(text)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        SPREADSHEET_EXTENSIONS.contains(&ext)
    }
}
