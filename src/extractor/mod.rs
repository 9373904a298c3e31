//! Text excerpts from documents, one extractor per format

pub mod docx;
pub mod generic;
pub mod office;
pub mod pdf;
pub mod pptx;
pub mod registry;
pub mod spreadsheet;
pub mod tabular;
pub mod text;
pub mod r#trait;

pub use registry::ExtractorRegistry;
pub use r#trait::TextExtractor;
