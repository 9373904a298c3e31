pub mod config;
pub mod constants;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod organizer;
pub mod scanner;
pub mod utils;

pub use config::Config;
pub use error::OrganizeError;
pub use models::{FileEntry, RunStats, Strategy};
pub use organizer::{ModelRegistry, OrganizeEvent, Orchestrator, RunHandle, StopSignal};
