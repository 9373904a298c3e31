//! Error conditions callers need to tell apart

use std::path::PathBuf;
use thiserror::Error;

/// Setup and run-ending errors of an organize run.
///
/// Per-item failures (one unreadable file, one bad embedding) never become an
/// `OrganizeError`; they are logged and degraded in place.
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Target is not an accessible directory: {}", .0.display())]
    InvalidTarget(PathBuf),

    #[error("No files found in directory.")]
    NoFiles,

    #[error("Chat model missing: {}", .0.display())]
    ModelMissing(PathBuf),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model download failed: {0}")]
    Download(String),
}
