//! Undo an organize run: pull nested files back into the root

use crate::config::CollisionSuffix;
use crate::organizer::FileMover;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What `flatten_directory` did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub moved: usize,
    /// Files that needed a `_<n>` suffix to avoid overwriting
    pub renamed: usize,
    pub directories_removed: usize,
    pub failed: usize,
}

/// Move every file below `root` into `root` itself, then delete the
/// subdirectories that ended up empty. Name clashes get a counter suffix.
pub fn flatten_directory(root: &Path) -> Result<FlattenReport> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory: {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    // Collected up front: moved files land in the directory being walked
    let entries: Vec<walkdir::DirEntry> = WalkDir::new(&root)
        .min_depth(1)
        .contents_first(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();

    let mover = FileMover::new(CollisionSuffix::Counter);
    let mut report = FlattenReport::default();

    for entry in entries {
        if entry.file_type().is_dir() {
            match std::fs::remove_dir(entry.path()) {
                Ok(()) => report.directories_removed += 1,
                Err(e) => debug!("Keeping {}: {}", entry.path().display(), e),
            }
        } else if entry.depth() > 1 {
            match mover.move_into(entry.path(), &root) {
                Ok(dest) => {
                    report.moved += 1;
                    if dest.file_name() != Some(entry.file_name()) {
                        report.renamed += 1;
                    }
                }
                Err(e) => {
                    warn!("Could not move {}: {:#}", entry.path().display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}
