use crate::models::FileEntry;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Enumerate the regular files directly inside `dir`.
///
/// Subdirectories are not descended into. Entries that cannot be read
/// (permission errors, dangling links, races with deletion) are skipped, and a
/// missing or unreadable `dir` yields an empty list rather than an error.
pub fn scan_files<P: AsRef<Path>>(dir: P) -> Vec<FileEntry> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir.as_ref())
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        match FileEntry::from_path(entry.path()) {
            Ok(file) => files.push(file),
            Err(e) => debug!("Skipping {}: {:#}", entry.path().display(), e),
        }
    }

    files
}
