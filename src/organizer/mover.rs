use crate::config::CollisionSuffix;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Moves files into destination folders without ever overwriting
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMover {
    suffix: CollisionSuffix,
}

impl FileMover {
    pub fn new(suffix: CollisionSuffix) -> Self {
        Self { suffix }
    }

    /// Move `src` into `dest_dir` and return the final path.
    ///
    /// `dest_dir` is created if absent, but its parent must already exist: a
    /// vanished target directory is never rebuilt. A taken name gets a `_<n>`
    /// (or `_<unix-seconds>`) suffix before the extension.
    pub fn move_into(&self, src: &Path, dest_dir: &Path) -> Result<PathBuf> {
        match fs::create_dir(dest_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dest_dir.is_dir() => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))
            }
        }

        let file_name = src
            .file_name()
            .with_context(|| format!("Not a file path: {}", src.display()))?;
        let dest = self.free_destination(dest_dir, Path::new(file_name));

        move_file(src, &dest)?;
        debug!("Moved {} -> {}", src.display(), dest.display());
        Ok(dest)
    }

    /// First name in `dest_dir` not already taken
    fn free_destination(&self, dest_dir: &Path, file_name: &Path) -> PathBuf {
        let candidate = dest_dir.join(file_name);
        if !exists(&candidate) {
            return candidate;
        }

        let stem = file_name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = file_name
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let base = match self.suffix {
            CollisionSuffix::Counter => stem,
            CollisionSuffix::Timestamp => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                let stamped = dest_dir.join(format!("{}_{}{}", stem, secs, ext));
                if !exists(&stamped) {
                    return stamped;
                }
                format!("{}_{}", stem, secs)
            }
        };

        let mut counter = 1u64;
        loop {
            let candidate = dest_dir.join(format!("{}_{}{}", base, counter, ext));
            if !exists(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Also true for dangling symlinks, which `Path::exists` reports as absent
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn crosses_devices(e: &io::Error) -> bool {
    // EXDEV, or ERROR_NOT_SAME_DEVICE on Windows
    #[cfg(windows)]
    const CODE: i32 = 17;
    #[cfg(not(windows))]
    const CODE: i32 = 18;
    e.raw_os_error() == Some(CODE)
}

/// Rename, falling back to copy + remove across filesystems
fn move_file(src: &Path, dest: &Path) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if crosses_devices(&e) => {
            fs::copy(src, dest).with_context(|| {
                format!("Failed to copy {} to {}", src.display(), dest.display())
            })?;
            fs::remove_file(src)
                .with_context(|| format!("Failed to remove {}", src.display()))?;
            Ok(())
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to move {} to {}", src.display(), dest.display())),
    }
}
