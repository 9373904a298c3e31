//! Fetching the GGUF chat model on first use

use crate::constants::DOWNLOAD_PREFIX;
use crate::error::OrganizeError;
use crate::organizer::StopSignal;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const MB: f64 = 1024.0 * 1024.0;

/// Progress interval when the server sends no Content-Length
const UNSIZED_STEP: u64 = 5 * 1024 * 1024;

/// Anything this small is an error page, not a model
const MIN_MODEL_BYTES: u64 = 1000;

/// How a download ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed { bytes: u64 },
    Stopped,
}

/// `Downloading: 42% (12.3MB / 29.0MB)`
pub fn progress_line(downloaded: u64, total: u64) -> String {
    let percent = downloaded.saturating_mul(100) / total.max(1);
    format!(
        "{} {}% ({:.1}MB / {:.1}MB)",
        DOWNLOAD_PREFIX,
        percent,
        downloaded as f64 / MB,
        total as f64 / MB
    )
}

/// `Downloading: 15.0MB`
pub fn size_line(downloaded: u64) -> String {
    format!("{} {:.1}MB", DOWNLOAD_PREFIX, downloaded as f64 / MB)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    name.push(".part");
    dest.with_file_name(name)
}

/// Stream `url` into `dest`, reporting progress lines through `on_line`.
///
/// The body is written to `<dest>.part` and renamed into place only once it is
/// complete, so an interrupted download never leaves a truncated model at
/// `dest`. The stop signal is checked between chunks.
pub async fn download_model<F>(
    url: &str,
    dest: &Path,
    stop: &StopSignal,
    mut on_line: F,
) -> Result<DownloadOutcome>
where
    F: FnMut(String),
{
    let part = partial_path(dest);
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create model directory: {}", parent.display()))?;
    }

    on_line("⬇️ Downloading chat model...".to_string());
    on_line(format!("   Source: {}", url));
    info!("Downloading {} to {}", url, dest.display());

    match fetch(url, &part, stop, &mut on_line).await {
        Ok(DownloadOutcome::Completed { bytes }) => {
            tokio::fs::rename(&part, dest)
                .await
                .with_context(|| format!("Failed to move model into place: {}", dest.display()))?;
            let name = dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            on_line(format!("✅ Download complete: {}", name));
            Ok(DownloadOutcome::Completed { bytes })
        }
        Ok(DownloadOutcome::Stopped) => {
            let _ = tokio::fs::remove_file(&part).await;
            Ok(DownloadOutcome::Stopped)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            warn!("Model download failed: {:#}", e);
            on_line(format!("❌ Download failed: {:#}", e));
            Err(OrganizeError::Download(format!("{:#}", e)).into())
        }
    }
}

async fn fetch<F>(url: &str, part: &Path, stop: &StopSignal, on_line: &mut F) -> Result<DownloadOutcome>
where
    F: FnMut(String),
{
    let mut response = reqwest::get(url)
        .await
        .context("Failed to connect to model host")?
        .error_for_status()
        .context("Model host returned an error")?;

    let total = response.content_length().filter(|&n| n > 0);
    let mut file = tokio::fs::File::create(part)
        .await
        .with_context(|| format!("Failed to create {}", part.display()))?;

    let mut downloaded: u64 = 0;
    let mut last_percent: Option<u64> = None;
    let mut next_mark = UNSIZED_STEP;

    while let Some(chunk) = response.chunk().await.context("Download interrupted")? {
        if stop.is_stopped() {
            return Ok(DownloadOutcome::Stopped);
        }

        file.write_all(&chunk)
            .await
            .context("Failed to write model file")?;
        downloaded += chunk.len() as u64;

        match total {
            Some(total) => {
                let percent = downloaded.saturating_mul(100) / total;
                if last_percent.map_or(true, |last| percent > last) {
                    on_line(progress_line(downloaded, total));
                    last_percent = Some(percent);
                }
            }
            None => {
                if downloaded >= next_mark {
                    on_line(size_line(downloaded));
                    next_mark += UNSIZED_STEP;
                }
            }
        }
    }

    file.flush().await.context("Failed to flush model file")?;

    if downloaded <= MIN_MODEL_BYTES {
        anyhow::bail!("Downloaded file is empty ({} bytes)", downloaded);
    }

    Ok(DownloadOutcome::Completed { bytes: downloaded })
}
