//! Cached downloads for model and traineddata files

use crate::error::NotesError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest file we are willing to download (standard tessdata files reach ~30MB)
const MAX_DOWNLOAD_BYTES: u64 = 128 * 1024 * 1024;

/// Per-user cache directory for downloaded OCR data
pub fn cache_dir(subdir: &str) -> Result<PathBuf, NotesError> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("handnotes")
        .join(subdir);

    std::fs::create_dir_all(&dir).map_err(|e| {
        NotesError::Initialization(format!("Failed to create cache directory: {}", e))
    })?;

    Ok(dir)
}

/// Return `dir/filename`, downloading it from `url` first if missing
pub fn ensure_downloaded(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, NotesError> {
    let path = dir.join(filename);

    if path.exists() {
        tracing::debug!("Using cached {:?}", path);
        return Ok(path);
    }

    tracing::info!("Downloading {} (this may take a moment)...", filename);
    download_file(url, &path)?;
    tracing::info!("Downloaded {} to {:?}", filename, path);

    Ok(path)
}

/// Download into a sibling `.part` file and rename it into place
fn download_file(url: &str, path: &Path) -> Result<(), NotesError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| NotesError::Initialization(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response
        .into_body()
        .with_config()
        .limit(MAX_DOWNLOAD_BYTES)
        .read_to_vec()
        .map_err(|e| {
            NotesError::Initialization(format!("Failed to read response body: {}", e))
        })?;

    let partial = path.with_extension("part");
    let mut file = File::create(&partial).map_err(|e| {
        NotesError::Initialization(format!("Failed to create {:?}: {}", partial, e))
    })?;
    file.write_all(&buffer)
        .map_err(|e| NotesError::Initialization(format!("Failed to write {:?}: {}", partial, e)))?;
    std::fs::rename(&partial, path)
        .map_err(|e| NotesError::Initialization(format!("Failed to move {:?}: {}", partial, e)))?;

    Ok(())
}
