use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::WHISPER_MODELS;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

pub fn model_weights_url(model: &str) -> Option<&'static str> {
    WHISPER_MODELS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, url)| *url)
}

pub fn model_weights_filename(model: &str) -> String {
    format!("ggml-{model}.bin")
}

/// Resolve model weights by name, checking the cache before downloading.
pub fn resolve(model: &str, progress: Option<ProgressFn>) -> Result<PathBuf, ModelResolveError> {
    let url = model_weights_url(model)
        .ok_or_else(|| ModelResolveError::UnknownModel(model.to_string()))?;

    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(model_weights_filename(model));
    if cached_path.exists() {
        return Ok(cached_path);
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Mediascribe/models/`
/// - Linux: `$XDG_CACHE_HOME/Mediascribe/models/` or `~/.cache/Mediascribe/models/`
/// - Windows: `%LOCALAPPDATA%/Mediascribe/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Mediascribe").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Mediascribe").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url).map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Report progress in chunks to avoid excessive callbacks
    let chunk_size = 1024 * 1024; // 1MB
    for chunk in bytes.chunks(chunk_size) {
        file.write_all(chunk)
            .map_err(|e| ModelResolveError::Write {
                path: temp_path.clone(),
                source: e,
            })?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
