use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} failed (exit {status}): {stderr_tail}")]
    Tool {
        tool: &'static str,
        status: i32,
        stderr_tail: String,
    },
    #[error("no audio stream in {}", path.display())]
    NoAudio { path: PathBuf },
    #[error("audio decode failed: {0}")]
    Decode(String),
    #[error("{tool} finished but {missing} was not produced")]
    MissingOutput {
        tool: &'static str,
        missing: String,
    },
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Domain interface for turning arbitrary input media into the mono
/// fixed-sample-rate PCM stream the pipeline works on.
pub trait MediaDecoder: Send {
    /// Decode `input` to a mono 16 kHz wav at `wav_out`, optionally applying
    /// light loudness normalization.
    fn decode_to_wav(
        &self,
        input: &Path,
        wav_out: &Path,
        normalize_loudness: bool,
    ) -> Result<(), MediaError>;

    /// Media duration in seconds; 0.0 when the container does not report one.
    fn probe_duration(&self, input: &Path) -> Result<f64, MediaError>;
}

/// Last `max_chars` characters of a tool's diagnostic output, for error
/// messages that stay readable when the tool dumps pages of log.
pub fn diagnostic_tail(output: &str, max_chars: usize) -> String {
    let trimmed = output.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .skip(count - max_chars)
        .collect()
}
