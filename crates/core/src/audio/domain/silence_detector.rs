use std::path::Path;

use thiserror::Error;

/// A detected span below the loudness threshold for at least the minimum
/// duration. Used only as a segmentation boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SilenceSpan {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl SilenceSpan {
    pub fn new(start_sec: f64, end_sec: f64) -> Self {
        Self { start_sec, end_sec }
    }
}

#[derive(Error, Debug)]
pub enum SilenceError {
    #[error("failed to launch silence analyzer: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("silence analysis failed (exit {status}): {stderr_tail}")]
    Tool { status: i32, stderr_tail: String },
}

/// Domain interface for energy-based silence analysis.
///
/// Implementations must report tool failure as an error; an empty list is a
/// valid result only for audio that genuinely contains no qualifying silence.
pub trait SilenceDetector: Send {
    fn detect(
        &self,
        audio_path: &Path,
        silence_db: i32,
        min_silence_sec: f64,
    ) -> Result<Vec<SilenceSpan>, SilenceError>;
}
