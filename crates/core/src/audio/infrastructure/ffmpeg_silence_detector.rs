use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::audio::domain::media_decoder::diagnostic_tail;
use crate::audio::domain::silence_detector::{SilenceDetector, SilenceError, SilenceSpan};

const STDERR_TAIL_CHARS: usize = 2000;

static SILENCE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"silence_start:\s*([0-9.]+)").expect("valid regex"));
static SILENCE_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"silence_end:\s*([0-9.]+)\s*\|\s*silence_duration:\s*([0-9.]+)")
        .expect("valid regex")
});

/// Silence analysis via ffmpeg's `silencedetect` filter.
///
/// The filter logs `silence_start` / `silence_end` events to stderr during a
/// null-muxed pass over the audio; no output file is produced.
pub struct FfmpegSilenceDetector;

impl SilenceDetector for FfmpegSilenceDetector {
    fn detect(
        &self,
        audio_path: &Path,
        silence_db: i32,
        min_silence_sec: f64,
    ) -> Result<Vec<SilenceSpan>, SilenceError> {
        let filter = format!("silencedetect=n={silence_db}dB:d={min_silence_sec}");
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-i"])
            .arg(audio_path)
            .args(["-af", &filter, "-f", "null", "-"])
            .output()
            .map_err(SilenceError::Spawn)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(SilenceError::Tool {
                status: output.status.code().unwrap_or(-1),
                stderr_tail: diagnostic_tail(&stderr, STDERR_TAIL_CHARS),
            });
        }

        let spans = parse_silence_log(&stderr);
        log::debug!(
            "silencedetect found {} spans in {}",
            spans.len(),
            audio_path.display()
        );
        Ok(spans)
    }
}

/// Pair up start/end events from a silencedetect log.
///
/// Each start is matched to the next end seen afterwards; a start with no
/// matching end (silence running into EOF) is dropped, since segmentation
/// only consumes closed gaps.
pub fn parse_silence_log(log: &str) -> Vec<SilenceSpan> {
    let mut spans = Vec::new();
    let mut open_start: Option<f64> = None;

    for line in log.lines() {
        if let Some(m) = SILENCE_START_RE.captures(line) {
            if let Ok(start) = m[1].parse::<f64>() {
                open_start = Some(start);
            }
        }

        if let Some(m) = SILENCE_END_RE.captures(line) {
            if let (Some(start), Ok(end)) = (open_start, m[1].parse::<f64>()) {
                spans.push(SilenceSpan::new(start, end));
                open_start = None;
            }
        }
    }

    spans
}
