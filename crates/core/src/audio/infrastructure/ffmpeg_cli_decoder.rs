use std::path::Path;
use std::process::Command;

use crate::audio::domain::media_decoder::{diagnostic_tail, MediaDecoder, MediaError};
use crate::shared::constants::WHISPER_SAMPLE_RATE;

const STDERR_TAIL_CHARS: usize = 2000;

/// Light loudness normalization applied ahead of recognition when requested.
const LOUDNORM_FILTER: &str = "loudnorm=I=-16:TP=-1.5:LRA=11";

/// Media decoding through the ffmpeg / ffprobe command-line tools.
///
/// Any container or codec ffmpeg understands comes out as a mono 16 kHz wav.
pub struct FfmpegCliDecoder;

impl MediaDecoder for FfmpegCliDecoder {
    fn decode_to_wav(
        &self,
        input: &Path,
        wav_out: &Path,
        normalize_loudness: bool,
    ) -> Result<(), MediaError> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-hide_banner", "-i"])
            .arg(input)
            .args(["-vn", "-ac", "1", "-ar", &WHISPER_SAMPLE_RATE.to_string()]);
        if normalize_loudness {
            cmd.args(["-af", LOUDNORM_FILTER]);
        }
        cmd.args(["-f", "wav"]).arg(wav_out);

        let output = cmd.output().map_err(|e| MediaError::Spawn {
            tool: "ffmpeg",
            source: e,
        })?;

        if !output.status.success() {
            return Err(MediaError::Tool {
                tool: "ffmpeg",
                status: output.status.code().unwrap_or(-1),
                stderr_tail: diagnostic_tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_CHARS),
            });
        }

        log::debug!("decoded {} -> {}", input.display(), wav_out.display());
        Ok(())
    }

    /// Container duration via ffprobe's JSON output. An unreadable file or a
    /// container that reports no duration yields 0.0 (unknown), matching the
    /// driver's unbounded-window handling; only a failed launch is an error.
    fn probe_duration(&self, input: &Path) -> Result<f64, MediaError> {
        let output = Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(input)
            .output()
            .map_err(|e| MediaError::Spawn {
                tool: "ffprobe",
                source: e,
            })?;

        if !output.status.success() {
            return Ok(0.0);
        }

        Ok(parse_probe_duration(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_probe_duration(json: &str) -> f64 {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(_) => return 0.0,
    };
    // ffprobe reports the duration as a decimal string
    value["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"filename": "a.mp4", "duration": "63.45"}}"#;
        assert_relative_eq!(parse_probe_duration(json), 63.45);
    }

    #[test]
    fn test_parse_probe_duration_missing_field_is_unknown() {
        assert_relative_eq!(parse_probe_duration(r#"{"format": {}}"#), 0.0);
    }

    #[test]
    fn test_parse_probe_duration_invalid_json_is_unknown() {
        assert_relative_eq!(parse_probe_duration("not json"), 0.0);
    }

    #[test]
    fn test_decode_missing_input_reports_error() {
        let decoder = FfmpegCliDecoder;
        let result = decoder.decode_to_wav(
            Path::new("/nonexistent/input.mp4"),
            Path::new("/tmp/out.wav"),
            false,
        );
        assert!(result.is_err());
    }
}
