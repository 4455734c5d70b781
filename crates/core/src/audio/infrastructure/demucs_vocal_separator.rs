use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::audio::domain::media_decoder::{diagnostic_tail, MediaError};
use crate::audio::domain::vocal_separator::VocalSeparator;

const STDERR_TAIL_CHARS: usize = 2000;

/// Two-stem vocal isolation through the demucs command-line tool.
///
/// Output is requested as mp3 so demucs does not need a working torch audio
/// backend for wav export; the downstream reader decodes mp3 fine.
pub struct DemucsVocalSeparator {
    model_name: String,
    device: String,
    mp3_bitrate: u32,
}

impl DemucsVocalSeparator {
    pub fn new(model_name: &str, device: &str, mp3_bitrate: u32) -> Self {
        Self {
            model_name: model_name.to_string(),
            device: device.to_string(),
            mp3_bitrate,
        }
    }
}

impl Default for DemucsVocalSeparator {
    fn default() -> Self {
        Self::new("htdemucs", "cpu", 256)
    }
}

impl VocalSeparator for DemucsVocalSeparator {
    fn separate(&self, input: &Path, work_dir: &Path) -> Result<PathBuf, MediaError> {
        fs::create_dir_all(work_dir).map_err(|e| MediaError::Io {
            path: work_dir.to_path_buf(),
            source: e,
        })?;

        let output = Command::new("demucs")
            .args(["-n", &self.model_name, "--two-stems=vocals"])
            .args(["-d", &self.device])
            .args(["--mp3", "--mp3-bitrate", &self.mp3_bitrate.to_string()])
            .args(["--filename", "{stem}.{ext}", "-o"])
            .arg(work_dir)
            .arg(input)
            .output()
            .map_err(|e| MediaError::Spawn {
                tool: "demucs",
                source: e,
            })?;

        if !output.status.success() {
            return Err(MediaError::Tool {
                tool: "demucs",
                status: output.status.code().unwrap_or(-1),
                stderr_tail: diagnostic_tail(
                    &String::from_utf8_lossy(&output.stderr),
                    STDERR_TAIL_CHARS,
                ),
            });
        }

        // Typical layout: <work_dir>/<model>/<input stem>/vocals.mp3
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let expected = work_dir.join(&self.model_name).join(&stem).join("vocals.mp3");
        if expected.exists() {
            return Ok(expected);
        }

        // Some demucs versions nest differently; scan before giving up
        if let Some(found) = find_vocals(&work_dir.join(&self.model_name)) {
            return Ok(found);
        }

        Err(MediaError::MissingOutput {
            tool: "demucs",
            missing: expected.display().to_string(),
        })
    }
}

fn find_vocals(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_vocals(&path) {
                return Some(found);
            }
        } else if path.file_name().is_some_and(|n| n == "vocals.mp3") {
            return Some(path);
        }
    }
    None
}
