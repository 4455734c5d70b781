use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::decode_policy::{AudioProfile, PrecisionTier};

#[derive(Error, Debug)]
#[error("invalid settings: {0}")]
pub struct SettingsError(pub String);

/// Everything the caller chooses for one transcription run.
///
/// Immutable for the duration of the run and passed by reference into the
/// pipeline; the core never reads configuration from the environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSettings {
    /// Forced recognition language (ISO 639-1 code).
    pub language: String,
    /// Model identifier, resolved by the caller to loaded weights.
    pub model: String,
    pub profile: AudioProfile,
    pub precision: PrecisionTier,
    /// Collapse punctuation runs and drop recognizer-artifact lines.
    pub clean_text: bool,
    /// Collapse "su-u-u-u" / "soooo" style elongations.
    pub normalize_elongations: bool,
    /// Loudness floor for silence detection (negative dBFS).
    pub silence_db: i32,
    /// Minimum quiet span that counts as a segmentation boundary.
    pub min_silence_sec: f64,
    /// Minimum emitted window length.
    pub min_segment_sec: f64,
    /// Adjacent identical lines allowed before suppression kicks in.
    pub max_consecutive_repeats: usize,
}

impl RunSettings {
    /// Profile-tuned defaults: music favors a higher silence floor, shorter
    /// gaps, permissive elongation cleanup, and a looser repeat cap (choruses
    /// legitimately repeat).
    pub fn for_profile(profile: AudioProfile, language: &str, model: &str) -> Self {
        let is_music = profile == AudioProfile::Music;
        Self {
            language: language.to_string(),
            model: model.to_string(),
            profile,
            precision: PrecisionTier::Balanced,
            clean_text: true,
            normalize_elongations: is_music,
            silence_db: if is_music { -35 } else { -40 },
            min_silence_sec: if is_music { 0.30 } else { 0.45 },
            min_segment_sec: if is_music { 1.20 } else { 1.50 },
            max_consecutive_repeats: if is_music { 6 } else { 3 },
        }
    }

    /// Fail fast before any window processing begins.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.language.is_empty() {
            return Err(SettingsError("language must not be empty".into()));
        }
        if self.model.is_empty() {
            return Err(SettingsError("model must not be empty".into()));
        }
        if self.silence_db >= 0 {
            return Err(SettingsError(format!(
                "silence threshold must be negative dB, got {}",
                self.silence_db
            )));
        }
        if self.min_silence_sec <= 0.0 {
            return Err(SettingsError(format!(
                "minimum silence must be positive, got {}",
                self.min_silence_sec
            )));
        }
        if self.min_segment_sec <= 0.0 {
            return Err(SettingsError(format!(
                "minimum segment must be positive, got {}",
                self.min_segment_sec
            )));
        }
        if self.max_consecutive_repeats < 2 {
            return Err(SettingsError(format!(
                "max consecutive repeats must be at least 2, got {}",
                self.max_consecutive_repeats
            )));
        }
        Ok(())
    }
}
