use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{OVERLAP_MUSIC_SEC, OVERLAP_VOICE_SEC};

/// User-declared content type driving threshold and policy choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioProfile {
    Voice,
    Music,
}

impl AudioProfile {
    /// Symmetric per-window padding; music gets slightly more because sung
    /// phrase boundaries rarely line up with detected silences.
    pub fn overlap_sec(self) -> f64 {
        match self {
            AudioProfile::Music => OVERLAP_MUSIC_SEC,
            AudioProfile::Voice => OVERLAP_VOICE_SEC,
        }
    }
}

impl fmt::Display for AudioProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioProfile::Voice => write!(f, "voice"),
            AudioProfile::Music => write!(f, "music"),
        }
    }
}

impl FromStr for AudioProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" => Ok(AudioProfile::Voice),
            "music" => Ok(AudioProfile::Music),
            other => Err(format!("audio profile must be 'voice' or 'music', got '{other}'")),
        }
    }
}

/// User-declared quality/speed tradeoff driving search-width parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionTier {
    Fast,
    Balanced,
    MaxPrecision,
}

impl fmt::Display for PrecisionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecisionTier::Fast => write!(f, "fast"),
            PrecisionTier::Balanced => write!(f, "balanced"),
            PrecisionTier::MaxPrecision => write!(f, "max"),
        }
    }
}

impl FromStr for PrecisionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(PrecisionTier::Fast),
            "balanced" => Ok(PrecisionTier::Balanced),
            "max" => Ok(PrecisionTier::MaxPrecision),
            other => Err(format!(
                "precision must be 'fast', 'balanced' or 'max', got '{other}'"
            )),
        }
    }
}

/// Recognition parameters for one run, derived once from the settings and
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    pub language: String,
    pub temperature: f32,
    pub beam_size: i32,
    pub best_of: i32,
    pub no_speech_threshold: f32,
    pub logprob_threshold: f32,
    pub compression_ratio_threshold: f32,
    pub condition_on_previous_text: bool,
}

/// Map profile and precision tier to concrete decode parameters.
///
/// The language is always forced to stop the model drifting between
/// languages mid-run, and conditioning on the previous window's text is
/// disabled: windows are not contiguous, so carried context cascades
/// hallucinations instead of helping.
///
/// Music runs with laxer no-speech and log-probability cutoffs — vocals sit
/// on top of instrumentals and strict thresholds drop sung phrases. At max
/// precision music stays at temperature 0.0 with only the search widened;
/// sampling over a musical bed tends to invent words.
pub fn decode_config_for(
    precision: PrecisionTier,
    profile: AudioProfile,
    language: &str,
) -> DecodeConfig {
    let is_music = profile == AudioProfile::Music;

    let (temperature, beam_size, best_of) = match (precision, is_music) {
        (PrecisionTier::Fast, _) => (0.0, 1, 1),
        (PrecisionTier::Balanced, _) => (0.0, 5, 2),
        (PrecisionTier::MaxPrecision, true) => (0.0, 5, 3),
        (PrecisionTier::MaxPrecision, false) => (0.2, 7, 5),
    };

    DecodeConfig {
        language: language.to_string(),
        temperature,
        beam_size,
        best_of,
        no_speech_threshold: if is_music { 0.35 } else { 0.6 },
        logprob_threshold: if is_music { -1.2 } else { -1.0 },
        compression_ratio_threshold: 2.6,
        condition_on_previous_text: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(PrecisionTier::Fast, AudioProfile::Voice, 0.0, 1, 1)]
    #[case(PrecisionTier::Fast, AudioProfile::Music, 0.0, 1, 1)]
    #[case(PrecisionTier::Balanced, AudioProfile::Voice, 0.0, 5, 2)]
    #[case(PrecisionTier::Balanced, AudioProfile::Music, 0.0, 5, 2)]
    #[case(PrecisionTier::MaxPrecision, AudioProfile::Music, 0.0, 5, 3)]
    #[case(PrecisionTier::MaxPrecision, AudioProfile::Voice, 0.2, 7, 5)]
    fn test_search_width_table(
        #[case] precision: PrecisionTier,
        #[case] profile: AudioProfile,
        #[case] temperature: f32,
        #[case] beam_size: i32,
        #[case] best_of: i32,
    ) {
        let config = decode_config_for(precision, profile, "es");
        assert_relative_eq!(config.temperature, temperature);
        assert_eq!(config.beam_size, beam_size);
        assert_eq!(config.best_of, best_of);
    }

    #[test]
    fn test_music_thresholds_are_lenient() {
        let config = decode_config_for(PrecisionTier::Balanced, AudioProfile::Music, "es");
        assert_relative_eq!(config.no_speech_threshold, 0.35);
        assert_relative_eq!(config.logprob_threshold, -1.2);
    }

    #[test]
    fn test_voice_thresholds() {
        let config = decode_config_for(PrecisionTier::Balanced, AudioProfile::Voice, "es");
        assert_relative_eq!(config.no_speech_threshold, 0.6);
        assert_relative_eq!(config.logprob_threshold, -1.0);
    }

    #[test]
    fn test_base_fields_independent_of_tier() {
        for precision in [
            PrecisionTier::Fast,
            PrecisionTier::Balanced,
            PrecisionTier::MaxPrecision,
        ] {
            let config = decode_config_for(precision, AudioProfile::Voice, "en");
            assert_eq!(config.language, "en");
            assert!(!config.condition_on_previous_text);
            assert_relative_eq!(config.compression_ratio_threshold, 2.6);
        }
    }

    #[test]
    fn test_profile_overlap() {
        assert_relative_eq!(AudioProfile::Music.overlap_sec(), 0.15);
        assert_relative_eq!(AudioProfile::Voice.overlap_sec(), 0.10);
    }

    #[rstest]
    #[case("voice", AudioProfile::Voice)]
    #[case("music", AudioProfile::Music)]
    fn test_profile_round_trips_through_str(#[case] s: &str, #[case] profile: AudioProfile) {
        assert_eq!(s.parse::<AudioProfile>().unwrap(), profile);
        assert_eq!(profile.to_string(), s);
    }

    #[test]
    fn test_unknown_profile_rejected() {
        assert!("podcast".parse::<AudioProfile>().is_err());
    }

    #[rstest]
    #[case("fast", PrecisionTier::Fast)]
    #[case("balanced", PrecisionTier::Balanced)]
    #[case("max", PrecisionTier::MaxPrecision)]
    fn test_precision_round_trips_through_str(#[case] s: &str, #[case] tier: PrecisionTier) {
        assert_eq!(s.parse::<PrecisionTier>().unwrap(), tier);
        assert_eq!(tier.to_string(), s);
    }
}
