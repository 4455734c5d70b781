use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::media_decoder::MediaError;
use crate::audio::domain::segmenter::plan_windows;
use crate::audio::domain::silence_detector::{SilenceDetector, SilenceError};
use crate::shared::constants::{RTF_MAX, RTF_MIN, WHISPER_SAMPLE_RATE};
use crate::text::postprocess::postprocess;
use crate::transcription::domain::decode_policy::decode_config_for;
use crate::transcription::domain::progress::ProgressSink;
use crate::transcription::domain::run_settings::{RunSettings, SettingsError};
use crate::transcription::domain::run_stats::RunStats;
use crate::transcription::domain::speech_recognizer::{RecognizeError, SpeechRecognizer};

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Silence(#[from] SilenceError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Recognition(#[from] RecognizeError),
}

/// Result of one run. `transcript` is `None` when recognition completed but
/// produced no text anywhere: a normal outcome for speech-free audio, not
/// an error.
#[derive(Debug)]
pub struct RunOutput {
    pub transcript: Option<String>,
    pub stats: RunStats,
}

/// Orchestrates one transcription run: silence analysis, window planning,
/// one-pass audio decode, sequential per-window recognition, and transcript
/// cleanup.
///
/// Windows are processed strictly in order on the calling thread; a
/// recognizer failure aborts the run without delivering partial text.
///
/// Known limitation: the speed estimate behind the ETA is seeded from the
/// first window only and never re-estimated, so the projection is stable but
/// approximate.
pub struct TranscribeUseCase {
    silence_detector: Box<dyn SilenceDetector>,
    audio_reader: Box<dyn AudioReader>,
    recognizer: Box<dyn SpeechRecognizer>,
    progress: Box<dyn ProgressSink>,
}

impl TranscribeUseCase {
    pub fn new(
        silence_detector: Box<dyn SilenceDetector>,
        audio_reader: Box<dyn AudioReader>,
        recognizer: Box<dyn SpeechRecognizer>,
        progress: Box<dyn ProgressSink>,
    ) -> Self {
        Self {
            silence_detector,
            audio_reader,
            recognizer,
            progress,
        }
    }

    pub fn run(
        &mut self,
        audio_path: &Path,
        duration_sec: f64,
        settings: &RunSettings,
    ) -> Result<RunOutput, TranscribeError> {
        settings.validate()?;

        let silences = self.silence_detector.detect(
            audio_path,
            settings.silence_db,
            settings.min_silence_sec,
        )?;
        let windows = plan_windows(duration_sec, &silences, settings.min_segment_sec);
        log::debug!(
            "planned {} windows from {} silences",
            windows.len(),
            silences.len()
        );

        // One decode up front; every window slices out of this buffer
        let audio = self
            .audio_reader
            .read_audio(audio_path, WHISPER_SAMPLE_RATE)?;

        let config = decode_config_for(settings.precision, settings.profile, &settings.language);
        let overlap = settings.profile.overlap_sec();
        let total_audio_sec = windows
            .iter()
            .map(|w| w.duration())
            .sum::<f64>()
            .max(0.01);

        let mut fragments: Vec<String> = Vec::new();
        let mut processed = 0.0;
        let mut rtf: Option<f64> = None;

        for (i, window) in windows.iter().enumerate() {
            self.progress
                .info(&format!("Transcribing window {}/{}", i + 1, windows.len()));

            let padded = window.padded(overlap, duration_sec);
            let chunk = audio.slice_seconds(padded.start_sec, padded.end_sec);
            let chunk_sec = (chunk.len() as f64 / WHISPER_SAMPLE_RATE as f64).max(0.01);

            let started = Instant::now();
            let text = self.recognizer.transcribe(chunk, &config)?;
            let wall_sec = started.elapsed().as_secs_f64().max(0.001);

            if !text.trim().is_empty() {
                fragments.push(text.trim().to_string());
            }

            if rtf.is_none() {
                rtf = Some(seed_rtf(wall_sec, chunk_sec));
            }

            processed += window.duration().max(0.0);
            let percent = ((processed / total_audio_sec).min(1.0) * 100.0) as u8;
            let eta = rtf.map(|r| (total_audio_sec - processed).max(0.0) * r);
            self.progress.progress(percent, eta);
        }

        let stats = RunStats {
            segment_count: windows.len(),
            silence_db: settings.silence_db,
            min_silence_sec: settings.min_silence_sec,
            min_segment_sec: settings.min_segment_sec,
            rtf: rtf.unwrap_or(0.0),
        };

        let raw = fragments.join("\n");
        if raw.trim().is_empty() {
            return Ok(RunOutput {
                transcript: None,
                stats,
            });
        }

        let cleaned = postprocess(
            &raw,
            settings.clean_text,
            settings.normalize_elongations,
            settings.max_consecutive_repeats,
        );
        Ok(RunOutput {
            transcript: Some(cleaned),
            stats,
        })
    }
}

/// First-window speed estimate, clamped so an atypical first window cannot
/// skew the ETA projection.
pub fn seed_rtf(wall_sec: f64, audio_sec: f64) -> f64 {
    (wall_sec / audio_sec.max(0.01)).clamp(RTF_MIN, RTF_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    use crate::audio::domain::audio_segment::AudioSegment;
    use crate::audio::domain::silence_detector::SilenceSpan;
    use crate::transcription::domain::decode_policy::{AudioProfile, DecodeConfig};
    use crate::transcription::domain::progress::NullProgressSink;

    // ─── Stubs ───

    struct StubSilenceDetector {
        spans: Vec<SilenceSpan>,
        calls: Arc<Mutex<usize>>,
    }

    impl StubSilenceDetector {
        fn new(spans: Vec<SilenceSpan>) -> Self {
            Self {
                spans,
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl SilenceDetector for StubSilenceDetector {
        fn detect(
            &self,
            _: &Path,
            _: i32,
            _: f64,
        ) -> Result<Vec<SilenceSpan>, SilenceError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.spans.clone())
        }
    }

    struct FailingSilenceDetector;

    impl SilenceDetector for FailingSilenceDetector {
        fn detect(
            &self,
            _: &Path,
            _: i32,
            _: f64,
        ) -> Result<Vec<SilenceSpan>, SilenceError> {
            Err(SilenceError::Tool {
                status: 1,
                stderr_tail: "boom".into(),
            })
        }
    }

    struct StubAudioReader {
        seconds: f64,
    }

    impl AudioReader for StubAudioReader {
        fn read_audio(
            &self,
            _: &Path,
            target_sample_rate: u32,
        ) -> Result<AudioSegment, MediaError> {
            let len = (self.seconds * target_sample_rate as f64) as usize;
            Ok(AudioSegment::new(vec![0.0; len], target_sample_rate))
        }
    }

    /// Returns scripted texts in order and records each call's sample count.
    struct ScriptedRecognizer {
        texts: Vec<Result<String, String>>,
        calls: Arc<Mutex<Vec<usize>>>,
        configs: Arc<Mutex<Vec<DecodeConfig>>>,
    }

    impl ScriptedRecognizer {
        fn new(texts: &[&str]) -> Self {
            Self {
                texts: texts.iter().map(|t| Ok(t.to_string())).collect(),
                calls: Arc::new(Mutex::new(Vec::new())),
                configs: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing_at(texts: &[&str], failing_index: usize) -> Self {
            let mut recognizer = Self::new(texts);
            recognizer.texts[failing_index] = Err("gpu fell off".to_string());
            recognizer
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn transcribe(
            &self,
            samples: &[f32],
            config: &DecodeConfig,
        ) -> Result<String, RecognizeError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(samples.len());
            self.configs.lock().unwrap().push(config.clone());
            match self.texts.get(index) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(RecognizeError::Inference(message.clone())),
                None => Ok(String::new()),
            }
        }
    }

    struct RecordingProgress {
        events: Arc<Mutex<Vec<(u8, Option<f64>)>>>,
    }

    impl RecordingProgress {
        fn new() -> Self {
            Self {
                events: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ProgressSink for RecordingProgress {
        fn progress(&mut self, percent: u8, eta_seconds: Option<f64>) {
            self.events.lock().unwrap().push((percent, eta_seconds));
        }
        fn info(&mut self, _: &str) {}
    }

    // ─── Helpers ───

    fn settings() -> RunSettings {
        RunSettings::for_profile(AudioProfile::Voice, "es", "small")
    }

    // ─── Tests ───

    #[test]
    fn test_silence_gap_produces_two_windows_in_order() {
        let recognizer = ScriptedRecognizer::new(&["uno", "dos"]);
        let calls = recognizer.calls.clone();

        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![SilenceSpan::new(20.0, 25.0)])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(recognizer),
            Box::new(NullProgressSink),
        );

        let output = uc.run(Path::new("audio.wav"), 60.0, &settings()).unwrap();

        assert_eq!(output.transcript.as_deref(), Some("uno\ndos"));
        assert_eq!(output.stats.segment_count, 2);

        // Voice overlap pads each window by 0.10s on each side, clamped at 0
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_relative_eq!(calls[0] as f64 / 16000.0, 20.1, epsilon = 1e-3);
        assert_relative_eq!(calls[1] as f64 / 16000.0, 60.0 - 24.9, epsilon = 1e-3);
    }

    #[test]
    fn test_recognizer_failure_aborts_run_without_partial_output() {
        let recognizer = ScriptedRecognizer::failing_at(&["uno", "dos", "tres"], 1);
        let calls = recognizer.calls.clone();

        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![
                SilenceSpan::new(10.0, 15.0),
                SilenceSpan::new(30.0, 35.0),
            ])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(recognizer),
            Box::new(NullProgressSink),
        );

        let result = uc.run(Path::new("audio.wav"), 60.0, &settings());
        assert!(matches!(result, Err(TranscribeError::Recognition(_))));
        // Aborted at the second window: later windows never reach the model
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_all_empty_windows_is_empty_outcome_not_error() {
        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![SilenceSpan::new(20.0, 25.0)])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(ScriptedRecognizer::new(&["", "   "])),
            Box::new(NullProgressSink),
        );

        let output = uc.run(Path::new("audio.wav"), 60.0, &settings()).unwrap();
        assert!(output.transcript.is_none());
        assert_eq!(output.stats.segment_count, 2);
    }

    #[test]
    fn test_invalid_settings_fail_before_any_analysis() {
        let detector = StubSilenceDetector::new(vec![]);
        let detector_calls = detector.calls.clone();

        let mut uc = TranscribeUseCase::new(
            Box::new(detector),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(ScriptedRecognizer::new(&["uno"])),
            Box::new(NullProgressSink),
        );

        let mut bad = settings();
        bad.silence_db = 5;
        let result = uc.run(Path::new("audio.wav"), 60.0, &bad);
        assert!(matches!(result, Err(TranscribeError::Settings(_))));
        assert_eq!(*detector_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_silence_detector_failure_propagates() {
        let mut uc = TranscribeUseCase::new(
            Box::new(FailingSilenceDetector),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(ScriptedRecognizer::new(&["uno"])),
            Box::new(NullProgressSink),
        );

        let result = uc.run(Path::new("audio.wav"), 60.0, &settings());
        assert!(matches!(result, Err(TranscribeError::Silence(_))));
    }

    #[test]
    fn test_progress_reaches_one_hundred_with_eta() {
        let progress = RecordingProgress::new();
        let events = progress.events.clone();

        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![SilenceSpan::new(20.0, 25.0)])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(ScriptedRecognizer::new(&["uno", "dos"])),
            Box::new(progress),
        );

        uc.run(Path::new("audio.wav"), 60.0, &settings()).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        for pair in events.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
        assert_eq!(events.last().unwrap().0, 100);
        // ETA is available from the first boundary on (estimate seeded there)
        assert!(events.iter().all(|(_, eta)| eta.is_some()));
        assert_relative_eq!(events.last().unwrap().1.unwrap(), 0.0);
    }

    #[test]
    fn test_stats_carry_segmentation_parameters_and_clamped_rtf() {
        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![SilenceSpan::new(20.0, 25.0)])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(ScriptedRecognizer::new(&["uno", "dos"])),
            Box::new(NullProgressSink),
        );

        let settings = settings();
        let output = uc.run(Path::new("audio.wav"), 60.0, &settings).unwrap();

        assert_eq!(output.stats.silence_db, settings.silence_db);
        assert_relative_eq!(output.stats.min_silence_sec, settings.min_silence_sec);
        assert_relative_eq!(output.stats.min_segment_sec, settings.min_segment_sec);
        // A stub recognizer answers instantly, so the estimate hits the floor
        assert_relative_eq!(output.stats.rtf, RTF_MIN);
    }

    #[test]
    fn test_unknown_duration_transcribes_whole_buffer_in_one_window() {
        let recognizer = ScriptedRecognizer::new(&["todo"]);
        let calls = recognizer.calls.clone();

        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![])),
            Box::new(StubAudioReader { seconds: 30.0 }),
            Box::new(recognizer),
            Box::new(NullProgressSink),
        );

        let output = uc.run(Path::new("audio.wav"), 0.0, &settings()).unwrap();
        assert_eq!(output.transcript.as_deref(), Some("todo"));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        // The unbounded placeholder window clamps to the decoded buffer
        assert_eq!(calls[0], 30 * 16000);
    }

    #[test]
    fn test_transcript_is_postprocessed() {
        let noisy = format!("hola{}", "!".repeat(10));
        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![SilenceSpan::new(20.0, 25.0)])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(ScriptedRecognizer::new(&[&noisy, "adiós"])),
            Box::new(NullProgressSink),
        );

        let output = uc.run(Path::new("audio.wav"), 60.0, &settings()).unwrap();
        assert_eq!(output.transcript.as_deref(), Some("hola!!!\nadiós"));
    }

    #[test]
    fn test_decode_config_derived_once_and_shared_by_all_windows() {
        let recognizer = ScriptedRecognizer::new(&["uno", "dos"]);
        let configs = recognizer.configs.clone();

        let mut uc = TranscribeUseCase::new(
            Box::new(StubSilenceDetector::new(vec![SilenceSpan::new(20.0, 25.0)])),
            Box::new(StubAudioReader { seconds: 60.0 }),
            Box::new(recognizer),
            Box::new(NullProgressSink),
        );

        uc.run(Path::new("audio.wav"), 60.0, &settings()).unwrap();

        let configs = configs.lock().unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0], configs[1]);
        assert_eq!(configs[0].language, "es");
        assert!(!configs[0].condition_on_previous_text);
    }

    #[test]
    fn test_seed_rtf_clamps_extremes() {
        assert_relative_eq!(seed_rtf(20.0, 1.0), RTF_MAX);
        assert_relative_eq!(seed_rtf(0.1, 1.0), RTF_MIN);
        assert_relative_eq!(seed_rtf(2.0, 1.0), 2.0);
    }
}
