use std::sync::Arc;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext};

use crate::transcription::domain::decode_policy::DecodeConfig;
use crate::transcription::domain::speech_recognizer::{RecognizeError, SpeechRecognizer};

/// Speech recognizer backed by whisper.cpp via whisper-rs.
///
/// Holds a shared context (one load per model identifier, see
/// [`ModelCache`](super::model_cache::ModelCache)) and creates a fresh
/// decoder state per window.
pub struct WhisperRecognizer {
    ctx: Arc<WhisperContext>,
    n_threads: i32,
}

impl WhisperRecognizer {
    pub fn new(ctx: Arc<WhisperContext>) -> Self {
        Self {
            ctx,
            n_threads: num_cpus().min(4) as i32,
        }
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, samples: &[f32], config: &DecodeConfig) -> Result<String, RecognizeError> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| RecognizeError::Inference(format!("failed to create decoder state: {e}")))?;

        // whisper.cpp runs one strategy at a time: beam search when the
        // config widens the beam, otherwise greedy with best-of sampling.
        let strategy = if config.beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: config.beam_size,
                patience: 1.0,
            }
        } else {
            SamplingStrategy::Greedy {
                best_of: config.best_of,
            }
        };

        let mut params = FullParams::new(strategy);
        params.set_language(Some(config.language.as_str()));
        params.set_translate(false);
        params.set_no_context(!config.condition_on_previous_text);
        params.set_temperature(config.temperature);
        params.set_no_speech_thold(config.no_speech_threshold);
        params.set_logprob_thold(config.logprob_threshold);
        // whisper.cpp's entropy cutoff fills the role of the compression
        // ratio threshold: both abort degenerate repetitive decodes.
        params.set_entropy_thold(config.compression_ratio_threshold);
        params.set_suppress_blank(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(self.n_threads);

        state
            .full(params, samples)
            .map_err(|e| RecognizeError::Inference(format!("inference failed: {e}")))?;

        let mut text = String::new();
        let num_segments = state.full_n_segments();
        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };
            let piece = match segment.to_str_lossy() {
                Ok(t) => t,
                Err(_) => continue,
            };
            if !text.is_empty() && !piece.starts_with(char::is_whitespace) {
                text.push(' ');
            }
            text.push_str(&piece);
        }

        Ok(text.trim().to_string())
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
