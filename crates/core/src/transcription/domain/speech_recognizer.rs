use thiserror::Error;

use super::decode_policy::DecodeConfig;

#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("failed to load recognition model: {0}")]
    ModelLoad(String),
    #[error("recognition failed: {0}")]
    Inference(String),
}

/// Domain interface for speech-to-text inference over one window.
///
/// Implementations load their model once and are invoked repeatedly; the
/// driver calls them strictly sequentially.
pub trait SpeechRecognizer: Send {
    /// Decode one window of 16 kHz mono samples to text. Whitespace-only
    /// output means the window carried no recognizable speech.
    fn transcribe(&self, samples: &[f32], config: &DecodeConfig) -> Result<String, RecognizeError>;
}
