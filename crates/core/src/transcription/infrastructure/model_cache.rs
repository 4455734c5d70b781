use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use whisper_rs::{WhisperContext, WhisperContextParameters};

use crate::transcription::domain::speech_recognizer::RecognizeError;

/// Load-once-reuse-many cache of recognition contexts, keyed by model
/// identifier.
///
/// The map lock is held across a miss, so two callers can never load the
/// same identifier concurrently; later callers get the shared handle.
pub struct ModelCache {
    contexts: Mutex<HashMap<String, Arc<WhisperContext>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            contexts: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_load(
        &self,
        model: &str,
        weights_path: &Path,
    ) -> Result<Arc<WhisperContext>, RecognizeError> {
        let mut contexts = self
            .contexts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(ctx) = contexts.get(model) {
            return Ok(ctx.clone());
        }

        log::info!("loading model '{model}' from {}", weights_path.display());
        let path_str = weights_path
            .to_str()
            .ok_or_else(|| RecognizeError::ModelLoad("weights path is not valid UTF-8".into()))?;
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| RecognizeError::ModelLoad(e.to_string()))?;

        let ctx = Arc::new(ctx);
        contexts.insert(model.to_string(), ctx.clone());
        Ok(ctx)
    }

    pub fn is_loaded(&self, model: &str) -> bool {
        self.contexts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(model)
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
