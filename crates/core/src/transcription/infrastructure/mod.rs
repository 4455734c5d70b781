pub mod model_cache;
pub mod model_resolver;
pub mod whisper_recognizer;
