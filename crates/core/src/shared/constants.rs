/// Sample rate every pipeline stage works at; the decode boundary resamples to it.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// ggml weights fetched on first use, keyed by the user-facing model name.
pub const WHISPER_MODELS: &[(&str, &str)] = &[
    (
        "small",
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
    ),
    (
        "medium",
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
    ),
    (
        "large",
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
    ),
];

/// Silence-derived window count above which fixed chunking takes over.
/// Dense music easily produces dozens of tiny gaps.
pub const MAX_SILENCE_WINDOWS: usize = 18;

/// Chunk width when the silence pass produced too many windows.
pub const DENSE_CHUNK_SEC: f64 = 22.0;

/// Chunk width when the silence pass produced no usable windows.
pub const FALLBACK_CHUNK_SEC: f64 = 20.0;

/// Placeholder end time for audio of unknown duration.
pub const UNBOUNDED_WINDOW_END: f64 = 999_999.0;

/// Symmetric per-window padding, by audio profile.
pub const OVERLAP_MUSIC_SEC: f64 = 0.15;
pub const OVERLAP_VOICE_SEC: f64 = 0.10;

/// Clamp range for the real-time-factor estimate seeded from the first
/// window; an atypically short first window would otherwise swing the ETA
/// wildly.
pub const RTF_MIN: f64 = 0.4;
pub const RTF_MAX: f64 = 12.0;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac", "wma", "opus"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "wmv", "flv"];
