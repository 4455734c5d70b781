use crate::transcription::domain::decode_policy::{AudioProfile, PrecisionTier};
use crate::transcription::domain::run_stats::RunStats;

pub const SERVICE_NAME: &str = "Mediascribe";

/// Everything the exported header records about a run.
///
/// `generated_at` is a caller-formatted timestamp string; the core stays
/// clock-free.
pub struct ExportInfo<'a> {
    pub source_filename: &'a str,
    pub generated_at: &'a str,
    pub language: &'a str,
    pub model: &'a str,
    pub profile: AudioProfile,
    pub precision: PrecisionTier,
    pub duration_sec: f64,
    pub stats: &'a RunStats,
}

/// Transcript file contents: a traceable header followed by the text.
pub fn build_transcript_file(transcript: &str, info: &ExportInfo<'_>) -> String {
    let stats = info.stats;
    let header = [
        format!("{SERVICE_NAME} — transcript"),
        format!("Generated: {}", info.generated_at),
        format!("Source: {}", info.source_filename),
        format!("Language: {}", info.language),
        format!("Model: {}", info.model),
        format!("Audio profile: {}", info.profile),
        format!("Precision: {}", info.precision),
        format!("Duration: {:.1}s", info.duration_sec),
        format!(
            "Segmentation: silences (threshold {} dB, min silence {}s, min segment {}s)",
            stats.silence_db, stats.min_silence_sec, stats.min_segment_sec
        ),
        format!("Segments: {}", stats.segment_count),
        "-".repeat(60),
        String::new(),
    ];
    format!("{}\n{}\n", header.join("\n"), transcript.trim())
}

/// Traceable download filename: base name plus model, profile, and precision.
pub fn make_output_name(
    source_filename: &str,
    model: &str,
    profile: AudioProfile,
    precision: PrecisionTier,
) -> String {
    let base = source_filename
        .rsplit_once('.')
        .map(|(base, _)| base)
        .unwrap_or(source_filename);
    format!(
        "{base}_{}_{model}_{profile}_{precision}.txt",
        SERVICE_NAME.to_lowercase()
    )
}
