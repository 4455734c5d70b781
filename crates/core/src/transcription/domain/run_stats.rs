use serde::Serialize;

/// Summary statistics returned alongside the transcript, once per run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunStats {
    pub segment_count: usize,
    pub silence_db: i32,
    pub min_silence_sec: f64,
    pub min_segment_sec: f64,
    /// Wall-clock time per second of audio, estimated from the first window.
    pub rtf: f64,
}
