/// Cross-cutting sink for run progress.
///
/// Decouples the driver from specific output mechanisms (stderr, GUI
/// signals, log crate) so each caller can observe the run without changing
/// the orchestration code. Called only at window boundaries.
pub trait ProgressSink: Send {
    /// Completion after a window: percent of audio processed and, once the
    /// speed estimate is seeded, projected seconds remaining.
    fn progress(&mut self, percent: u8, eta_seconds: Option<f64>);

    /// Human-readable status message.
    fn info(&mut self, message: &str);
}

/// Silent sink that discards all events; for tests and callers with their
/// own progress channel.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn progress(&mut self, _percent: u8, _eta_seconds: Option<f64>) {}
    fn info(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_all_methods_are_noop() {
        let mut sink = NullProgressSink;
        sink.progress(50, Some(12.0));
        sink.info("hello");
        // No panics = success
    }
}
