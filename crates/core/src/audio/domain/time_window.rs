/// One bounded span of audio submitted as a single recognition call.
///
/// Produced by the segmenter in non-decreasing start order and never mutated;
/// the driver derives a padded copy per window instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl TimeWindow {
    pub fn new(start_sec: f64, end_sec: f64) -> Self {
        Self { start_sec, end_sec }
    }

    pub fn duration(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Symmetric overlap padding, clamped to `[0, total_duration]`.
    /// A non-positive `total_duration` means the duration is unknown and the
    /// end is left unclamped.
    pub fn padded(&self, overlap_sec: f64, total_duration: f64) -> TimeWindow {
        let start = (self.start_sec - overlap_sec).max(0.0);
        let end = if total_duration > 0.0 {
            (self.end_sec + overlap_sec).min(total_duration)
        } else {
            self.end_sec + overlap_sec
        };
        TimeWindow::new(start, end)
    }
}
