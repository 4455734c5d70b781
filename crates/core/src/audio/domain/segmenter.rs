use crate::shared::constants::{
    DENSE_CHUNK_SEC, FALLBACK_CHUNK_SEC, MAX_SILENCE_WINDOWS, UNBOUNDED_WINDOW_END,
};

use super::silence_detector::SilenceSpan;
use super::time_window::TimeWindow;

/// Convert silence intervals into the non-silent spans between and around
/// them, keeping only spans of at least `min_segment` seconds.
///
/// Silences are expected in non-overlapping increasing order. An unknown
/// total duration (<= 0) yields a single unbounded placeholder window.
pub fn build_segments_from_silences(
    total_sec: f64,
    silences: &[SilenceSpan],
    min_segment: f64,
) -> Vec<TimeWindow> {
    if total_sec <= 0.0 {
        return vec![TimeWindow::new(0.0, UNBOUNDED_WINDOW_END)];
    }

    let mut windows = Vec::new();
    let mut cur = 0.0;

    for silence in silences {
        if silence.start_sec > cur {
            let window = TimeWindow::new(cur, silence.start_sec);
            if window.duration() >= min_segment {
                windows.push(window);
            }
        }
        cur = cur.max(silence.end_sec);
    }

    if cur < total_sec {
        let window = TimeWindow::new(cur, total_sec);
        if window.duration() >= min_segment {
            windows.push(window);
        }
    }

    windows
}

/// Fixed-width slicing fallback: consecutive `chunk_sec` windows, the last
/// truncated to `total_sec`.
pub fn build_fixed_segments(total_sec: f64, chunk_sec: f64) -> Vec<TimeWindow> {
    if total_sec <= 0.0 {
        return vec![TimeWindow::new(0.0, UNBOUNDED_WINDOW_END)];
    }

    let mut windows = Vec::new();
    let mut t = 0.0;
    while t < total_sec {
        windows.push(TimeWindow::new(t, (t + chunk_sec).min(total_sec)));
        t += chunk_sec;
    }

    windows
}

/// Full window-planning policy: silence-based segmentation with two fixed
/// fallbacks bounding the number of recognizer invocations.
///
/// Too many silence-derived windows (dense music) falls back to wide fixed
/// chunks; one window or none (no detected silence) falls back to narrower
/// fixed chunks so the run still makes forward progress.
pub fn plan_windows(
    total_sec: f64,
    silences: &[SilenceSpan],
    min_segment: f64,
) -> Vec<TimeWindow> {
    let mut windows = build_segments_from_silences(total_sec, silences, min_segment);

    if windows.len() > MAX_SILENCE_WINDOWS && total_sec > 0.0 {
        windows = build_fixed_segments(total_sec, DENSE_CHUNK_SEC);
    }

    if windows.len() <= 1 {
        windows = build_fixed_segments(total_sec, FALLBACK_CHUNK_SEC);
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn spans(pairs: &[(f64, f64)]) -> Vec<SilenceSpan> {
        pairs.iter().map(|&(s, e)| SilenceSpan::new(s, e)).collect()
    }

    #[test]
    fn test_silence_in_the_middle_splits_audio() {
        let windows = build_segments_from_silences(60.0, &spans(&[(20.0, 25.0)]), 1.0);
        assert_eq!(
            windows,
            vec![TimeWindow::new(0.0, 20.0), TimeWindow::new(25.0, 60.0)]
        );
    }

    #[test]
    fn test_no_silences_yields_single_full_window() {
        let windows = build_segments_from_silences(30.0, &[], 1.0);
        assert_eq!(windows, vec![TimeWindow::new(0.0, 30.0)]);
    }

    #[test]
    fn test_leading_silence_skipped() {
        let windows = build_segments_from_silences(30.0, &spans(&[(0.0, 5.0)]), 1.0);
        assert_eq!(windows, vec![TimeWindow::new(5.0, 30.0)]);
    }

    #[test]
    fn test_trailing_silence_skipped() {
        let windows = build_segments_from_silences(30.0, &spans(&[(25.0, 30.0)]), 1.0);
        assert_eq!(windows, vec![TimeWindow::new(0.0, 25.0)]);
    }

    #[test]
    fn test_short_spans_dropped_by_min_segment() {
        // 2s gap between the silences is below the 3s minimum
        let windows =
            build_segments_from_silences(60.0, &spans(&[(10.0, 20.0), (22.0, 30.0)]), 3.0);
        assert_eq!(
            windows,
            vec![TimeWindow::new(0.0, 10.0), TimeWindow::new(30.0, 60.0)]
        );
    }

    #[test]
    fn test_unknown_duration_yields_placeholder() {
        let windows = build_segments_from_silences(0.0, &spans(&[(1.0, 2.0)]), 1.0);
        assert_eq!(windows, vec![TimeWindow::new(0.0, UNBOUNDED_WINDOW_END)]);
    }

    #[test]
    fn test_windows_are_ordered_disjoint_and_cover_audio() {
        let silences = spans(&[(8.0, 10.0), (20.0, 23.0), (40.0, 42.5)]);
        let windows = build_segments_from_silences(60.0, &silences, 0.5);

        for pair in windows.windows(2) {
            assert!(pair[0].end_sec <= pair[1].start_sec);
        }
        for w in &windows {
            assert!(w.duration() >= 0.5);
        }

        // Windows plus silences reconstruct [0, 60]
        let covered: f64 = windows.iter().map(|w| w.duration()).sum::<f64>()
            + silences.iter().map(|s| s.end_sec - s.start_sec).sum::<f64>();
        assert_relative_eq!(covered, 60.0);
    }

    #[rstest]
    #[case(60.0, 20.0, 3)]
    #[case(60.0, 22.0, 3)]
    #[case(45.0, 22.0, 3)]
    #[case(10.0, 20.0, 1)]
    fn test_fixed_segments_count(#[case] total: f64, #[case] chunk: f64, #[case] expected: usize) {
        assert_eq!(build_fixed_segments(total, chunk).len(), expected);
    }

    #[test]
    fn test_fixed_segments_cover_without_gaps() {
        let windows = build_fixed_segments(50.0, 22.0);
        assert_relative_eq!(windows[0].start_sec, 0.0);
        for pair in windows.windows(2) {
            assert_relative_eq!(pair[0].end_sec, pair[1].start_sec);
        }
        assert_relative_eq!(windows.last().unwrap().end_sec, 50.0);
        // All but the last have full width
        for w in &windows[..windows.len() - 1] {
            assert_relative_eq!(w.duration(), 22.0);
        }
        assert_relative_eq!(windows.last().unwrap().duration(), 6.0);
    }

    #[test]
    fn test_fixed_segments_evenly_divisible_last_is_full() {
        let windows = build_fixed_segments(60.0, 20.0);
        assert_eq!(windows.len(), 3);
        assert_relative_eq!(windows.last().unwrap().duration(), 20.0);
    }

    #[test]
    fn test_fixed_segments_unknown_duration_yields_placeholder() {
        let windows = build_fixed_segments(0.0, 20.0);
        assert_eq!(windows, vec![TimeWindow::new(0.0, UNBOUNDED_WINDOW_END)]);
    }

    #[test]
    fn test_plan_keeps_silence_segmentation_when_reasonable() {
        let windows = plan_windows(60.0, &spans(&[(20.0, 25.0)]), 1.0);
        assert_eq!(
            windows,
            vec![TimeWindow::new(0.0, 20.0), TimeWindow::new(25.0, 60.0)]
        );
    }

    #[test]
    fn test_plan_falls_back_to_dense_chunks_on_many_windows() {
        // 20 one-second silences at every 2s produce > 18 windows
        let silences: Vec<SilenceSpan> = (0..20)
            .map(|i| SilenceSpan::new(1.0 + 2.0 * i as f64, 2.0 + 2.0 * i as f64))
            .collect();
        let windows = plan_windows(100.0, &silences, 0.2);
        assert_eq!(windows.len(), (100.0 / DENSE_CHUNK_SEC).ceil() as usize);
        assert_relative_eq!(windows[0].duration(), DENSE_CHUNK_SEC);
    }

    #[test]
    fn test_plan_falls_back_to_fixed_chunks_on_single_window() {
        let windows = plan_windows(100.0, &[], 1.0);
        assert_eq!(windows.len(), 5);
        assert_relative_eq!(windows[0].duration(), FALLBACK_CHUNK_SEC);
    }

    #[test]
    fn test_plan_unknown_duration_yields_placeholder() {
        let windows = plan_windows(0.0, &[], 1.0);
        assert_eq!(windows, vec![TimeWindow::new(0.0, UNBOUNDED_WINDOW_END)]);
    }
}
