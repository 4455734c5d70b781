/// Decoded mono PCM audio: samples normalized to [-1.0, 1.0].
///
/// Produced once per run by an [`AudioReader`](super::audio_reader::AudioReader)
/// and read-only afterwards, so windows may be sliced from it repeatedly
/// without touching the file again.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn sample_index_at_time(&self, time: f64) -> usize {
        (time * self.sample_rate as f64) as usize
    }

    /// Samples covering `[start_sec, end_sec)`, clamped to the buffer.
    pub fn slice_seconds(&self, start_sec: f64, end_sec: f64) -> &[f32] {
        let start = self.sample_index_at_time(start_sec.max(0.0)).min(self.samples.len());
        let end = self.sample_index_at_time(end_sec.max(0.0)).min(self.samples.len());
        &self.samples[start..end.max(start)]
    }
}
