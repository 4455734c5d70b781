use std::path::Path;

use super::audio_segment::AudioSegment;
use super::media_decoder::MediaError;

/// Domain interface for loading a decoded audio stream into memory.
///
/// The whole file is decoded once so the driver can slice windows out of the
/// buffer without repeated file I/O.
pub trait AudioReader: Send {
    fn read_audio(&self, path: &Path, target_sample_rate: u32)
        -> Result<AudioSegment, MediaError>;
}
