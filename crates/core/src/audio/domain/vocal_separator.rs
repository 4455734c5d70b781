use std::path::{Path, PathBuf};

use super::media_decoder::MediaError;

/// Domain interface for isolating vocals from a mixed recording before
/// transcription.
///
/// Implementations write their stems under `work_dir` and return the path to
/// the vocals stream. The caller owns `work_dir` and deletes it when done.
pub trait VocalSeparator: Send {
    fn separate(&self, input: &Path, work_dir: &Path) -> Result<PathBuf, MediaError>;
}
