//! Silence-aware media transcription pipeline.
//!
//! Turns an arbitrary-length media file into a cleaned text transcript by
//! chunking the audio at detected silences, decoding each window with a
//! speech-recognition model, and stitching the results back together with
//! drift control. External tools (media decoding, silence analysis, vocal
//! isolation) and the recognition model sit behind domain traits so callers
//! can swap or stub them.

pub mod audio;
pub mod pipeline;
pub mod shared;
pub mod text;
pub mod transcription;
