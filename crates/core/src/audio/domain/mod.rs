pub mod audio_reader;
pub mod audio_segment;
pub mod media_decoder;
pub mod segmenter;
pub mod silence_detector;
pub mod time_window;
pub mod vocal_separator;
