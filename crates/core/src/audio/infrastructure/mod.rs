pub mod demucs_vocal_separator;
pub mod ffmpeg_audio_reader;
pub mod ffmpeg_cli_decoder;
pub mod ffmpeg_silence_detector;
