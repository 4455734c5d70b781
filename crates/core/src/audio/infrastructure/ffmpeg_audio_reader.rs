use std::path::Path;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::media_decoder::MediaError;

/// In-memory audio decoding via ffmpeg-next.
///
/// Decodes the whole stream once, resampling to mono f32 at the target rate,
/// so the driver can slice windows out of the returned buffer.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<AudioSegment, MediaError> {
        ffmpeg_next::init().map_err(|e| MediaError::Decode(e.to_string()))?;

        let mut ictx =
            ffmpeg_next::format::input(path).map_err(|e| MediaError::Decode(e.to_string()))?;

        let audio_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| MediaError::NoAudio {
                path: path.to_path_buf(),
            })?;

        let audio_stream_index = audio_stream.index();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())
                .map_err(|e| MediaError::Decode(e.to_string()))?;
        let mut decoder = codec_ctx
            .decoder()
            .audio()
            .map_err(|e| MediaError::Decode(e.to_string()))?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )
        .map_err(|e| MediaError::Decode(e.to_string()))?;

        let mut all_samples: Vec<f32> = Vec::new();
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder
                .send_packet(&packet)
                .map_err(|e| MediaError::Decode(e.to_string()))?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler
                    .run(&decoded_frame, &mut resampled_frame)
                    .map_err(|e| MediaError::Decode(e.to_string()))?;
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        // Flush the decoder
        decoder
            .send_eof()
            .map_err(|e| MediaError::Decode(e.to_string()))?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler
                .run(&decoded_frame, &mut resampled_frame)
                .map_err(|e| MediaError::Decode(e.to_string()))?;
            extract_f32_samples(&resampled_frame, &mut all_samples);
        }

        // Flush the resampler (may have buffered samples)
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        Ok(AudioSegment::new(all_samples, target_sample_rate))
    }
}

/// Extract f32 samples from a planar mono resampled frame.
fn extract_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_read_audio_nonexistent_file() {
        let reader = FfmpegAudioReader;
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\file.wav")
        } else {
            Path::new("/nonexistent/file.wav")
        };
        let result = reader.read_audio(path, 16000);
        assert!(result.is_err());
    }
}
