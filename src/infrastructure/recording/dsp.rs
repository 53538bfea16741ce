//! Sample conversions between the capture device and the encoder

use rubato::{FftFixedIn, Resampler};

use crate::application::ports::EncoderError;

/// Resampler input chunk size in frames
const CHUNK_FRAMES: usize = 1024;

/// Average interleaved frames down to one channel
pub fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// f32 in [-1, 1] to i16, clamping anything outside
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Resample mono audio from `from` Hz to `to` Hz
pub fn resample(samples: &[i16], from: u32, to: u32) -> Result<Vec<i16>, EncoderError> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let input: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    let expected_len = (input.len() as f64 * to as f64 / from as f64).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, CHUNK_FRAMES, 2, 1)
        .map_err(|e| EncoderError::Finalize(format!("Resampler init failed: {}", e)))?;

    let mut output = Vec::with_capacity(expected_len + CHUNK_FRAMES);
    let mut position = 0;

    while position < input.len() {
        let needed = resampler.input_frames_next();
        let end = (position + needed).min(input.len());
        let mut frames = input[position..end].to_vec();
        // last chunk is zero-padded
        frames.resize(needed, 0.0);
        let chunk: Vec<Vec<f32>> = vec![frames];

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| EncoderError::Finalize(format!("Resampling failed: {}", e)))?;

        output.extend(
            resampled[0]
                .iter()
                .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16),
        );
        position = end;
    }

    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_single_channel_is_identity() {
        let mono = vec![100i16, 200, 300];
        assert_eq!(downmix(&mono, 1), mono);
    }

    #[test]
    fn downmix_averages_frames() {
        let stereo = vec![100i16, 200, 300, 400];
        assert_eq!(downmix(&stereo, 2), vec![150, 350]);
    }

    #[test]
    fn f32_conversion_clamps() {
        assert_eq!(f32_to_i16(&[0.0, 2.0, -2.0]), vec![0, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(resample(&samples, 44_100, 44_100).unwrap(), samples);
    }

    #[test]
    fn resample_scales_length() {
        let samples = vec![0i16; 48_000];
        let out = resample(&samples, 48_000, 16_000).unwrap();
        assert_eq!(out.len(), 16_000);
    }
}
