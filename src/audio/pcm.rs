//! Raw PCM wire format: interleaved little-endian `i16`.
//!
//! The client posts this format as the request body; the server decodes it
//! into mono `f32` samples in `[-1.0, 1.0)` for transcription.

use crate::audio::error::AudioError;

/// Decode little-endian `i16` PCM into `f32` samples scaled by `1/32768`.
///
/// * An odd trailing byte is dropped.
/// * With `channels > 1` and a sample count divisible by `channels`, only
///   the first channel is kept. Otherwise the samples are used as they are.
///
/// Returns [`AudioError::Empty`] when no whole sample is present.
pub fn decode_pcm16(bytes: &[u8], channels: u16) -> Result<Vec<f32>, AudioError> {
    if bytes.len() % 2 != 0 {
        log::debug!("pcm: dropping odd trailing byte ({} bytes)", bytes.len());
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    if samples.is_empty() {
        return Err(AudioError::Empty);
    }

    let channels = channels as usize;
    let mono: Vec<i16> = if channels > 1 && samples.len() % channels == 0 {
        samples.iter().step_by(channels).copied().collect()
    } else {
        if channels > 1 {
            log::warn!(
                "pcm: {} samples do not divide into {channels} channels, treating as mono",
                samples.len()
            );
        }
        samples
    };

    Ok(mono.into_iter().map(|s| s as f32 / 32768.0).collect())
}

/// Encode `f32` samples as little-endian `i16` PCM, clamping to full scale.
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| to_i16(s).to_le_bytes())
        .collect()
}

/// Convert one `f32` sample in `[-1.0, 1.0]` to `i16`.
pub(crate) fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn le(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_and_scales() {
        let out = decode_pcm16(&le(&[0, 16384, -32768, 32767]), 1).unwrap();
        assert_eq!(out, vec![0.0, 0.5, -1.0, 32767.0 / 32768.0]);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let mut bytes = le(&[16384, -16384]);
        bytes.push(0x7f);
        let out = decode_pcm16(&bytes, 1).unwrap();
        assert_eq!(out, vec![0.5, -0.5]);
    }

    #[test]
    fn empty_and_single_byte_are_errors() {
        assert_eq!(decode_pcm16(&[], 1), Err(AudioError::Empty));
        assert_eq!(decode_pcm16(&[1], 1), Err(AudioError::Empty));
    }

    #[test]
    fn keeps_first_channel_when_divisible() {
        let out = decode_pcm16(&le(&[16384, 0, -16384, 0]), 2).unwrap();
        assert_eq!(out, vec![0.5, -0.5]);
    }

    #[test]
    fn indivisible_multichannel_is_treated_as_mono() {
        let out = decode_pcm16(&le(&[16384, 0, -16384]), 2).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn encode_then_decode_is_close() {
        let samples = vec![0.0f32, 0.25, -0.75, 0.999];
        let decoded = decode_pcm16(&encode_pcm16(&samples), 1).unwrap();
        for (a, b) in samples.iter().zip(&decoded) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn encode_clamps_out_of_range() {
        let bytes = encode_pcm16(&[2.0, -2.0]);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), i16::MIN);
    }
}
