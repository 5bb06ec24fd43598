//! Channel mixing and rate conversion for captured audio.
//!
//! Microphones deliver interleaved audio at their native rate (commonly
//! 44.1 or 48 kHz); the request body is mono at `audio.sample_rate`.

/// Average interleaved frames down to mono.
///
/// A trailing partial frame is dropped; `channels == 0` yields nothing.
///
/// ```rust
/// use gita_voice::audio::downmix;
///
/// let mono = downmix(&[0.5_f32, -0.5, 0.2, -0.2], 2);
/// assert_eq!(mono, vec![0.0, 0.0]);
/// ```
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    let width = channels as usize;
    match width {
        0 => Vec::new(),
        1 => samples.to_vec(),
        _ => samples
            .chunks_exact(width)
            .map(|frame| frame.iter().sum::<f32>() / width as f32)
            .collect(),
    }
}

/// Linear-interpolation rate conversion of mono samples.
///
/// Produces `ceil(len * to / from)` samples; the last input sample is held
/// past the end.
///
/// ```rust
/// use gita_voice::audio::resample;
///
/// assert_eq!(resample(&vec![0.5_f32; 480], 48_000, 16_000).len(), 160);
/// ```
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return samples.to_vec();
    }
    let Some(&last) = samples.last() else {
        return Vec::new();
    };
    if from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }

    let step = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / step).ceil() as usize;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples.get(idx).copied().unwrap_or(last);
            let b = samples.get(idx + 1).copied().unwrap_or(a);
            a + (b - a) * frac
        })
        .collect()
}
