//! Recording check before a turn is sent to the server.
//!
//! ```rust
//! use gita_voice::audio::{AudioError, AudioQuality};
//!
//! let quality = AudioQuality::default();
//!
//! let speech = vec![0.1_f32; 16_000];
//! let level = quality.validate(&speech, 16_000).unwrap();
//! assert!((level.peak - 0.1).abs() < 1e-6);
//!
//! let silence = vec![0.0_f32; 16_000];
//! assert!(matches!(quality.validate(&silence, 16_000), Err(AudioError::TooQuiet { .. })));
//! ```

use crate::audio::error::AudioError;

/// Peak and RMS amplitude of a mono clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioLevel {
    pub peak: f32,
    pub rms: f32,
}

impl AudioLevel {
    pub fn measure(audio: &[f32]) -> Self {
        if audio.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = audio.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
        let energy: f64 = audio.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (energy / audio.len() as f64).sqrt() as f32;
        Self { peak, rms }
    }
}

/// Rejects empty, too-short and silent recordings.
#[derive(Debug, Clone)]
pub struct AudioQuality {
    pub min_recording_secs: f32,
    /// Peak amplitude below which a clip counts as silence.
    pub silence_threshold: f32,
}

impl Default for AudioQuality {
    fn default() -> Self {
        Self {
            min_recording_secs: 0.5,
            silence_threshold: 0.01,
        }
    }
}

impl AudioQuality {
    /// Check mono `audio` at `sample_rate` Hz and return its level.
    pub fn validate(&self, audio: &[f32], sample_rate: u32) -> Result<AudioLevel, AudioError> {
        if audio.is_empty() || sample_rate == 0 {
            return Err(AudioError::Empty);
        }

        let got_secs = audio.len() as f32 / sample_rate as f32;
        if got_secs < self.min_recording_secs {
            return Err(AudioError::TooShort {
                min_secs: self.min_recording_secs,
                got_secs,
            });
        }

        let level = AudioLevel::measure(audio);
        log::info!(
            "audio level: peak {:.4}, rms {:.4} over {got_secs:.1}s",
            level.peak,
            level.rms
        );
        if level.peak < self.silence_threshold {
            return Err(AudioError::TooQuiet {
                amplitude: level.peak,
                threshold: self.silence_threshold,
            });
        }
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(secs: f32, amplitude: f32) -> Vec<f32> {
        vec![amplitude; (secs * 16_000.0) as usize]
    }

    #[test]
    fn level_of_constant_signal() {
        let level = AudioLevel::measure(&[0.5, -0.5, 0.5, -0.5]);
        assert!((level.peak - 0.5).abs() < 1e-6);
        assert!((level.rms - 0.5).abs() < 1e-6);
        assert_eq!(AudioLevel::measure(&[]), AudioLevel { peak: 0.0, rms: 0.0 });
    }

    #[test]
    fn speech_passes() {
        let level = AudioQuality::default().validate(&tone(1.0, 0.3), 16_000).unwrap();
        assert!(level.peak > 0.29);
    }

    #[test]
    fn silence_is_rejected() {
        let err = AudioQuality::default()
            .validate(&tone(1.0, 0.0), 16_000)
            .unwrap_err();
        assert!(matches!(err, AudioError::TooQuiet { .. }), "{err}");
    }

    #[test]
    fn short_clip_is_rejected() {
        let err = AudioQuality::default()
            .validate(&tone(0.1, 0.3), 16_000)
            .unwrap_err();
        assert!(matches!(err, AudioError::TooShort { .. }), "{err}");
    }

    #[test]
    fn duration_uses_the_given_rate() {
        let quality = AudioQuality::default();
        // 0.5 s at 16 kHz, about 0.17 s at 48 kHz
        let audio = vec![0.2_f32; 8_000];
        assert!(quality.validate(&audio, 16_000).is_ok());
        assert!(matches!(
            quality.validate(&audio, 48_000),
            Err(AudioError::TooShort { .. })
        ));
    }

    #[test]
    fn empty_clip_is_rejected() {
        assert_eq!(AudioQuality::default().validate(&[], 16_000), Err(AudioError::Empty));
    }

    #[test]
    fn too_short_message_shows_both_durations() {
        let msg = AudioError::TooShort {
            min_secs: 0.5,
            got_secs: 0.1,
        }
        .to_string();
        assert!(msg.contains("0.10") && msg.contains("0.50"), "{msg}");
    }
}
