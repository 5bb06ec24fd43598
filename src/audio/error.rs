//! Audio error type shared by decoding, validation, capture and playback.

use thiserror::Error;

/// Reason an audio operation failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// No samples were supplied.
    #[error("no audio data")]
    Empty,

    /// Recording is shorter than the configured minimum.
    #[error("recording too short: {got_secs:.2}s (minimum {min_secs:.2}s)")]
    TooShort { min_secs: f32, got_secs: f32 },

    /// All samples are below the silence floor.
    #[error("audio too quiet: max amplitude {amplitude:.4} (threshold {threshold:.4})")]
    TooQuiet { amplitude: f32, threshold: f32 },

    /// WAV encoding or decoding failed.
    #[error("WAV error: {0}")]
    Wav(String),

    /// No player could output the clip.
    #[error("playback failed: {0}")]
    Playback(String),
}

impl From<hound::Error> for AudioError {
    fn from(e: hound::Error) -> Self {
        AudioError::Wav(e.to_string())
    }
}
