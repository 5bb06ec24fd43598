//! Audio handling for both ends of a turn.
//!
//! # Server side
//!
//! ```text
//! request body (i16 LE) → decode_pcm16 → mono f32 → transcription
//!                                      └→ write_wav_file (file fallback)
//! ```
//!
//! # Client side
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → downmix → resample
//!           → AudioQuality → encode_pcm16 → POST
//! response audio (WAV) → play_wav
//! ```

pub mod capture;
pub mod error;
pub mod pcm;
pub mod playback;
pub mod quality;
pub mod resample;
pub mod wav;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use error::AudioError;
pub use pcm::{decode_pcm16, encode_pcm16};
pub use playback::{play_wav, Playback};
pub use quality::{AudioLevel, AudioQuality};
pub use resample::{downmix, resample};
pub use wav::{read_wav_file, samples_to_wav, wav_duration_secs, write_wav_file};
