//! Direct sample transcription.
//!
//! [`SttEngine`] takes mono 16 kHz `f32` samples and returns text. It is
//! object-safe and `Send + Sync` so the shared model context can hold it as
//! `Arc<dyn SttEngine>`. [`WhisperEngine`] is the local implementation on
//! top of `whisper-rs`.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::stt::transcribe::TranscribeParams;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum SttError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// `whisper-rs` failed to create a context or per-call state.
    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Audio too short: minimum 0.5 s (8 000 samples at 16 kHz)")]
    AudioTooShort,

    #[error("Audio too long: maximum 60 s (960 000 samples at 16 kHz)")]
    AudioTooLong,

    #[error("transcription request failed: {0}")]
    Request(String),

    #[error("transcription request timed out")]
    Timeout,

    /// Writing or reading the WAV file for the file-based path failed.
    #[error("failed to write temporary WAV: {0}")]
    Wav(String),

    #[error("no transcription backend available")]
    NoBackend,
}

impl From<reqwest::Error> for SttError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SttError::Timeout
        } else {
            SttError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// Speech-to-text over raw samples.
///
/// Inputs outside `[MIN_AUDIO_SAMPLES, MAX_AUDIO_SAMPLES]` are rejected with
/// [`SttError::AudioTooShort`] / [`SttError::AudioTooLong`].
pub trait SttEngine: Send + Sync {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError>;
}

/// 0.5 s at 16 kHz.
pub const MIN_AUDIO_SAMPLES: usize = 8_000;
/// 60 s at 16 kHz.
pub const MAX_AUDIO_SAMPLES: usize = 960_000;

fn check_length(audio: &[f32]) -> Result<(), SttError> {
    if audio.len() < MIN_AUDIO_SAMPLES {
        return Err(SttError::AudioTooShort);
    }
    if audio.len() > MAX_AUDIO_SAMPLES {
        return Err(SttError::AudioTooLong);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// WhisperEngine
// ---------------------------------------------------------------------------

/// Local Whisper model.
///
/// The context is loaded once and never mutated; every call creates its own
/// `WhisperState`, so concurrent turns need no lock.
pub struct WhisperEngine {
    ctx: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// SAFETY: whisper-rs declares WhisperContext Send + Sync; the weights are
// read-only after loading and per-call state is never shared.
unsafe impl Send for WhisperEngine {}
unsafe impl Sync for WhisperEngine {}

impl WhisperEngine {
    /// Load a GGML model file.
    pub fn load(model_path: impl AsRef<Path>, params: TranscribeParams) -> Result<Self, SttError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }
        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!("non-UTF-8 model path: {}", path.display()))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        Ok(Self { ctx, params })
    }
}

impl SttEngine for WhisperEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        check_length(audio)?;

        let mut fp = FullParams::new(SamplingStrategy::Greedy {
            best_of: self.params.best_of,
        });
        fp.set_language(self.params.whisper_language());
        fp.set_n_threads(self.params.n_threads);
        fp.set_print_progress(false);
        fp.set_print_realtime(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        let started = std::time::Instant::now();
        state
            .full(fp, audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;
            text.push_str(&segment);
        }

        log::debug!(
            "stt: {} samples transcribed in {} ms",
            audio.len(),
            started.elapsed().as_millis()
        );
        Ok(text.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// MockSttEngine  (test-only)
// ---------------------------------------------------------------------------

/// Returns a fixed reply without loading a model.
#[cfg(test)]
pub struct MockSttEngine {
    response: Result<String, SttError>,
}

#[cfg(test)]
impl MockSttEngine {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    pub fn err(error: SttError) -> Self {
        Self { response: Err(error) }
    }
}

#[cfg(test)]
impl SttEngine for MockSttEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        check_length(audio)?;
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_reply() {
        let audio = vec![0.0f32; MIN_AUDIO_SAMPLES];
        assert_eq!(
            MockSttEngine::ok("what is my duty").transcribe(&audio).unwrap(),
            "what is my duty"
        );
        let err = MockSttEngine::err(SttError::Transcription("boom".into()))
            .transcribe(&audio)
            .unwrap_err();
        assert!(matches!(err, SttError::Transcription(_)));
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(check_length(&vec![0.0; MIN_AUDIO_SAMPLES]).is_ok());
        assert!(check_length(&vec![0.0; MAX_AUDIO_SAMPLES]).is_ok());
        assert!(matches!(
            check_length(&vec![0.0; MIN_AUDIO_SAMPLES - 1]),
            Err(SttError::AudioTooShort)
        ));
        assert!(matches!(
            check_length(&vec![0.0; MAX_AUDIO_SAMPLES + 1]),
            Err(SttError::AudioTooLong)
        ));
    }

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let result = WhisperEngine::load("/nonexistent/model.bin", TranscribeParams::default());
        assert!(
            matches!(result, Err(SttError::ModelNotFound(_))),
            "expected ModelNotFound, got: {result:?}"
        );
    }

    #[test]
    fn engine_is_object_safe() {
        let engine: Box<dyn SttEngine> = Box::new(MockSttEngine::ok("ok"));
        assert!(engine.transcribe(&[0.0; MIN_AUDIO_SAMPLES]).is_ok());
    }

    #[test]
    fn error_messages_name_the_problem() {
        assert!(SttError::ModelNotFound("/some/path.bin".into())
            .to_string()
            .contains("/some/path.bin"));
        assert!(SttError::Timeout.to_string().contains("timed out"));
    }
}
