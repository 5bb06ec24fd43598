//! Core `Synthesizer` trait and backend construction.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TtsBackendConfig;
use crate::tts::backends::{ApiSynthesizer, EspeakSynthesizer, PiperSynthesizer};

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TtsError {
    /// The synthesizer binary could not be started.
    #[error("failed to run {binary}: {reason}")]
    Spawn { binary: String, reason: String },

    /// The synthesizer process exited unsuccessfully.
    #[error("{binary} exited with {status}: {stderr}")]
    Exit {
        binary: String,
        status: String,
        stderr: String,
    },

    /// HTTP transport error.
    #[error("TTS request failed: {0}")]
    Request(String),

    #[error("TTS request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("TTS endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Reading or writing the temporary output file failed.
    #[error("TTS file error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend produced no audio bytes.
    #[error("TTS produced no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-speech backends.
///
/// Implementations return a complete WAV file.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;

    /// Short identity used in logs, e.g. `"piper:en_GB-…-low.onnx"`.
    fn name(&self) -> String;
}

/// Construct one synthesizer per configured backend, preserving order.
pub fn build_synthesizers(backends: &[TtsBackendConfig]) -> Vec<Arc<dyn Synthesizer>> {
    backends
        .iter()
        .map(|cfg| -> Arc<dyn Synthesizer> {
            match cfg {
                TtsBackendConfig::Piper {
                    binary,
                    voice,
                    length_scale,
                } => Arc::new(PiperSynthesizer::new(binary, voice, *length_scale)),
                TtsBackendConfig::Api {
                    base_url,
                    api_key,
                    model,
                    voice,
                    timeout_secs,
                } => Arc::new(ApiSynthesizer::new(
                    base_url,
                    api_key.clone(),
                    model,
                    voice,
                    *timeout_secs,
                )),
                TtsBackendConfig::Espeak {
                    binary,
                    words_per_minute,
                } => Arc::new(EspeakSynthesizer::new(binary, *words_per_minute)),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TtsConfig;

    #[test]
    fn default_config_builds_piper_then_espeak() {
        let synths = build_synthesizers(&TtsConfig::default().backends);
        assert_eq!(synths.len(), 2);
        assert!(synths[0].name().starts_with("piper:"));
        assert!(synths[1].name().starts_with("espeak:"));
    }

    #[test]
    fn api_backend_is_named_by_model() {
        let synths = build_synthesizers(&[TtsBackendConfig::Api {
            base_url: "http://localhost:8880".into(),
            api_key: None,
            model: "kokoro".into(),
            voice: "af_sky".into(),
            timeout_secs: 30,
        }]);
        assert_eq!(synths[0].name(), "api:kokoro");
    }

    #[test]
    fn exit_error_mentions_binary() {
        let err = TtsError::Exit {
            binary: "piper".into(),
            status: "exit status: 1".into(),
            stderr: "no voice".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("piper"));
        assert!(msg.contains("no voice"));
    }
}
