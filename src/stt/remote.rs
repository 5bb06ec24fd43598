//! File-based transcription through an HTTP endpoint.
//!
//! [`ApiTranscriber`] uploads a WAV file to any OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint (OpenAI, Groq, faster-whisper-server,
//! whisper.cpp's server …). It is an optional second file backend after
//! [`LocalFileTranscriber`](crate::stt::LocalFileTranscriber).

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::config::RemoteSttConfig;
use crate::stt::engine::SttError;

// ---------------------------------------------------------------------------
// FileTranscriber trait
// ---------------------------------------------------------------------------

/// A transcriber that needs a file container rather than raw samples.
#[async_trait]
pub trait FileTranscriber: Send + Sync {
    async fn transcribe_file(&self, path: &Path) -> Result<String, SttError>;

    /// Backend identity for logs.
    fn name(&self) -> String;
}

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

pub struct ApiTranscriber {
    client: reqwest::Client,
    config: RemoteSttConfig,
    language: String,
}

impl ApiTranscriber {
    pub fn from_config(config: &RemoteSttConfig, language: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            language: language.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl FileTranscriber for ApiTranscriber {
    async fn transcribe_file(&self, path: &Path) -> Result<String, SttError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SttError::Wav(format!("{}: {e}", path.display())))?;

        let file = Part::bytes(bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::Request(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("response_format", "json");
        if self.language != "auto" {
            form = form.text("language", self.language.clone());
        }

        let mut req = self.client.post(self.endpoint()).multipart(form);
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SttError::Transcription(format!("{status}: {body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        json["text"]
            .as_str()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| SttError::Transcription("response has no text field".into()))
    }

    fn name(&self) -> String {
        format!("api:{}", self.config.model)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
