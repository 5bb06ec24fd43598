//! Concrete synthesizers.
//!
//! * [`PiperSynthesizer`]: the `piper` CLI, text on stdin, WAV to a file.
//! * [`EspeakSynthesizer`]: `espeak-ng --stdout`.
//! * [`ApiSynthesizer`]: an OpenAI-compatible `/v1/audio/speech` endpoint.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::tts::synthesizer::{Synthesizer, TtsError};

fn non_empty(bytes: Vec<u8>) -> Result<Vec<u8>, TtsError> {
    if bytes.is_empty() {
        Err(TtsError::EmptyAudio)
    } else {
        Ok(bytes)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// PiperSynthesizer
// ---------------------------------------------------------------------------

pub struct PiperSynthesizer {
    binary: PathBuf,
    voice: PathBuf,
    length_scale: f32,
}

impl PiperSynthesizer {
    pub fn new(binary: &Path, voice: &Path, length_scale: f32) -> Self {
        Self {
            binary: binary.to_path_buf(),
            voice: voice.to_path_buf(),
            length_scale,
        }
    }
}

#[async_trait]
impl Synthesizer for PiperSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let binary = self.binary.display().to_string();
        let out = tempfile::Builder::new()
            .prefix("gita-tts-")
            .suffix(".wav")
            .tempfile()?;

        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&self.voice)
            .arg("--output_file")
            .arg(out.path())
            .arg("--length_scale")
            .arg(self.length_scale.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TtsError::Spawn {
                binary: binary.clone(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(TtsError::Exit {
                binary,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        non_empty(tokio::fs::read(out.path()).await?)
    }

    fn name(&self) -> String {
        format!("piper:{}", display_name(&self.voice))
    }
}

// ---------------------------------------------------------------------------
// EspeakSynthesizer
// ---------------------------------------------------------------------------

pub struct EspeakSynthesizer {
    binary: PathBuf,
    words_per_minute: u32,
}

impl EspeakSynthesizer {
    pub fn new(binary: &Path, words_per_minute: u32) -> Self {
        Self {
            binary: binary.to_path_buf(),
            words_per_minute,
        }
    }
}

#[async_trait]
impl Synthesizer for EspeakSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let binary = self.binary.display().to_string();
        let output = Command::new(&self.binary)
            .arg("--stdout")
            .arg("-s")
            .arg(self.words_per_minute.to_string())
            .arg(text)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| TtsError::Spawn {
                binary: binary.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(TtsError::Exit {
                binary,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        non_empty(output.stdout)
    }

    fn name(&self) -> String {
        format!("espeak:{}", display_name(&self.binary))
    }
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

pub struct ApiSynthesizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
}

impl ApiSynthesizer {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        voice: &str,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            voice: voice.to_string(),
        }
    }
}

#[async_trait]
impl Synthesizer for ApiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "wav",
        });

        let mut req = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .json(&body);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        non_empty(response.bytes().await?.to_vec())
    }

    fn name(&self) -> String {
        format!("api:{}", self.model)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
