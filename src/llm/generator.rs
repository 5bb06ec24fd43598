//! Core `Generator` trait and its HTTP backends.
//!
//! * [`OllamaGenerator`]: Ollama native `/api/chat`.
//! * [`OpenAiGenerator`]: any OpenAI-compatible `/v1/chat/completions`
//!   endpoint (OpenAI, Groq, LM Studio, vLLM, text-generation-inference …).
//!
//! All connection details come from [`LlmBackendConfig`]; nothing is
//! hardcoded.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{LlmBackendConfig, LlmProvider};
use crate::llm::prompt::SYSTEM_MESSAGE;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Generator trait
// ---------------------------------------------------------------------------

/// Async trait for prompt-to-text generation backends.
///
/// Implementors must be `Send + Sync` so they can be shared across request
/// handlers as `Arc<dyn Generator>`.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short identity used in logs, e.g. `"ollama:gemma3:1b"`.
    fn name(&self) -> String;
}

/// Construct one generator per configured backend, preserving order.
pub fn build_generators(backends: &[LlmBackendConfig]) -> Vec<Arc<dyn Generator>> {
    backends
        .iter()
        .map(|cfg| -> Arc<dyn Generator> {
            match cfg.provider {
                LlmProvider::Ollama => Arc::new(OllamaGenerator::from_config(cfg)),
                LlmProvider::OpenAiCompatible => Arc::new(OpenAiGenerator::from_config(cfg)),
            }
        })
        .collect()
}

fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn messages(prompt: &str) -> serde_json::Value {
    serde_json::json!([
        { "role": "system", "content": SYSTEM_MESSAGE },
        { "role": "user",   "content": prompt }
    ])
}

/// Send `req` and parse a JSON body, mapping non-success statuses.
async fn send_json(req: reqwest::RequestBuilder) -> Result<serde_json::Value, LlmError> {
    let response = req.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(LlmError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))
}

fn non_empty(text: Option<&str>) -> Result<String, LlmError> {
    let text = text.ok_or(LlmError::EmptyResponse)?.trim().to_string();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// OllamaGenerator
// ---------------------------------------------------------------------------

/// Calls Ollama's native `/api/chat` endpoint without streaming.
pub struct OllamaGenerator {
    client: reqwest::Client,
    config: LlmBackendConfig,
}

impl OllamaGenerator {
    pub fn from_config(config: &LlmBackendConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model":    self.config.model,
            "messages": messages(prompt),
            "stream":   false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            }
        });

        let json = send_json(self.client.post(&url).json(&body)).await?;
        non_empty(json["message"]["content"].as_str())
    }

    fn name(&self) -> String {
        format!("ollama:{}", self.config.model)
    }
}

// ---------------------------------------------------------------------------
// OpenAiGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: LlmBackendConfig,
}

impl OpenAiGenerator {
    pub fn from_config(config: &LlmBackendConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    /// The `Authorization: Bearer …` header is attached only when
    /// `api_key` is a non-empty string.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages":    messages(prompt),
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        });

        let mut req = self.client.post(&url).json(&body);
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let json = send_json(req).await?;
        non_empty(json["choices"][0]["message"]["content"].as_str())
    }

    fn name(&self) -> String {
        format!("openai:{}", self.config.model)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
