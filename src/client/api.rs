//! Blocking HTTP client for the server.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::audio::{AudioError, CaptureError};
use crate::pipeline::{GreetResponse, TurnResponse};
use crate::server::HealthResponse;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// ClientError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to server failed: {0}")]
    Request(String),

    #[error("server did not answer in time")]
    Timeout,

    /// The server answered with an error body.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The body was not the expected JSON.
    #[error("could not decode server response: {0}")]
    Decode(String),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("recording failed: {0}")]
    Capture(#[from] CaptureError),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ServerClient
// ---------------------------------------------------------------------------

pub struct ServerClient {
    http: Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /health`.
    pub fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()?;
        read_json(response)
    }

    /// `POST /process_audio` with raw little-endian `i16` PCM.
    pub fn process_audio(&self, pcm: Vec<u8>) -> Result<TurnResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/process_audio"))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(pcm)
            .send()?;
        read_json(response)
    }

    /// `GET /greet`.
    pub fn greet(&self) -> Result<GreetResponse, ClientError> {
        read_json(self.http.get(self.url("/greet")).send()?)
    }
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(ClientError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// The `error` field of a JSON error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_is_extracted() {
        assert_eq!(error_message(r#"{"error":"No audio data received"}"#), "No audio data received");
        assert_eq!(error_message("  gateway down "), "gateway down");
    }

    #[test]
    fn base_url_is_normalised() {
        let client = ServerClient::new("http://192.168.1.100:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.100:5000");
        assert_eq!(client.url("/health"), "http://192.168.1.100:5000/health");
    }

    #[test]
    fn unreachable_server_is_a_request_error() {
        let client = ServerClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.health().unwrap_err();
        assert!(
            matches!(err, ClientError::Request(_) | ClientError::Timeout),
            "{err}"
        );
    }
}
