//! HTTP embedding encoder.
//!
//! Speaks either Ollama's native `/api/embed` or the OpenAI-compatible
//! `/v1/embeddings` wire format, selected by [`EmbeddingProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::embed::encoder::{EmbedError, Encoder};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OllamaResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

/// Encoder backed by a remote embedding model.
pub struct ApiEncoder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl ApiEncoder {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.provider {
            EmbeddingProvider::Ollama => format!("{base}/api/embed"),
            EmbeddingProvider::OpenAiCompatible => format!("{base}/v1/embeddings"),
        }
    }

    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let mut req = self.client.post(self.endpoint()).json(&request);
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let vectors = match self.config.provider {
            EmbeddingProvider::Ollama => {
                let parsed: OllamaResponse = response
                    .json()
                    .await
                    .map_err(|e| EmbedError::Parse(e.to_string()))?;
                parsed.embeddings
            }
            EmbeddingProvider::OpenAiCompatible => {
                let mut parsed: OpenAiResponse = response
                    .json()
                    .await
                    .map_err(|e| EmbedError::Parse(e.to_string()))?;
                parsed.data.sort_by_key(|entry| entry.index);
                parsed.data.into_iter().map(|entry| entry.embedding).collect()
            }
        };

        check_shape(&vectors, texts.len(), self.config.dimension)?;
        Ok(vectors)
    }
}

#[async_trait]
impl Encoder for ApiEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size.max(1)) {
            out.extend(self.encode_batch(chunk).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Reject responses whose vector count or dimension does not match.
fn check_shape(vectors: &[Vec<f32>], expected: usize, dimension: usize) -> Result<(), EmbedError> {
    if vectors.len() != expected {
        return Err(EmbedError::CountMismatch {
            expected,
            got: vectors.len(),
        });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(EmbedError::DimensionMismatch {
            expected: dimension,
            got: bad.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(provider: EmbeddingProvider) -> EmbeddingConfig {
        EmbeddingConfig {
            provider,
            base_url: "http://localhost:11434/".into(),
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn ollama_endpoint() {
        let encoder = ApiEncoder::from_config(&make_config(EmbeddingProvider::Ollama));
        assert_eq!(encoder.endpoint(), "http://localhost:11434/api/embed");
    }

    #[test]
    fn openai_endpoint() {
        let encoder = ApiEncoder::from_config(&make_config(EmbeddingProvider::OpenAiCompatible));
        assert_eq!(encoder.endpoint(), "http://localhost:11434/v1/embeddings");
    }

    #[test]
    fn shape_check_rejects_wrong_count() {
        let vectors = vec![vec![0.0f32; 3]];
        let err = check_shape(&vectors, 2, 3).unwrap_err();
        assert!(matches!(err, EmbedError::CountMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn shape_check_rejects_wrong_dimension() {
        let vectors = vec![vec![0.0f32; 3], vec![0.0f32; 4]];
        let err = check_shape(&vectors, 2, 3).unwrap_err();
        assert!(matches!(err, EmbedError::DimensionMismatch { expected: 3, got: 4 }));
    }

    #[test]
    fn openai_response_parses_out_of_order() {
        let body = r#"{"data":[{"index":1,"embedding":[0.5]},{"index":0,"embedding":[0.25]}]}"#;
        let mut parsed: OpenAiResponse = serde_json::from_str(body).unwrap();
        parsed.data.sort_by_key(|e| e.index);
        assert_eq!(parsed.data[0].embedding, vec![0.25]);
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        // Unroutable base URL: any request would fail.
        let mut config = make_config(EmbeddingProvider::Ollama);
        config.base_url = "http://127.0.0.1:9".into();
        let encoder = ApiEncoder::from_config(&config);
        assert!(encoder.encode(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn encoder_is_object_safe() {
        let encoder: Box<dyn Encoder> =
            Box::new(ApiEncoder::from_config(&EmbeddingConfig::default()));
        assert_eq!(encoder.dimension(), 384);
        assert_eq!(encoder.model(), "all-minilm");
    }
}
