//! `Encoder` trait, `EmbedError`, and vector normalisation.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// EmbedError
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding text.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// HTTP transport or connection error.
    #[error("embedding request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("embedding request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("embedding endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("failed to parse embedding response: {0}")]
    Parse(String),

    /// The endpoint returned a different number of vectors than inputs.
    #[error("expected {expected} embeddings, got {got}")]
    CountMismatch { expected: usize, got: usize },

    /// A returned vector has the wrong dimension.
    #[error("expected dimension {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl From<reqwest::Error> for EmbedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EmbedError::Timeout
        } else {
            EmbedError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Encoder trait
// ---------------------------------------------------------------------------

/// Maps texts to fixed-dimension dense vectors.
///
/// Output order matches input order. Vectors are returned as produced by the
/// model; callers normalise them with [`l2_normalize`] before indexing or
/// searching.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Dimension of every vector this encoder produces.
    fn dimension(&self) -> usize;

    /// Model identifier, recorded in the index cache fingerprint.
    fn model(&self) -> &str;
}

// ---------------------------------------------------------------------------
// l2_normalize
// ---------------------------------------------------------------------------

/// Scale `v` in place to unit L2 norm. A zero vector is left unchanged.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
