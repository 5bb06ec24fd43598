//! Text embedding.
//!
//! * [`Encoder`]: async trait mapping texts to dense vectors.
//! * [`ApiEncoder`]: HTTP encoder for Ollama or OpenAI-compatible endpoints.
//! * [`l2_normalize`]: scales a vector to unit length so inner product
//!   equals cosine similarity.

pub mod api;
pub mod encoder;

pub use api::ApiEncoder;
pub use encoder::{l2_normalize, EmbedError, Encoder};
