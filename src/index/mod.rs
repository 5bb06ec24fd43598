//! Vector index over passage embeddings.
//!
//! # Architecture
//!
//! ```text
//! Corpus ──texts──▶ Encoder ──vectors──▶ l2_normalize ──▶ FlatIndex::build
//!                                                              │
//!                      index cache (JSON) ◀──persist / load───┘
//! ```
//!
//! [`FlatIndex`] performs exact inner-product search. Every stored vector and
//! every query is unit length, so scores are cosine similarities in `[-1, 1]`.
//! [`load_or_build`] reuses a cached index only when its fingerprint matches
//! the current corpus and embedding model.

pub mod cache;
pub mod flat;

pub use cache::load_or_build;
pub use flat::{FlatIndex, IndexError};
