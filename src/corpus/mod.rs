//! Reference corpus: the fixed set of passages retrieval runs over.
//!
//! The corpus is read once at startup from a CSV file and never mutated.
//! A passage's position in [`Corpus::passages`] is its id; the vector index
//! is built in the same order so index position and passage id coincide.

pub mod loader;

pub use loader::{Corpus, CorpusError, Passage};
