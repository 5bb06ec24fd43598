//! Query-time retrieval: encode the query, search the index, attach passages.

pub mod retriever;

pub use retriever::{RetrievalError, Retriever, ScoredPassage};
