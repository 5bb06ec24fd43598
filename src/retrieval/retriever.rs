//! [`Retriever`] ties the encoder, the vector index and the corpus together.

use std::sync::Arc;

use thiserror::Error;

use crate::corpus::Corpus;
use crate::embed::{l2_normalize, EmbedError, Encoder};
use crate::index::{FlatIndex, IndexError};

// ---------------------------------------------------------------------------
// RetrievalError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query encoding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("index search failed: {0}")]
    Index(#[from] IndexError),

    /// The encoder returned no vector for the query.
    #[error("encoder returned no vector for the query")]
    NoVector,
}

// ---------------------------------------------------------------------------
// ScoredPassage
// ---------------------------------------------------------------------------

/// A passage returned for a query, with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    /// Position in the corpus; cited as `(id=N)`.
    pub id: usize,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
    pub text: String,
    pub label: Option<String>,
}

// ---------------------------------------------------------------------------
// Retriever
// ---------------------------------------------------------------------------

/// Read-only retrieval over a loaded corpus and its index.
///
/// Cheap to clone; all state is behind `Arc`s and never mutated.
#[derive(Clone)]
pub struct Retriever {
    encoder: Arc<dyn Encoder>,
    index: Arc<FlatIndex>,
    corpus: Arc<Corpus>,
}

impl Retriever {
    pub fn new(encoder: Arc<dyn Encoder>, index: Arc<FlatIndex>, corpus: Arc<Corpus>) -> Self {
        Self {
            encoder,
            index,
            corpus,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Return up to `top_k` passages most similar to `query`, best first.
    ///
    /// A blank query returns an empty list without calling the encoder.
    /// Index positions with no matching passage are skipped.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>, RetrievalError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = self.encoder.encode(&[query.to_string()]).await?;
        let mut q = vectors.pop().ok_or(RetrievalError::NoVector)?;
        l2_normalize(&mut q);

        let hits = self.index.search(&q, top_k)?;

        let results: Vec<ScoredPassage> = hits
            .into_iter()
            .filter_map(|(pos, score)| {
                self.corpus.get(pos).map(|p| ScoredPassage {
                    id: pos,
                    score,
                    text: p.text.clone(),
                    label: p.label.clone(),
                })
            })
            .collect();

        log::debug!("retrieval: {} passages for {:?}", results.len(), query);
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Maps known texts to fixed 3-d vectors and counts calls.
    struct TableEncoder {
        calls: AtomicUsize,
    }

    impl TableEncoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Encoder for TableEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| match t.as_str() {
                    "A" => vec![1.0, 0.0, 0.0],
                    "B" => vec![0.0, 1.0, 0.0],
                    "C" => vec![0.0, 0.0, 1.0],
                    "B-like" => vec![0.3, 2.0, 0.1],
                    _ => vec![1.0, 1.0, 1.0],
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model(&self) -> &str {
            "table"
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Encoder for AlwaysFails {
        async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Err(EmbedError::Timeout)
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model(&self) -> &str {
            "fails"
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn abc_retriever(encoder: Arc<dyn Encoder>) -> Retriever {
        let index = FlatIndex::build(
            3,
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
        )
        .unwrap();
        Retriever::new(
            encoder,
            Arc::new(index),
            Arc::new(Corpus::from_texts(["A", "B", "C"])),
        )
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn most_similar_passage_comes_first() {
        let retriever = abc_retriever(Arc::new(TableEncoder::new()));

        let results = retriever.retrieve("B-like", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].text, "B");
        assert_eq!(results[1].id, 0);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn blank_query_skips_encoder() {
        let encoder = Arc::new(TableEncoder::new());
        let retriever = abc_retriever(encoder.clone());

        assert!(retriever.retrieve("", 3).await.unwrap().is_empty());
        assert!(retriever.retrieve("   ", 3).await.unwrap().is_empty());
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_query_succeeds_even_with_failing_encoder() {
        let retriever = abc_retriever(Arc::new(AlwaysFails));
        assert!(retriever.retrieve(" \t", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn encoder_failure_is_reported() {
        let retriever = abc_retriever(Arc::new(AlwaysFails));
        let err = retriever.retrieve("A", 3).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Embed(EmbedError::Timeout)));
    }

    #[tokio::test]
    async fn positions_beyond_corpus_are_dropped() {
        let index = FlatIndex::build(
            3,
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
        )
        .unwrap();
        let retriever = Retriever::new(
            Arc::new(TableEncoder::new()),
            Arc::new(index),
            Arc::new(Corpus::from_texts(["A", "B"])),
        );

        let results = retriever.retrieve("C", 3).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.id < 2));
    }

    #[tokio::test]
    async fn top_k_limits_results() {
        let retriever = abc_retriever(Arc::new(TableEncoder::new()));
        assert_eq!(retriever.retrieve("other", 1).await.unwrap().len(), 1);
    }
}
