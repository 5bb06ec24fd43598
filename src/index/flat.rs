//! Exact inner-product index with JSON persistence.

use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embed::{l2_normalize, EmbedError};

/// Bumped whenever the on-disk layout changes.
const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// IndexError
// ---------------------------------------------------------------------------

/// Errors raised by the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No index file at the given path. Callers fall back to building one.
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// A vector's length differs from the index dimension.
    #[error("vector dimension {got} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Reading or writing the index file failed.
    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The index file is not a valid index of a supported version.
    #[error("invalid index file: {0}")]
    Format(String),

    /// Encoding passages while building the index failed.
    #[error("failed to embed passages: {0}")]
    Embed(#[from] EmbedError),
}

// ---------------------------------------------------------------------------
// FlatIndex
// ---------------------------------------------------------------------------

/// Immutable collection of unit vectors searched exhaustively.
///
/// Position `i` holds the vector of passage `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    version: u32,
    dimension: usize,
    /// Identifies the corpus and model the vectors were built from.
    fingerprint: Option<String>,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index from `vectors`, normalising each to unit length.
    ///
    /// All vectors must share `dimension`. Deterministic for identical input.
    pub fn build(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let mut vectors = vectors;
        for v in vectors.iter_mut() {
            if v.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    got: v.len(),
                });
            }
            l2_normalize(v);
        }

        Ok(Self {
            version: FORMAT_VERSION,
            dimension,
            fingerprint: None,
            vectors,
        })
    }

    /// Attach the fingerprint recorded alongside the vectors on persist.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Return up to `k` `(position, score)` pairs ordered by descending
    /// score. Equal scores are ordered by ascending position.
    ///
    /// `query` must already be unit length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, v)| (pos, dot(v, query)))
            .collect();

        scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Write the index to `path`, creating parent directories as needed.
    pub fn persist(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec(self).map_err(|e| IndexError::Format(e.to_string()))?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Read an index previously written by [`persist`](Self::persist).
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::IndexNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        let index: Self =
            serde_json::from_slice(&data).map_err(|e| IndexError::Format(e.to_string()))?;

        if index.version != FORMAT_VERSION {
            return Err(IndexError::Format(format!(
                "unsupported version {}",
                index.version
            )));
        }
        if let Some(bad) = index.vectors.iter().find(|v| v.len() != index.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: index.dimension,
                got: bad.len(),
            });
        }
        Ok(index)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn unit(v: &[f32]) -> Vec<f32> {
        let mut v = v.to_vec();
        l2_normalize(&mut v);
        v
    }

    fn sample_index() -> FlatIndex {
        FlatIndex::build(
            3,
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.7, 0.7, 0.0],
                vec![0.0, 0.0, 2.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn build_normalizes_vectors() {
        let index = FlatIndex::build(2, vec![vec![3.0, 4.0]]).unwrap();
        let hits = index.search(&unit(&[3.0, 4.0]), 1).unwrap();
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn build_rejects_mixed_dimensions() {
        let err = FlatIndex::build(2, vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn search_orders_by_descending_score() {
        let index = sample_index();
        let hits = index.search(&unit(&[0.1, 1.0, 0.0]), 3).unwrap();

        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 2);
        assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn search_returns_at_most_k() {
        let index = sample_index();
        assert_eq!(index.search(&unit(&[1.0, 0.0, 0.0]), 2).unwrap().len(), 2);
        assert_eq!(index.search(&unit(&[1.0, 0.0, 0.0]), 10).unwrap().len(), 4);
        assert!(index.search(&unit(&[1.0, 0.0, 0.0]), 0).unwrap().is_empty());
    }

    #[test]
    fn ties_break_by_ascending_position() {
        let index = FlatIndex::build(
            2,
            vec![
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
            ],
        )
        .unwrap();

        let hits = index.search(&[1.0, 0.0], 4).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(positions, vec![1, 3, 0, 2]);
    }

    #[test]
    fn scores_are_cosine_similarities() {
        let index = sample_index();
        let hits = index.search(&unit(&[-1.0, 0.0, 0.0]), 4).unwrap();
        assert!(hits.iter().all(|h| (-1.0 - 1e-6..=1.0 + 1e-6).contains(&h.1)));
        let last = hits.iter().find(|h| h.0 == 0).unwrap();
        assert!((last.1 + 1.0).abs() < 1e-6);
    }

    #[test]
    fn search_rejects_wrong_query_dimension() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(IndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(sample_index(), sample_index());
    }

    #[test]
    fn persist_then_load_preserves_search_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("index.json");

        let index = sample_index().with_fingerprint("abc");
        index.persist(&path).unwrap();
        let loaded = FlatIndex::load(&path).unwrap();

        assert_eq!(loaded.fingerprint(), Some("abc"));
        for query in [[1.0, 0.2, 0.0], [0.0, 0.3, 1.0], [-0.5, 0.5, 0.5]] {
            let q = unit(&query);
            let before = index.search(&q, 4).unwrap();
            let after = loaded.search(&q, 4).unwrap();
            assert_eq!(before.len(), after.len());
            for (b, a) in before.iter().zip(&after) {
                assert_eq!(b.0, a.0);
                assert!((b.1 - a.1).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn load_missing_is_index_not_found() {
        let dir = tempdir().unwrap();
        let err = FlatIndex::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, IndexError::IndexNotFound(_)));
    }

    #[test]
    fn load_garbage_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(FlatIndex::load(&path), Err(IndexError::Format(_))));
    }
}
