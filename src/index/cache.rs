//! Load the cached index when it matches the corpus, otherwise rebuild it.

use std::path::Path;

use crate::corpus::Corpus;
use crate::embed::Encoder;
use crate::index::flat::{FlatIndex, IndexError};

/// Return an index for `corpus`, reusing the cache at `path` when possible.
///
/// The cache is reused only if its fingerprint equals
/// [`Corpus::fingerprint`] for the encoder's model and it holds one vector
/// per passage. A missing, unreadable or stale cache triggers a rebuild,
/// which is written back to `path`. Failing to write the cache is logged and
/// does not fail the call.
pub async fn load_or_build(
    corpus: &Corpus,
    encoder: &dyn Encoder,
    path: &Path,
) -> Result<FlatIndex, IndexError> {
    let fingerprint = corpus.fingerprint(encoder.model());

    match FlatIndex::load(path) {
        Ok(index)
            if index.fingerprint() == Some(fingerprint.as_str())
                && index.len() == corpus.len()
                && index.dimension() == encoder.dimension() =>
        {
            log::info!(
                "index: loaded {} vectors from {}",
                index.len(),
                path.display()
            );
            return Ok(index);
        }
        Ok(index) => {
            log::warn!(
                "index: cache at {} does not match the corpus ({} vectors, {} passages); rebuilding",
                path.display(),
                index.len(),
                corpus.len()
            );
        }
        Err(IndexError::IndexNotFound(_)) => {
            log::info!("index: no cache at {}, building", path.display());
        }
        Err(e) => {
            log::warn!("index: cache at {} unusable ({e}); rebuilding", path.display());
        }
    }

    let vectors = encoder.encode(&corpus.texts()).await?;
    let index = FlatIndex::build(encoder.dimension(), vectors)?.with_fingerprint(fingerprint);

    if let Err(e) = index.persist(path) {
        log::warn!("index: failed to write cache to {}: {e}", path.display());
    } else {
        log::info!("index: built {} vectors, cached at {}", index.len(), path.display());
    }

    Ok(index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
