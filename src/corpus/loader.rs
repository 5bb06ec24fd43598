//! CSV corpus loading and text-column selection.

use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CorpusError
// ---------------------------------------------------------------------------

/// Errors raised while loading the corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file does not exist.
    #[error("corpus file not found: {0}")]
    NotFound(String),

    /// The file could not be read or is not valid CSV.
    #[error("failed to read corpus: {0}")]
    Read(String),

    /// The file has no columns or no rows.
    #[error("corpus is empty: {0}")]
    Empty(String),
}

impl From<csv::Error> for CorpusError {
    fn from(e: csv::Error) -> Self {
        CorpusError::Read(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Passage
// ---------------------------------------------------------------------------

/// One retrievable unit of reference text.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    /// Dense position in the corpus; used as the citation id.
    pub id: usize,
    pub text: String,
    /// Human-readable location such as `"(2, 47)"`, when the corpus carries
    /// chapter and verse columns.
    pub label: Option<String>,
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

const CHAPTER_COLUMN: &str = "chapter_number";
const VERSE_COLUMN: &str = "chapter_verse";

/// The loaded, immutable set of passages.
#[derive(Debug, Clone)]
pub struct Corpus {
    passages: Vec<Passage>,
    text_column: String,
}

impl Corpus {
    /// Load passages from a CSV file with a header row.
    ///
    /// Text comes from `preferred_column` when present, else from the first
    /// text-typed column, else from the first column. A column is text-typed
    /// when at least one of its non-empty cells does not parse as a number.
    pub fn load(path: impl AsRef<Path>, preferred_column: &str) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CorpusError::NotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

        Self::from_table(&headers, &rows, preferred_column)
            .map_err(|e| match e {
                CorpusError::Empty(_) => CorpusError::Empty(path.display().to_string()),
                other => other,
            })
    }

    /// Build a corpus directly from passage texts, without labels.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let passages = texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Passage {
                id,
                text: text.into(),
                label: None,
            })
            .collect();
        Self {
            passages,
            text_column: String::new(),
        }
    }

    fn from_table(
        headers: &[String],
        rows: &[csv::StringRecord],
        preferred_column: &str,
    ) -> Result<Self, CorpusError> {
        if headers.is_empty() || rows.is_empty() {
            return Err(CorpusError::Empty(String::new()));
        }

        let text_idx = select_text_column(headers, rows, preferred_column);
        let chapter_idx = headers.iter().position(|h| h == CHAPTER_COLUMN);
        let verse_idx = headers.iter().position(|h| h == VERSE_COLUMN);

        let passages = rows
            .iter()
            .enumerate()
            .map(|(id, row)| {
                let label = match (chapter_idx, verse_idx) {
                    (Some(c), Some(v)) => Some(format!(
                        "({}, {})",
                        row.get(c).unwrap_or("").trim(),
                        row.get(v).unwrap_or("").trim()
                    )),
                    _ => None,
                };
                Passage {
                    id,
                    text: row.get(text_idx).unwrap_or("").to_string(),
                    label,
                }
            })
            .collect();

        log::info!(
            "corpus: using column {:?} for passage text",
            headers[text_idx]
        );

        Ok(Self {
            passages,
            text_column: headers[text_idx].clone(),
        })
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn get(&self, id: usize) -> Option<&Passage> {
        self.passages.get(id)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Name of the column passage text was read from.
    pub fn text_column(&self) -> &str {
        &self.text_column
    }

    /// Passage texts in id order.
    pub fn texts(&self) -> Vec<String> {
        self.passages.iter().map(|p| p.text.clone()).collect()
    }

    /// SHA-256 over the embedding model name and every passage text, hex
    /// encoded. Identifies the corpus an index cache was built from.
    pub fn fingerprint(&self, model: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        for passage in &self.passages {
            hasher.update((passage.text.len() as u64).to_le_bytes());
            hasher.update(passage.text.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Index of the column passage text should come from.
fn select_text_column(
    headers: &[String],
    rows: &[csv::StringRecord],
    preferred: &str,
) -> usize {
    if let Some(idx) = headers.iter().position(|h| h == preferred) {
        return idx;
    }

    let is_text = |col: usize| {
        rows.iter().any(|row| {
            let cell = row.get(col).unwrap_or("").trim();
            !cell.is_empty() && cell.parse::<f64>().is_err()
        })
    };

    match (0..headers.len()).find(|&col| is_text(col)) {
        Some(idx) => idx,
        None => {
            log::warn!("corpus: no text-typed column found, falling back to the first column");
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
