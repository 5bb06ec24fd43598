//! Best-effort synthesis over several backends.

use std::sync::Arc;

use crate::tts::synthesizer::Synthesizer;

/// Tries synthesizers in order; first success wins.
pub struct SynthesizerChain {
    backends: Vec<Arc<dyn Synthesizer>>,
    max_chars: usize,
}

impl SynthesizerChain {
    pub fn new(backends: Vec<Arc<dyn Synthesizer>>, max_chars: usize) -> Self {
        Self {
            backends,
            max_chars,
        }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Synthesize `text`, or `None` when it is blank or every backend fails.
    ///
    /// Text longer than `max_chars` characters is cut first.
    pub async fn synthesize_best_effort(&self, text: &str) -> Option<Vec<u8>> {
        let text = truncate_chars(text.trim(), self.max_chars);
        if text.is_empty() {
            return None;
        }

        for backend in &self.backends {
            match backend.synthesize(text).await {
                Ok(audio) => {
                    log::debug!("tts: {} produced {} bytes", backend.name(), audio.len());
                    return Some(audio);
                }
                Err(e) => log::warn!("tts: backend {} failed ({e}), trying next", backend.name()),
            }
        }

        log::warn!("tts: all {} backends failed, answering without audio", self.backends.len());
        None
    }
}

/// The first `max` characters of `text`, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
