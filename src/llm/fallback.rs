//! Ordered fallback over several generators.
//!
//! [`GeneratorChain`] tries each backend in order and returns the first
//! success. When every backend fails it returns a fixed apology instead of
//! an error, so a turn always completes with some answer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::generator::{Generator, LlmError};

// ---------------------------------------------------------------------------
// GeneratorChain
// ---------------------------------------------------------------------------

/// Tries generators in order; first success wins.
pub struct GeneratorChain {
    backends: Vec<Arc<dyn Generator>>,
    apology: String,
}

impl GeneratorChain {
    /// Chain `backends`, answering `apology` when all of them fail.
    pub fn new(backends: Vec<Arc<dyn Generator>>, apology: impl Into<String>) -> Self {
        Self {
            backends,
            apology: apology.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn apology(&self) -> &str {
        &self.apology
    }

    /// Return the first successful generation, or the apology.
    ///
    /// Never fails. Each backend failure is logged with its identity.
    pub async fn generate_or_apologise(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(_) => {
                log::error!(
                    "llm: all {} backends failed, answering with the apology",
                    self.backends.len()
                );
                self.apology.clone()
            }
        }
    }
}

#[async_trait]
impl Generator for GeneratorChain {
    /// Return the first backend's success or the last backend's error.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut last_err = LlmError::Request("no generation backends configured".into());
        for backend in &self.backends {
            match backend.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    log::warn!("llm: backend {} failed ({err}), trying next", backend.name());
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    fn name(&self) -> String {
        let names: Vec<String> = self.backends.iter().map(|b| b.name()).collect();
        format!("chain[{}]", names.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
