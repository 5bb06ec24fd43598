//! Grounded answer generation.
//!
//! This module provides:
//! * [`compose_prompt`]: builds the citation-disciplined prompt.
//! * [`Generator`]: async trait implemented by all generation backends.
//! * [`OllamaGenerator`] / [`OpenAiGenerator`]: HTTP backends.
//! * [`GeneratorChain`]: ordered fallback with a fixed apology.
//! * [`clean_response`]: strips citations and scaffolding for speech.
//! * [`LlmError`]: error variants for generation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use gita_voice::config::AppConfig;
//! use gita_voice::llm::{build_generators, clean_response, compose_prompt, GeneratorChain};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let chain = GeneratorChain::new(
//!         build_generators(&config.llm.backends),
//!         config.conversation.apology.clone(),
//!     );
//!
//!     let prompt = compose_prompt("What is my duty?", &[], 2000);
//!     let raw = chain.generate_or_apologise(&prompt).await;
//!     println!("{}", clean_response(&raw));
//! }
//! ```

pub mod cleaner;
pub mod fallback;
pub mod generator;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cleaner::clean_response;
pub use fallback::GeneratorChain;
pub use generator::{build_generators, Generator, LlmError, OllamaGenerator, OpenAiGenerator};
pub use prompt::{compose_prompt, INSTRUCTION};
