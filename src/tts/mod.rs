//! Text-to-speech collaborators.
//!
//! Every backend implements [`Synthesizer`] (`text -> WAV bytes`).
//! [`SynthesizerChain`] tries them in configured order and degrades to no
//! audio when all of them fail.

pub mod backends;
pub mod chain;
pub mod synthesizer;

pub use backends::{ApiSynthesizer, EspeakSynthesizer, PiperSynthesizer};
pub use chain::SynthesizerChain;
pub use synthesizer::{build_synthesizers, Synthesizer, TtsError};
