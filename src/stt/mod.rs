//! Speech-to-text.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Transcriber                         │
//! │                                                          │
//! │   samples ──▶ SttEngine (WhisperEngine)    ──ok──▶ text  │
//! │                      │ err                               │
//! │                      ▼                                   │
//! │              temporary WAV file                          │
//! │                      │                                   │
//! │                      ▼                                   │
//! │      LocalFileTranscriber (same Whisper)   ──ok──▶ text  │
//! │                      │ err                               │
//! │                      ▼                                   │
//! │      ApiTranscriber (optional)             ──ok──▶ text  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gita_voice::stt::{LocalFileTranscriber, SttEngine, TranscribeParams, Transcriber, WhisperEngine};
//!
//! # async fn example() {
//! let engine = WhisperEngine::load("models/ggml-small.bin", TranscribeParams::for_language("en"))
//!     .expect("model not found");
//! let engine: Arc<dyn SttEngine> = Arc::new(engine);
//! let wav_retry = Arc::new(LocalFileTranscriber::new(Arc::clone(&engine)));
//! let transcriber = Transcriber::new(Some(engine), vec![wav_retry], 16_000);
//!
//! let audio: Vec<f32> = vec![0.0; 16_000]; // 1 s of silence
//! let text = transcriber.transcribe_pcm(audio).await.unwrap();
//! println!("{text}");
//! # }
//! ```

pub mod engine;
pub mod local;
pub mod remote;
pub mod transcribe;
pub mod transcriber;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttEngine, SttError, WhisperEngine};
pub use local::LocalFileTranscriber;
pub use remote::{ApiTranscriber, FileTranscriber};
pub use transcribe::TranscribeParams;
pub use transcriber::Transcriber;

// test-only re-export so the pipeline test module can import MockSttEngine
// without `use gita_voice::stt::engine::MockSttEngine`.
#[cfg(test)]
pub use engine::MockSttEngine;
