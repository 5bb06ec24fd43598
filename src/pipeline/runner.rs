//! Turn orchestrator: audio bytes in, response bundle out.
//!
//! # Turn flow
//!
//! ```text
//! request body
//!   └─▶ decode_pcm16                                   [AwaitingAudio]
//!         └─▶ models loaded? Transcriber               [Transcribing]
//!               ├─ exit phrase → farewell ─────────────────────┐
//!               └─▶ Retriever.retrieve                 [Retrieving]
//!                     └─▶ compose_prompt               [Composing]
//!                           └─▶ GeneratorChain         [Generating]
//!                                 └─▶ clean_response   [PostProcessing]
//!                                       └─▶ SynthesizerChain ◀──┘ [Synthesizing]
//!                                             └─▶ TurnResponse    [Responding]
//! ```
//!
//! Generation and synthesis never fail a turn: the chain answers with the
//! apology, and synthesis degrades to no audio.

use std::sync::OnceLock;

use thiserror::Error;

use crate::audio::decode_pcm16;
use crate::config::AppConfig;
use crate::llm::{clean_response, compose_prompt, GeneratorChain};
use crate::retrieval::Retriever;
use crate::stt::{SttError, Transcriber};
use crate::tts::SynthesizerChain;

use super::response::{encode_audio, format_response, GreetResponse, TurnResponse};
use super::state::{TurnProgress, TurnState};

// ---------------------------------------------------------------------------
// TurnError
// ---------------------------------------------------------------------------

/// Failures that abort a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The request body was empty.
    #[error("No audio data received")]
    NoAudio,

    /// The request body could not be decoded as 16-bit PCM.
    #[error("Failed to parse int16 audio bytes: {0}")]
    MalformedAudio(String),

    /// Transcriber or retrieval models are still loading (or failed to).
    #[error("Models not loaded on server.")]
    ModelsNotLoaded,

    /// Both transcription paths failed.
    #[error("Transcription failed: {0}")]
    Transcription(#[from] SttError),
}

// ---------------------------------------------------------------------------
// Models / TurnSettings
// ---------------------------------------------------------------------------

/// The models a turn needs before it can start, loaded once at startup.
pub struct Models {
    pub transcriber: Transcriber,
    pub retriever: Retriever,
}

/// Per-turn parameters taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub channels: u16,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub exit_phrases: Vec<String>,
    pub farewell: String,
    pub greeting: String,
}

impl TurnSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            channels: config.audio.channels,
            top_k: config.retrieval.top_k,
            max_context_chars: config.retrieval.max_context_chars,
            exit_phrases: config.conversation.exit_phrases.clone(),
            farewell: config.conversation.farewell.clone(),
            greeting: config.conversation.greeting.clone(),
        }
    }
}

/// `true` when `transcription` contains any of `phrases`, ignoring case.
///
/// ```
/// use gita_voice::pipeline::is_exit_phrase;
///
/// let phrases = vec!["thank you".to_string()];
/// assert!(is_exit_phrase("Okay, THANK YOU Krishna", &phrases));
/// assert!(!is_exit_phrase("What is dharma?", &phrases));
/// ```
pub fn is_exit_phrase(transcription: &str, phrases: &[String]) -> bool {
    let lower = transcription.to_lowercase();
    phrases
        .iter()
        .map(|p| p.trim().to_lowercase())
        .any(|p| !p.is_empty() && lower.contains(&p))
}

// ---------------------------------------------------------------------------
// TurnOrchestrator
// ---------------------------------------------------------------------------

/// Runs voice turns against shared, read-only models.
///
/// Generation and synthesis backends are available from construction. The
/// transcriber and retriever are installed once via
/// [`install_models`](Self::install_models); until then every turn fails
/// with [`TurnError::ModelsNotLoaded`].
pub struct TurnOrchestrator {
    settings: TurnSettings,
    generator: GeneratorChain,
    synthesizer: SynthesizerChain,
    models: OnceLock<Models>,
}

impl TurnOrchestrator {
    pub fn new(
        settings: TurnSettings,
        generator: GeneratorChain,
        synthesizer: SynthesizerChain,
    ) -> Self {
        Self {
            settings,
            generator,
            synthesizer,
            models: OnceLock::new(),
        }
    }

    /// Install the loaded models. Returns `false` if models were already
    /// installed; the first set is kept.
    pub fn install_models(&self, models: Models) -> bool {
        self.models.set(models).is_ok()
    }

    pub fn models(&self) -> Option<&Models> {
        self.models.get()
    }

    pub fn is_ready(&self) -> bool {
        self.models.get().is_some()
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    /// Run one turn on a raw little-endian `i16` request body.
    pub async fn run_turn(&self, audio: &[u8]) -> Result<TurnResponse, TurnError> {
        let mut progress = TurnProgress::new();
        self.run_tracked(audio, &mut progress).await
    }

    async fn run_tracked(
        &self,
        audio: &[u8],
        progress: &mut TurnProgress,
    ) -> Result<TurnResponse, TurnError> {
        if audio.is_empty() {
            return Err(failed(progress, TurnError::NoAudio));
        }
        log::info!("turn: received {} bytes of audio", audio.len());

        let samples = match decode_pcm16(audio, self.settings.channels) {
            Ok(samples) => samples,
            Err(e) => return Err(failed(progress, TurnError::MalformedAudio(e.to_string()))),
        };

        progress.enter(TurnState::Transcribing);
        let Some(models) = self.models.get() else {
            return Err(failed(progress, TurnError::ModelsNotLoaded));
        };

        let transcription = match models.transcriber.transcribe_pcm(samples).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => return Err(failed(progress, TurnError::Transcription(e))),
        };
        log::info!("turn: transcription {:?}", transcription);

        if is_exit_phrase(&transcription, &self.settings.exit_phrases) {
            log::info!("turn: exit phrase detected, answering with the farewell");
            return Ok(self.farewell(transcription, progress).await);
        }

        progress.enter(TurnState::Retrieving);
        let retrieved = match models
            .retriever
            .retrieve(&transcription, self.settings.top_k)
            .await
        {
            Ok(passages) => passages,
            Err(e) => {
                log::warn!("turn: retrieval failed ({e}), answering without context");
                Vec::new()
            }
        };

        progress.enter(TurnState::Composing);
        let prompt = compose_prompt(&transcription, &retrieved, self.settings.max_context_chars);

        progress.enter(TurnState::Generating);
        let response_raw = self.generator.generate_or_apologise(&prompt).await;

        progress.enter(TurnState::PostProcessing);
        let response = clean_response(&response_raw);

        progress.enter(TurnState::Synthesizing);
        let audio = self.synthesizer.synthesize_best_effort(&response).await;

        progress.enter(TurnState::Responding);
        let body = TurnResponse {
            formatted_response: format_response(&response, &retrieved),
            transcription,
            response,
            response_raw,
            audio: encode_audio(audio),
            end_conversation: false,
        };

        progress.enter(TurnState::Done);
        log::debug!("turn: {}", progress.path());
        Ok(body)
    }

    /// Synthesize the configured greeting.
    pub async fn greet(&self) -> GreetResponse {
        let message = self.settings.greeting.clone();
        let audio = self.synthesizer.synthesize_best_effort(&message).await;
        GreetResponse {
            message,
            audio: encode_audio(audio),
        }
    }

    async fn farewell(&self, transcription: String, progress: &mut TurnProgress) -> TurnResponse {
        let farewell = self.settings.farewell.clone();

        progress.enter(TurnState::Synthesizing);
        let audio = self.synthesizer.synthesize_best_effort(&farewell).await;

        progress.enter(TurnState::Responding);
        let body = TurnResponse {
            transcription,
            formatted_response: format_response(&farewell, &[]),
            response_raw: farewell.clone(),
            response: farewell,
            audio: encode_audio(audio),
            end_conversation: true,
        };

        progress.enter(TurnState::Done);
        log::debug!("turn: {}", progress.path());
        body
    }
}

fn failed(progress: &mut TurnProgress, err: TurnError) -> TurnError {
    log::warn!("turn: {} failed: {err}", progress.current().label());
    progress.fail(err.to_string());
    err
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
