//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a settings file only needs to
//! mention the keys it overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Network settings for `gita-server`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Wire audio format shared by client and server.
///
/// Request bodies are raw little-endian `i16` PCM at `sample_rate` with
/// `channels` interleaved channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz. Whisper expects 16 000.
    pub sample_rate: u32,
    /// Interleaved channels in the request body.
    pub channels: u16,
    /// How long the client records per turn.
    pub record_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            record_secs: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// GGML Whisper model file. Relative paths resolve against the models
    /// directory from [`AppPaths`].
    pub model: PathBuf,
    /// ISO-639-1 language code, or `"auto"`.
    pub language: String,
    /// Optional HTTP transcriber for the WAV-file path, tried after the
    /// local model has been re-run on the file.
    pub remote: Option<RemoteSttConfig>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("ggml-small.bin"),
            language: "en".into(),
            remote: None,
        }
    }
}

/// An OpenAI-compatible `/v1/audio/transcriptions` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSttConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

// ---------------------------------------------------------------------------
// EmbeddingConfig
// ---------------------------------------------------------------------------

/// Wire format spoken by the embedding endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EmbeddingProvider {
    /// Ollama native `/api/embed`.
    Ollama,
    /// Any OpenAI-compatible `/v1/embeddings`.
    OpenAiCompatible,
}

/// Settings for the embedding encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model identifier. Also part of the index cache fingerprint.
    pub model: String,
    /// Expected vector dimension; responses of any other size are rejected.
    pub dimension: usize,
    /// Texts per request when building the index.
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "all-minilm".into(),
            dimension: 384,
            batch_size: 64,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// RetrievalConfig
// ---------------------------------------------------------------------------

/// Corpus, index cache and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// CSV file holding the reference passages.
    pub corpus_path: PathBuf,
    /// Column tried first for passage text.
    pub text_column: String,
    /// Where the vector index is cached between runs.
    pub index_path: PathBuf,
    /// Passages retrieved per query.
    pub top_k: usize,
    /// Character budget for the prompt's context block.
    pub max_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/bhagavad_gita_verses.csv"),
            text_column: "translation".into(),
            index_path: PathBuf::from("data/gita_index.json"),
            top_k: 5,
            max_context_chars: 2000,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Selects which wire protocol a generation backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LlmProvider {
    /// Ollama native `/api/chat`.
    Ollama,
    /// Any OpenAI-compatible REST API (OpenAI, Groq, LM Studio, vLLM …).
    OpenAiCompatible,
}

/// One generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBackendConfig {
    /// Which backend to use.
    pub provider: LlmProvider,
    /// Base URL of the API endpoint.
    pub base_url: String,
    /// API key, `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

/// Generation backends, tried in order until one succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backends: Vec<LlmBackendConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                LlmBackendConfig {
                    provider: LlmProvider::Ollama,
                    base_url: "http://localhost:11434".into(),
                    api_key: None,
                    model: "gemma3:1b".into(),
                    temperature: 0.7,
                    max_tokens: 300,
                    timeout_secs: 120,
                },
                LlmBackendConfig {
                    provider: LlmProvider::OpenAiCompatible,
                    base_url: "http://localhost:8000".into(),
                    api_key: None,
                    model: "bigscience/bloom".into(),
                    temperature: 0.7,
                    max_tokens: 200,
                    timeout_secs: 120,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// One speech synthesis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TtsBackendConfig {
    /// The `piper` command-line synthesizer with an `.onnx` voice.
    Piper {
        binary: PathBuf,
        voice: PathBuf,
        length_scale: f32,
    },
    /// An OpenAI-compatible `/v1/audio/speech` endpoint returning WAV.
    Api {
        base_url: String,
        api_key: Option<String>,
        model: String,
        voice: String,
        timeout_secs: u64,
    },
    /// `espeak-ng --stdout`.
    Espeak { binary: PathBuf, words_per_minute: u32 },
}

/// Synthesis backends, tried in order; all failing yields no audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub backends: Vec<TtsBackendConfig>,
    /// Text longer than this is cut before synthesis.
    pub max_chars: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                TtsBackendConfig::Piper {
                    binary: PathBuf::from("piper"),
                    voice: PathBuf::from("models/en_GB-southern_english_female-low.onnx"),
                    length_scale: 1.4,
                },
                TtsBackendConfig::Espeak {
                    binary: PathBuf::from("espeak-ng"),
                    words_per_minute: 150,
                },
            ],
            max_chars: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationConfig
// ---------------------------------------------------------------------------

/// Fixed texts and end-of-conversation phrases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// A transcription containing any of these (case-insensitive) ends the
    /// conversation.
    pub exit_phrases: Vec<String>,
    /// Spoken instead of an answer when an exit phrase is heard.
    pub farewell: String,
    /// Returned when every generation backend fails.
    pub apology: String,
    /// Returned by `GET /greet`.
    pub greeting: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            exit_phrases: vec![
                "thank you".into(),
                "thanks".into(),
                "that's all".into(),
                "nothing else".into(),
                "goodbye".into(),
            ],
            farewell: "Thank you for seeking Gita wisdom. May you find peace and fulfillment \
                       on your spiritual journey. Om Shanti!"
                .into(),
            apology: "I'm sorry, the language model is currently unavailable.".into(),
            greeting: "Om Namah Shivaya".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Settings for `gita-client`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of `gita-server`.
    pub server_url: String,
    /// Upper bound on one turn's HTTP round trip.
    pub request_timeout_secs: u64,
    /// Drive the jaw actuator during playback.
    pub actuator_enabled: bool,
    /// Serial port tried first for the actuator.
    pub actuator_port: String,
    pub actuator_baud: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://192.168.1.100:5000".into(),
            request_timeout_secs: 120,
            actuator_enabled: true,
            actuator_port: "/dev/ttyUSB0".into(),
            actuator_baud: 9600,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// Server and client read the same file; each ignores the sections it does
/// not use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub conversation: ConversationConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whisper model path with relative paths resolved against the models
    /// directory.
    pub fn whisper_model_path(&self) -> PathBuf {
        AppPaths::new().resolve_model(&self.stt.model)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
