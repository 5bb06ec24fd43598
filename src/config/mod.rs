//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, AudioConfig, ClientConfig, ConversationConfig, EmbeddingConfig,
    EmbeddingProvider, LlmBackendConfig, LlmConfig, LlmProvider, RemoteSttConfig,
    RetrievalConfig, ServerConfig, SttConfig, TtsBackendConfig, TtsConfig,
};
