//! Startup construction and background model loading.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::config::AppConfig;
use crate::corpus::Corpus;
use crate::embed::{ApiEncoder, Encoder};
use crate::index::load_or_build;
use crate::llm::{build_generators, Generator, GeneratorChain};
use crate::pipeline::{Models, TurnOrchestrator, TurnSettings};
use crate::retrieval::Retriever;
use crate::stt::{
    ApiTranscriber, FileTranscriber, LocalFileTranscriber, SttEngine, TranscribeParams, Transcriber,
    WhisperEngine,
};
use crate::tts::{build_synthesizers, SynthesizerChain};

/// Build the orchestrator with its generation and synthesis backends.
///
/// Models are not loaded here; see [`spawn_model_loader`].
pub fn build_orchestrator(config: &AppConfig) -> TurnOrchestrator {
    let generator = GeneratorChain::new(
        build_generators(&config.llm.backends),
        config.conversation.apology.clone(),
    );
    let synthesizer =
        SynthesizerChain::new(build_synthesizers(&config.tts.backends), config.tts.max_chars);

    log::info!(
        "server: {} generation backends ({}), {} synthesis backends",
        generator.len(),
        generator.name(),
        synthesizer.len()
    );

    TurnOrchestrator::new(TurnSettings::from_config(config), generator, synthesizer)
}

/// Assemble the transcriber around an optionally loaded Whisper engine.
///
/// A loaded engine is also the first file backend, re-run on the temporary
/// WAV; a configured HTTP transcriber follows it.
pub fn build_transcriber(
    direct: Option<Arc<dyn SttEngine>>,
    config: &AppConfig,
) -> Result<Transcriber> {
    let mut files: Vec<Arc<dyn FileTranscriber>> = Vec::new();
    if let Some(engine) = &direct {
        files.push(Arc::new(LocalFileTranscriber::new(Arc::clone(engine))));
    }
    if let Some(remote) = &config.stt.remote {
        log::info!("stt: file transcriber at {}", remote.base_url);
        files.push(Arc::new(ApiTranscriber::from_config(remote, &config.stt.language)));
    }

    if direct.is_none() && files.is_empty() {
        bail!(
            "no transcription backend: {} is missing and no remote transcriber is configured",
            config.whisper_model_path().display()
        );
    }

    let transcriber = Transcriber::new(direct, files, config.audio.sample_rate);
    log::info!("stt: WAV fallback via {:?}", transcriber.file_backends());
    Ok(transcriber)
}

/// Load the transcriber, corpus, encoder and index.
///
/// A missing Whisper model is tolerated when an HTTP transcriber is
/// configured; otherwise it is an error.
pub async fn load_models(config: &AppConfig) -> Result<Models> {
    // ── Transcription ────────────────────────────────────────────────────
    let model_path = config.whisper_model_path();
    let params = TranscribeParams::for_language(&config.stt.language);
    let path = model_path.clone();
    let direct: Option<Arc<dyn SttEngine>> =
        match tokio::task::spawn_blocking(move || WhisperEngine::load(&path, params))
            .await
            .context("whisper loading task failed")?
        {
            Ok(engine) => {
                log::info!("stt: Whisper model loaded from {}", model_path.display());
                Some(Arc::new(engine))
            }
            Err(e) => {
                log::warn!("stt: could not load {} ({e})", model_path.display());
                None
            }
        };

    let transcriber = build_transcriber(direct, config)?;

    // ── Corpus ───────────────────────────────────────────────────────────
    let corpus_path = config.retrieval.corpus_path.clone();
    let column = config.retrieval.text_column.clone();
    let corpus = tokio::task::spawn_blocking(move || Corpus::load(&corpus_path, &column))
        .await
        .context("corpus loading task failed")?
        .with_context(|| format!("loading corpus {}", config.retrieval.corpus_path.display()))?;
    log::info!(
        "corpus: {} passages from column {:?}",
        corpus.len(),
        corpus.text_column()
    );

    // ── Encoder + index ──────────────────────────────────────────────────
    let encoder: Arc<dyn Encoder> = Arc::new(ApiEncoder::from_config(&config.embedding));
    let index = load_or_build(&corpus, encoder.as_ref(), &config.retrieval.index_path)
        .await
        .context("building the vector index")?;

    let retriever = Retriever::new(encoder, Arc::new(index), Arc::new(corpus));
    Ok(Models {
        transcriber,
        retriever,
    })
}

/// Load models on a background task and install them into `orchestrator`.
///
/// Failure is logged; the server keeps answering `503` for turns.
pub fn spawn_model_loader(
    orchestrator: Arc<TurnOrchestrator>,
    config: AppConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        log::info!("server: loading models in the background");
        match load_models(&config).await {
            Ok(models) => {
                orchestrator.install_models(models);
                log::info!("server: models loaded, ready for turns");
            }
            Err(e) => log::error!("server: model loading failed: {e:#}"),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
