//! HTTP contract tests for the server router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use gita_voice::config::AppConfig;
use gita_voice::corpus::Corpus;
use gita_voice::embed::{EmbedError, Encoder};
use gita_voice::index::FlatIndex;
use gita_voice::llm::{Generator, GeneratorChain, LlmError};
use gita_voice::pipeline::{Models, TurnOrchestrator, TurnSettings};
use gita_voice::retrieval::Retriever;
use gita_voice::server::{router, MAX_BODY_BYTES};
use gita_voice::stt::{SttEngine, SttError, Transcriber};
use gita_voice::tts::{Synthesizer, SynthesizerChain, TtsError};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

struct FixedStt(&'static str);

impl SttEngine for FixedStt {
    fn transcribe(&self, _audio: &[f32]) -> Result<String, SttError> {
        Ok(self.0.to_string())
    }
}

/// Two-axis encoder: "action" vs everything else.
struct AxisEncoder;

#[async_trait]
impl Encoder for AxisEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts
            .iter()
            .map(|t| {
                if t.to_lowercase().contains("action") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model(&self) -> &str {
        "axis"
    }
}

struct AlwaysOk(&'static str);

#[async_trait]
impl Generator for AlwaysOk {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> String {
        "ok".into()
    }
}

struct AlwaysFails;

#[async_trait]
impl Generator for AlwaysFails {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Request("connection refused".into()))
    }

    fn name(&self) -> String {
        "fails".into()
    }
}

#[async_trait]
impl Synthesizer for AlwaysFails {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
        Err(TtsError::EmptyAudio)
    }

    fn name(&self) -> String {
        "fails".into()
    }
}

struct TinyWav;

#[async_trait]
impl Synthesizer for TinyWav {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
        Ok(b"RIFF".to_vec())
    }

    fn name(&self) -> String {
        "tiny".into()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn orchestrator(
    generators: Vec<Arc<dyn Generator>>,
    synths: Vec<Arc<dyn Synthesizer>>,
) -> Arc<TurnOrchestrator> {
    let config = AppConfig::default();
    Arc::new(TurnOrchestrator::new(
        TurnSettings::from_config(&config),
        GeneratorChain::new(generators, config.conversation.apology.clone()),
        SynthesizerChain::new(synths, config.tts.max_chars),
    ))
}

async fn install_models(orc: &TurnOrchestrator, transcription: &'static str) {
    let corpus = Corpus::from_texts([
        "You have a right to action alone, never to its fruits.",
        "The soul is neither born nor does it die.",
    ]);
    let encoder: Arc<dyn Encoder> = Arc::new(AxisEncoder);
    let vectors = encoder.encode(&corpus.texts()).await.unwrap();
    let index = FlatIndex::build(2, vectors).unwrap();

    assert!(orc.install_models(Models {
        transcriber: Transcriber::new(Some(Arc::new(FixedStt(transcription))), Vec::new(), 16_000),
        retriever: Retriever::new(encoder, Arc::new(index), Arc::new(corpus)),
    }));
}

fn post_audio(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process_audio")
        .header("content-type", "application/octet-stream")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// One second of 16 kHz silence.
fn one_second() -> Vec<u8> {
    vec![0u8; 32_000]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_unloaded_models() {
    let app = router(orchestrator(vec![], vec![]));

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["models_loaded"], false);
    assert_eq!(json["passages"], 0);
}

#[tokio::test]
async fn health_reports_loaded_models() {
    let orc = orchestrator(vec![], vec![]);
    install_models(&orc, "hello").await;

    let json = json_body(router(orc).oneshot(get("/health")).await.unwrap()).await;

    assert_eq!(json["models_loaded"], true);
    assert_eq!(json["passages"], 2);
    assert_eq!(json["index_vectors"], 2);
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let app = router(orchestrator(vec![], vec![]));

    let response = app.oneshot(post_audio(Vec::new())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No audio data received");
}

#[tokio::test]
async fn audio_before_models_is_unavailable() {
    let app = router(orchestrator(vec![], vec![]));

    let response = app.oneshot(post_audio(one_second())).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("Models not loaded"));
}

#[tokio::test]
async fn four_minutes_of_mono_fits_under_the_body_limit() {
    let four_minutes = vec![0u8; 4 * 60 * 16_000 * 2];
    assert!(four_minutes.len() <= MAX_BODY_BYTES);

    let app = router(orchestrator(vec![], vec![]));
    let response = app.oneshot(post_audio(four_minutes)).await.unwrap();

    // Reaches the handler, which has no models yet.
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn body_over_the_limit_is_rejected() {
    let app = router(orchestrator(vec![], vec![]));

    let response = app
        .oneshot(post_audio(vec![0u8; MAX_BODY_BYTES + 2]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn turn_returns_the_wire_contract() {
    let orc = orchestrator(
        vec![Arc::new(AlwaysOk("Act, but release the fruits. (id=0) [id=0]"))],
        vec![Arc::new(TinyWav)],
    );
    install_models(&orc, "What should guide my action?").await;

    let response = router(orc).oneshot(post_audio(one_second())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["transcription"], "What should guide my action?");
    assert_eq!(json["response"], "Act, but release the fruits.");
    assert_eq!(json["response_raw"], "Act, but release the fruits. (id=0) [id=0]");
    assert!(json["formatted_response"]
        .as_str()
        .unwrap()
        .contains("(id=0, score=1.0000)"));
    assert_eq!(json["audio"], "52494646");
}

#[tokio::test]
async fn failing_generators_still_succeed_with_apology() {
    let orc = orchestrator(
        vec![Arc::new(AlwaysFails), Arc::new(AlwaysFails)],
        vec![Arc::new(AlwaysFails)],
    );
    install_models(&orc, "Is the soul eternal?").await;

    let response = router(orc).oneshot(post_audio(one_second())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["response"], AppConfig::default().conversation.apology);
    assert!(json["audio"].is_null());
}

#[tokio::test]
async fn exit_phrase_returns_farewell() {
    let orc = orchestrator(vec![Arc::new(AlwaysOk("unused"))], vec![]);
    install_models(&orc, "Thank you, that helps").await;

    let json = json_body(router(orc).oneshot(post_audio(one_second())).await.unwrap()).await;

    assert_eq!(json["response"], AppConfig::default().conversation.farewell);
    assert_eq!(json["end_conversation"], true);
}

#[tokio::test]
async fn greet_returns_greeting() {
    let app = router(orchestrator(vec![], vec![Arc::new(TinyWav)]));

    let json = json_body(app.oneshot(get("/greet")).await.unwrap()).await;

    assert_eq!(json["message"], "Om Namah Shivaya");
    assert_eq!(json["audio"], "52494646");
}
