//! Route handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::pipeline::{GreetResponse, TurnOrchestrator, TurnResponse};
use crate::server::error::ApiError;

/// Largest accepted request body: 8 MiB, about 4 minutes of 16 kHz mono
/// `i16`. Whisper's own 60 s bound applies after decoding.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Build the server router.
pub fn router(orchestrator: Arc<TurnOrchestrator>) -> Router {
    Router::new()
        .route("/process_audio", post(process_audio))
        .route("/health", get(health))
        .route("/greet", get(greet))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(orchestrator)
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: bool,
    pub passages: usize,
    pub index_vectors: usize,
}

async fn health(State(orchestrator): State<Arc<TurnOrchestrator>>) -> Json<HealthResponse> {
    let (passages, index_vectors) = orchestrator
        .models()
        .map(|m| (m.retriever.corpus().len(), m.retriever.index().len()))
        .unwrap_or((0, 0));

    Json(HealthResponse {
        status: "healthy".into(),
        models_loaded: orchestrator.is_ready(),
        passages,
        index_vectors,
    })
}

async fn process_audio(
    State(orchestrator): State<Arc<TurnOrchestrator>>,
    body: Bytes,
) -> Result<Json<TurnResponse>, ApiError> {
    let response = orchestrator.run_turn(&body).await?;
    Ok(Json(response))
}

async fn greet(State(orchestrator): State<Arc<TurnOrchestrator>>) -> Json<GreetResponse> {
    Json(orchestrator.greet().await)
}
