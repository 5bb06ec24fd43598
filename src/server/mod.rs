//! HTTP surface of the server binary.
//!
//! | Route                 | Body in             | Body out            |
//! |-----------------------|---------------------|---------------------|
//! | `POST /process_audio` | raw `i16` LE PCM    | [`TurnResponse`](crate::pipeline::TurnResponse) |
//! | `GET /health`         | -                   | [`HealthResponse`]  |
//! | `GET /greet`          | -                   | [`GreetResponse`](crate::pipeline::GreetResponse) |
//!
//! The router shares one [`TurnOrchestrator`](crate::pipeline::TurnOrchestrator)
//! across requests. Its models are installed by [`spawn_model_loader`] once
//! they finish loading; nothing is mutated afterwards.

pub mod error;
pub mod loader;
pub mod routes;

pub use error::ApiError;
pub use loader::{build_orchestrator, build_transcriber, load_models, spawn_model_loader};
pub use routes::{router, HealthResponse, MAX_BODY_BYTES};
