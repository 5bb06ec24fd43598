//! Turn orchestration.
//!
//! * [`TurnState`] / [`TurnProgress`]: the per-turn state machine.
//! * [`TurnOrchestrator`]: transcription → retrieval → prompt →
//!   generation → cleanup → synthesis for one request.
//! * [`TurnResponse`] / [`GreetResponse`]: the JSON bundles sent back.

pub mod response;
pub mod runner;
pub mod state;

pub use response::{encode_audio, format_response, GreetResponse, TurnResponse};
pub use runner::{is_exit_phrase, Models, TurnError, TurnOrchestrator, TurnSettings};
pub use state::{TurnProgress, TurnState};
