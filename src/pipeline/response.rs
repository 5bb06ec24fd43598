//! Response bundles returned to the client.

use serde::{Deserialize, Serialize};

use crate::retrieval::ScoredPassage;

/// The JSON body of a successful turn.
///
/// `audio` is the synthesized WAV, hex-encoded, or `null` when synthesis
/// failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub transcription: String,
    /// Cleaned answer, safe to speak.
    pub response: String,
    /// Generator output before citation cleanup.
    pub response_raw: String,
    pub formatted_response: String,
    pub audio: Option<String>,
    /// Set when the transcription contained an exit phrase.
    #[serde(default)]
    pub end_conversation: bool,
}

/// The JSON body of `GET /greet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreetResponse {
    pub message: String,
    pub audio: Option<String>,
}

/// Human-readable answer followed by the retrieved sources.
pub fn format_response(answer: &str, retrieved: &[ScoredPassage]) -> String {
    let mut out = format!("=== AI Response ===\n{}\n\n", answer.trim());
    if retrieved.is_empty() {
        out.push_str("(No verses retrieved.)\n");
        return out;
    }

    out.push_str("=== Top Source Verse(s) ===\n");
    for passage in retrieved {
        let label = passage
            .label
            .as_deref()
            .map(|l| format!(" {l}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "\n(id={}, score={:.4}){label}\n{}\n---\n",
            passage.id, passage.score, passage.text
        ));
    }
    out
}

/// Hex-encode optional audio for the wire.
pub fn encode_audio(audio: Option<Vec<u8>>) -> Option<String> {
    audio.map(hex::encode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
