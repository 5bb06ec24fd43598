//! Turn helpers for the interactive client loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::actuator::{JawAnimator, JawLink, JawTiming};
use crate::audio::{encode_pcm16, play_wav, AudioCapture, AudioError, AudioQuality, Playback};
use crate::client::api::ClientError;
use crate::config::AudioConfig;

/// How long `speak` waits for the jaw thread after playback.
const JAW_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Empty line: record and send a turn.
    Record,
    /// `test`: run the jaw test sequence.
    TestJaw,
    Quit,
    Unknown(String),
}

/// Parse a line typed at the prompt.
///
/// ```
/// use gita_voice::client::{parse_command, ClientCommand};
///
/// assert_eq!(parse_command(""), ClientCommand::Record);
/// assert_eq!(parse_command(" Test "), ClientCommand::TestJaw);
/// assert_eq!(parse_command("q"), ClientCommand::Quit);
/// ```
pub fn parse_command(line: &str) -> ClientCommand {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "" => ClientCommand::Record,
        "test" => ClientCommand::TestJaw,
        "quit" | "exit" | "q" => ClientCommand::Quit,
        _ => ClientCommand::Unknown(line),
    }
}

/// Record one question and return it as the request body.
///
/// Silent or too-short recordings are rejected before anything is sent.
pub fn record_turn(
    capture: &AudioCapture,
    audio: &AudioConfig,
    quality: &AudioQuality,
) -> Result<Vec<u8>, ClientError> {
    let samples = capture.record(
        Duration::from_secs_f32(audio.record_secs.max(0.0)),
        audio.sample_rate,
    )?;
    quality.validate(&samples, audio.sample_rate)?;
    Ok(encode_pcm16(&samples))
}

/// Play a WAV reply, moving the jaw for as long as playback lasts.
pub fn speak<L>(wav: &[u8], jaw: Option<&Arc<Mutex<L>>>) -> Result<Playback, AudioError>
where
    L: JawLink + 'static,
{
    let animator = jaw.map(|link| JawAnimator::start(Arc::clone(link), JawTiming::default()));
    let played = play_wav(wav);
    if let Some(animator) = animator {
        animator.stop(JAW_STOP_TIMEOUT);
    }
    played
}

/// Decode the hex audio field of a response.
pub fn decode_audio(hex_audio: &str) -> Result<Vec<u8>, ClientError> {
    hex::decode(hex_audio).map_err(|e| ClientError::Decode(format!("audio field: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
