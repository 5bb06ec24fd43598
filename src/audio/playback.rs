//! Blocking WAV playback for the client.
//!
//! Tries the default output device through `rodio`, then the system players
//! `aplay` and `paplay`. When nothing can play the clip, [`play_wav`] waits
//! for the clip's duration instead so anything synchronised to playback
//! (the jaw animator) still runs for the right length of time.

use std::io::{Cursor, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::audio::error::AudioError;
use crate::audio::wav::wav_duration_secs;

/// System players tried in order after the audio device.
const SYSTEM_PLAYERS: [&str; 2] = ["aplay", "paplay"];

/// How a clip was played.
#[derive(Debug, Clone, PartialEq)]
pub enum Playback {
    /// Played through the default output device.
    Device,
    /// Played by the named system player.
    System(&'static str),
    /// Nothing could play it; waited for the clip duration instead.
    Waited(Duration),
}

/// Play an in-memory WAV clip and block until it finishes.
pub fn play_wav(bytes: &[u8]) -> Result<Playback, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }

    match play_on_device(bytes) {
        Ok(()) => return Ok(Playback::Device),
        Err(e) => log::warn!("playback: audio device unavailable ({e})"),
    }

    for player in SYSTEM_PLAYERS {
        match play_with(player, bytes) {
            Ok(()) => return Ok(Playback::System(player)),
            Err(e) => log::debug!("playback: {player} failed ({e})"),
        }
    }

    let secs = wav_duration_secs(bytes)?;
    let duration = Duration::from_secs_f32(secs.max(0.0));
    log::warn!("playback: no player available, waiting {secs:.1}s instead");
    std::thread::sleep(duration);
    Ok(Playback::Waited(duration))
}

fn play_on_device(bytes: &[u8]) -> Result<(), AudioError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| AudioError::Playback(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| AudioError::Playback(e.to_string()))?;
    let source = Decoder::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AudioError::Playback(format!("decode failed: {e}")))?;
    sink.append(source.convert_samples::<f32>());
    sink.sleep_until_end();
    Ok(())
}

/// Write the clip to a temporary file and run `player` on it.
fn play_with(player: &str, bytes: &[u8]) -> Result<(), AudioError> {
    let mut file = tempfile::Builder::new()
        .prefix("gita-reply-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| AudioError::Playback(e.to_string()))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| AudioError::Playback(e.to_string()))?;

    let status = Command::new(player)
        .arg(file.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| AudioError::Playback(format!("{player}: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(AudioError::Playback(format!("{player} exited with {status}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
