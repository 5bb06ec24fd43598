//! `gita-client`: record a question, send it, play the answer.
//!
//! Commands at the prompt:
//! * ENTER: record `audio.record_secs` seconds and send a turn
//! * `test`: run the jaw test sequence
//! * `quit`: close the jaw and exit

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use gita_voice::actuator::{JawController, JawLink};
use gita_voice::audio::{AudioCapture, AudioQuality};
use gita_voice::client::{decode_audio, parse_command, record_turn, speak, ClientCommand, ServerClient};
use gita_voice::config::{AppConfig, AppPaths};
use gita_voice::pipeline::TurnResponse;

/// Bhagavad Gita voice assistant client
#[derive(Parser)]
#[command(name = "gita-client", version, about)]
struct Cli {
    /// Path to settings.toml
    #[arg(short, long, env = "GITA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the server URL, e.g. http://192.168.1.100:5000
    #[arg(short, long, env = "GITA_SERVER")]
    server: Option<String>,

    /// Run without the jaw actuator
    #[arg(long)]
    no_jaw: bool,
}

type SharedJaw = Arc<Mutex<JawController>>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(|| AppPaths::new().settings_file);
    let mut config = AppConfig::load_from(&config_path)?;
    if let Some(server) = cli.server {
        config.client.server_url = server;
    }

    let client = ServerClient::new(
        &config.client.server_url,
        Duration::from_secs(config.client.request_timeout_secs),
    )?;

    match client.health() {
        Ok(health) if health.models_loaded => log::info!(
            "server ready at {} ({} verses indexed)",
            client.base_url(),
            health.index_vectors
        ),
        Ok(_) => log::warn!("server at {} is still loading models", client.base_url()),
        Err(e) => bail!("server at {} not available: {e}", client.base_url()),
    }

    let jaw: Option<SharedJaw> = if config.client.actuator_enabled && !cli.no_jaw {
        match JawController::connect(&config.client.actuator_port, config.client.actuator_baud) {
            Ok(controller) => Some(Arc::new(Mutex::new(controller))),
            Err(e) => {
                log::warn!("jaw actuator unavailable ({e}); continuing without it");
                None
            }
        }
    } else {
        None
    };

    let capture = AudioCapture::new()?;
    let quality = AudioQuality::default();

    if let Ok(greeting) = client.greet() {
        println!("🙏 {}", greeting.message);
        play_reply(greeting.audio.as_deref(), jaw.as_ref());
    }

    println!("Press ENTER to ask a question, type 'test' to test the jaw, 'quit' to exit.");
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            ClientCommand::Record => {
                if run_turn(&client, &capture, &quality, &config, jaw.as_ref()) {
                    break;
                }
            }
            ClientCommand::TestJaw => match &jaw {
                Some(jaw) => match jaw.lock() {
                    Ok(mut link) => match link.test_sequence() {
                        Ok(()) => println!("jaw test completed"),
                        Err(e) => println!("jaw test failed: {e}"),
                    },
                    Err(_) => println!("jaw link unavailable"),
                },
                None => println!("no jaw actuator connected"),
            },
            ClientCommand::Quit => break,
            ClientCommand::Unknown(other) => println!("unknown command {other:?}"),
        }
    }

    if let Some(jaw) = jaw {
        match Arc::try_unwrap(jaw).map(Mutex::into_inner) {
            Ok(Ok(controller)) => controller.close(),
            _ => log::warn!("jaw link still in use; leaving it open"),
        }
    }
    println!("Om Shanti 🙏");
    Ok(())
}

/// Record, send and play one turn. Returns `true` when the server ended the
/// conversation.
fn run_turn(
    client: &ServerClient,
    capture: &AudioCapture,
    quality: &AudioQuality,
    config: &AppConfig,
    jaw: Option<&SharedJaw>,
) -> bool {
    println!("🎤 Listening for {:.0} seconds...", config.audio.record_secs);
    let pcm = match record_turn(capture, &config.audio, quality) {
        Ok(pcm) => pcm,
        Err(e) => {
            println!("recording rejected: {e}");
            return false;
        }
    };

    println!("⏳ Sending {} bytes...", pcm.len());
    let reply: TurnResponse = match client.process_audio(pcm) {
        Ok(reply) => reply,
        Err(e) => {
            println!("turn failed: {e}");
            return false;
        }
    };

    println!("📝 You asked: {}", reply.transcription);
    println!("{}", reply.formatted_response);
    play_reply(reply.audio.as_deref(), jaw);
    reply.end_conversation
}

fn play_reply(audio: Option<&str>, jaw: Option<&SharedJaw>) {
    let Some(hex_audio) = audio else {
        log::info!("reply has no audio");
        return;
    };
    match decode_audio(hex_audio).map_err(anyhow::Error::from).and_then(|wav| {
        speak(&wav, jaw).map_err(anyhow::Error::from)
    }) {
        Ok(playback) => log::debug!("played reply via {playback:?}"),
        Err(e) => log::warn!("could not play reply: {e}"),
    }
}
