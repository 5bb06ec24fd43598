//! `gita-server`: answers spoken questions over HTTP.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from `--config` or the platform config dir.
//! 3. Build the turn orchestrator (generation + synthesis backends).
//! 4. Spawn the background model loader (Whisper, corpus, index).
//! 5. Bind and serve; turns answer `503` until the models are in.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gita_voice::config::{AppConfig, AppPaths};
use gita_voice::server::{build_orchestrator, router, spawn_model_loader};

/// Bhagavad Gita voice assistant server
#[derive(Parser)]
#[command(name = "gita-server", version, about)]
struct Cli {
    /// Path to settings.toml
    #[arg(short, long, env = "GITA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| AppPaths::new().settings_file);
    let mut config = AppConfig::load_from(&config_path)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.write_config {
        config.save_to(&config_path)?;
        log::info!("wrote {}", config_path.display());
        return Ok(());
    }
    log::info!("Gita Voice server starting (config {})", config_path.display());

    let orchestrator = Arc::new(build_orchestrator(&config));
    spawn_model_loader(Arc::clone(&orchestrator), config.clone());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("listening on http://{addr}");

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
