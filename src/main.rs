//! Voxx Test Harness server
//!
//! Run with: cargo run --bin voxx-harness
//!
//! # Configuration
//!
//! Read from `--config <file>` or the default locations (see
//! [`voxx_harness::config::Config::load_default`]), then overridden by:
//! - `VOXX_API_URL`: Voxx API base URL
//! - `VOXX_TRIP_DETAIL_URL`: Separate host for trip details (optional)
//! - `VOXX_SESSION_PATH`: Session file location
//! - `VOXX_HOST` / `VOXX_PORT`: Address to bind to (default: 127.0.0.1:3000)
//! - `RUST_LOG`: Log filter (default: voxx_harness=info,tower_http=info)
//!
//! `--ephemeral` keeps the session in memory; the session file is neither
//! read nor written.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use voxx_harness::config::Config;
use voxx_harness::harness::{serve, AppState};
use voxx_harness::logging;
use voxx_harness::session::open_store;
use voxx_harness::voxx::VoxxClient;

#[derive(Parser)]
#[command(name = "voxx-harness")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Web harness for the Voxx telematics API")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep the session in memory only (lost on exit)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    logging::init(&config.logging);

    tracing::info!("Starting Voxx Test Harness v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Voxx API: {}", config.voxx.base_url);

    let client = VoxxClient::new(config.voxx.clone()).context("Failed to build Voxx client")?;
    let sessions = open_store(&config.session, args.ephemeral);

    serve(AppState::new(client, sessions), &config.server).await?;

    Ok(())
}
