//! Golf table client binary.
//!
//! Replays a recorded session against a headless scene and prints every
//! outbound event as one JSON line on stdout.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p golf-table-client -- session.jsonl
//! ```
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use client_frontend_core::{FrontendConfig, MemoryScene, TableController};
use golf_table_client::{ClientConfig, RecordingTransport, logging, replay};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let client_config = ClientConfig::from_env();
    let frontend_config = FrontendConfig::from_env();

    // 2. Setup logging
    let _guard = logging::setup_logging(client_config.log_dir.as_deref())?;

    let script = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: golf-table <session.jsonl>")?;
    let steps = replay::load(&script)
        .with_context(|| format!("cannot load {}", script.display()))?;

    tracing::info!("Starting Golf table client");
    tracing::debug!(?client_config, ?frontend_config, "configuration loaded");

    // 3. Replay through the event loop
    let controller = TableController::new(MemoryScene::new(), &frontend_config);
    let (controller, transport) =
        replay::run(steps, controller, RecordingTransport::new(), &client_config).await?;

    // 4. Report outbound events
    let mut out = std::io::stdout().lock();
    for event in transport.sent() {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }

    tracing::info!(
        nodes = controller.scene().len(),
        generation = controller.view().generation(),
        "Replay complete"
    );
    Ok(())
}
