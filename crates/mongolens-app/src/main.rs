//! MongoLens - headless command host
//!
//! Reads `{"command": ..., "args": ...}` lines on stdin and runs them
//! against a MongoDB server through the MongoLens command surface.

use anyhow::Context as _;
use mongolens_app::host::{ConsoleInput, ConsoleOutput};
use mongolens_app::{build_context, logging, runner};
use mongolens_connection::JsonFileStorage;
use mongolens_services::{Extension, ExtensionSettings};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = logging::init_default() {
        // Logging is not available yet
        eprintln!("FATAL: Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        build_mode = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        "Starting MongoLens"
    );

    let settings = ExtensionSettings::load().context("failed to load settings")?;
    let storage_path = settings.resolved_storage_path()?;
    let storage = JsonFileStorage::open(&storage_path)
        .await
        .with_context(|| format!("failed to open {}", storage_path.display()))?;
    tracing::info!(path = %storage_path.display(), "storage opened");

    let input = Arc::new(ConsoleInput::stdin());
    let output = Arc::new(ConsoleOutput::stdout());
    let ctx = build_context(settings, Arc::new(storage), input.clone(), output.clone());

    let extension = Extension::activate(ctx)
        .await
        .context("failed to activate")?;
    runner::run(extension, input, output).await;

    tracing::info!("MongoLens stopped");
    Ok(())
}
