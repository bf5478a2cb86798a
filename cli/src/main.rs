//! CLI entrypoint for palaver
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use palaver_application::ChatController;
use palaver_infrastructure::{ConfigLoader, FileConfig, JsonFileSessionStore, OpenAiChatBackend};
use palaver_presentation::{ChatRepl, Cli, StreamPrinter};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // Logs go to stderr so they never interleave with the chat stream.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting palaver");

    let mut config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?
    };

    // Command-line overrides beat every config source
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(dir) = cli.data_dir {
        config.storage.dir = Some(dir);
    }

    let Some(data_dir) = config.storage.resolve_dir() else {
        bail!("Could not determine a data directory; set storage.dir or pass --data-dir");
    };

    info!("Model: {}, data dir: {}", config.model, data_dir.display());

    // === Dependency Injection ===
    let backend = Arc::new(OpenAiChatBackend::new(
        config.api.base_url.clone(),
        config.model.clone(),
        config.api.api_key(),
    ));
    let store = Arc::new(JsonFileSessionStore::new(&data_dir));
    let printer = Arc::new(StreamPrinter::new());

    let controller = ChatController::bootstrap(backend, store, printer).await;

    let mut repl = ChatRepl::new(controller);
    repl.run().await?;

    Ok(())
}
