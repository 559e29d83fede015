//! services/reader/src/bin/reader.rs

use library_reader_core::ports::{LibraryService, ProgressStore};
use reader_lib::{
    adapters::HttpLibraryAdapter, cli::Shell, config::Config, error::ReaderError,
    sync::ProgressSync,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ReaderError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    // Logs go to stderr so they never interleave with the pages on stdout.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting reader...");

    // --- 2. Initialize the Library Adapter ---
    let adapter = Arc::new(HttpLibraryAdapter::new(
        &config.api_base_url,
        config.request_timeout,
    )?);
    info!("Using library API at {}", config.api_base_url);
    let library: Arc<dyn LibraryService> = adapter.clone();
    let store: Arc<dyn ProgressStore> = adapter;

    // --- 3. Run the Shell ---
    let shell = Shell::new(
        library,
        ProgressSync::new(store),
        config.preferred_user_id.clone(),
        tokio::io::stdout(),
    );
    shell.run(BufReader::new(tokio::io::stdin())).await?;

    info!("Reader stopped.");
    Ok(())
}
