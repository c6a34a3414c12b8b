//! Watch the vault for changes and keep the index current.

use anyhow::Result;
use clap::Parser;
use memex::embeddings::OpenAiEmbedder;
use memex::index::ChunkIndex;
use memex::watch::run_watcher;
use memex::Config;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "watch")]
#[command(about = "Watch the vault and re-index notes as they change")]
struct Args {
    /// Debounce delay in milliseconds before processing a file change
    #[arg(long, default_value = "500")]
    debounce_ms: u64,

    /// Run a full incremental index pass before watching
    #[arg(long)]
    catch_up: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    log::info!("Starting memex watcher");
    let config = Config::load()?;
    log::info!("Vault: {}", config.vault_path().display());
    log::info!("Debounce: {} ms", args.debounce_ms);

    let index = ChunkIndex::open(config.db_path()).await?;
    let embedder: Arc<dyn memex::embeddings::Embedder> =
        Arc::new(OpenAiEmbedder::from_config(&config.embeddings)?);

    if args.catch_up {
        log::info!("Catch-up pass before watching");
        memex::ingest::ingest_vault(&index, embedder.as_ref(), config.vault_path(), false).await?;
    }

    log::info!("Watching for changes (Ctrl+C to stop)");
    run_watcher(
        index,
        embedder,
        config.vault_path().to_path_buf(),
        args.debounce_ms,
    )
    .await?;
    Ok(())
}
