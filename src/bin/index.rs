use anyhow::Result;
use clap::Parser;
use memex::embeddings::OpenAiEmbedder;
use memex::index::ChunkIndex;
use memex::ingest::ingest_vault;
use memex::Config;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "index")]
#[command(about = "Index the vault's markdown notes (incremental by default)")]
struct Args {
    /// Re-embed every note, ignoring stored content hashes
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    log::info!("Starting memex indexing");
    let config = Config::load()?;
    log::info!("Vault: {}", config.vault_path().display());
    log::info!("Database path: {}", config.db_path().display());

    let index = ChunkIndex::open(config.db_path()).await?;
    let embedder = OpenAiEmbedder::from_config(&config.embeddings)?;

    if args.force {
        log::info!("Mode: full re-indexing (all notes)");
    }

    let start = Instant::now();
    let stats = ingest_vault(&index, &embedder, config.vault_path(), args.force).await?;
    let elapsed = start.elapsed();

    log::info!("=== Indexing Complete ===");
    log::info!("Notes indexed: {}", stats.indexed);
    log::info!("Notes unchanged (skipped): {}", stats.unchanged);
    log::info!("Notes removed from index: {}", stats.removed);
    log::info!("Chunks written: {}", stats.chunks);
    log::info!("Time: {:?}", elapsed);

    if stats.failed > 0 {
        log::warn!("{} note(s) failed to index, see logs above", stats.failed);
    }

    Ok(())
}
