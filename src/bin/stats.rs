use anyhow::Result;
use memex::index::ChunkIndex;
use memex::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let config = Config::load()?;
    let index = ChunkIndex::open(config.db_path()).await?;

    let summaries = index.document_summaries().await?;
    let total_chunks = index.chunk_count().await?;

    println!("\n=== memex Index Statistics ===\n");

    if summaries.is_empty() {
        println!("Index is empty. Run `index` to ingest the vault.");
        return Ok(());
    }

    println!("{:-<80}", "");
    println!("{:<48} {:>8} {:>22}", "Note", "Chunks", "Indexed at");
    println!("{:-<80}", "");
    for doc in &summaries {
        println!(
            "{:<48} {:>8} {:>22}",
            doc.path, doc.chunk_count, doc.indexed_at
        );
    }
    println!("{:-<80}", "");

    println!("\nDocuments: {}", summaries.len());
    println!("Chunks: {}", total_chunks);
    let avg = total_chunks as f64 / summaries.len() as f64;
    println!("Chunks per document: {:.1}", avg);
    println!();

    Ok(())
}
