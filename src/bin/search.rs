use anyhow::Result;
use clap::Parser;
use memex::embeddings::OpenAiEmbedder;
use memex::index::ChunkIndex;
use memex::search::{render_markdown, search_notes};
use memex::Config;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "search")]
#[command(about = "Search the indexed vault and print grouped excerpts")]
struct Args {
    /// Free-text query
    query: String,

    /// Number of chunks to retrieve (defaults to search.default_k from config)
    #[arg(short)]
    k: Option<usize>,

    /// Minimum cosine similarity for a hit
    #[arg(long)]
    min_score: Option<f32>,

    /// Print per-chunk similarity scores instead of rendered markdown
    #[arg(long)]
    scores: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    if args.query.trim().is_empty() {
        anyhow::bail!("query cannot be empty");
    }

    let config = Config::load()?;
    let index = ChunkIndex::open(config.db_path()).await?;
    let embedder = OpenAiEmbedder::from_config(&config.embeddings)?;

    let k = args.k.unwrap_or(config.search.default_k);
    let min_score = args.min_score.unwrap_or(config.search.min_score);

    let start = Instant::now();
    let groups = search_notes(&index, &embedder, &args.query, k, min_score).await?;
    let duration = start.elapsed();

    if groups.is_empty() {
        println!("No results found.");
    } else if args.scores {
        for group in &groups {
            println!("{}", group.path);
            for hit in &group.chunks {
                println!(
                    "  [{:>2}] {:.3}  {}",
                    hit.section.index, hit.similarity, hit.section.header
                );
            }
        }
    } else {
        print!("{}", render_markdown(&groups));
    }

    let hit_count: usize = groups.iter().map(|g| g.chunks.len()).sum();
    log::info!(
        "{} chunk(s) in {} document(s), {:?}",
        hit_count,
        groups.len(),
        duration
    );

    Ok(())
}
