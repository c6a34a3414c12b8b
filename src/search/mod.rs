pub mod assemble;

pub use assemble::{assemble, render_markdown, DocumentHits};

use crate::embeddings::Embedder;
use crate::error::Result;
use crate::index::ChunkIndex;

/// Search the knowledge base with a free-text query.
///
/// Embeds the query, runs nearest-neighbor search over the chunk index, and
/// regroups the hits by source document in first-seen order with chunks
/// restored to document order. An empty or whitespace-only query returns no
/// results without touching the provider.
pub async fn search_notes(
    index: &ChunkIndex,
    embedder: &dyn Embedder,
    query: &str,
    k: usize,
    min_score: f32,
) -> Result<Vec<DocumentHits>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let start = std::time::Instant::now();
    let query_vec = embedder.embed(query).await?;
    log::debug!("query embedding took {:?}", start.elapsed());

    let hits = index.search(&query_vec, k, min_score).await?;
    log::debug!("{} hit(s) for query", hits.len());

    Ok(assemble(hits))
}
