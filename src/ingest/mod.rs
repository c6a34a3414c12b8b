pub mod walker;

pub use walker::{discover_notes, note_file, NoteFile};

use crate::chunking::{parse_frontmatter, split_sections};
use crate::embeddings::Embedder;
use crate::error::Result;
use crate::index::ChunkIndex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

/// What happened to one note during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Note was (re)indexed with the given number of chunks
    Indexed(usize),
    /// Stored hash matched the file on disk; nothing was written
    Unchanged,
}

/// Totals for one ingestion run over the vault
#[derive(Debug, Default)]
pub struct IngestStats {
    pub indexed: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failed: usize,
    pub chunks: usize,
}

/// Hex SHA-256 of a note's raw content, stored alongside the document so
/// unchanged files can be skipped on the next run
pub fn compute_content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Index one document from in-memory content.
///
/// Strips frontmatter, splits the remainder into header-based sections,
/// embeds every section, and replaces the document's chunks in the index.
/// Embedding happens before any write, so a provider failure leaves the
/// previously indexed state intact. Returns the number of chunks written.
pub async fn index_document(
    index: &ChunkIndex,
    embedder: &dyn Embedder,
    path: &str,
    title: &str,
    content: &str,
) -> Result<usize> {
    let hash = compute_content_hash(content);
    let (_frontmatter, body) = parse_frontmatter(content);
    let sections = split_sections(body, path);

    let texts: Vec<String> = sections.iter().map(|s| s.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    let count = index
        .upsert(path, title, Some(&hash), sections, embeddings)
        .await?;
    log::debug!("indexed {} ({} chunk(s))", path, count);
    Ok(count)
}

/// Ingest one note file, skipping it when the stored hash still matches.
///
/// With `force` set the hash check is bypassed and the note is re-embedded
/// unconditionally.
pub async fn ingest_note(
    index: &ChunkIndex,
    embedder: &dyn Embedder,
    note: &NoteFile,
    force: bool,
) -> Result<IngestOutcome> {
    let content = std::fs::read_to_string(&note.absolute_path)?;

    if !force {
        let current = compute_content_hash(&content);
        if index.stored_hash(&note.relative_path).await?.as_deref() == Some(current.as_str()) {
            log::debug!("unchanged, skipping {}", note.relative_path);
            return Ok(IngestOutcome::Unchanged);
        }
    }

    let count = index_document(index, embedder, &note.relative_path, &note.title, &content).await?;
    Ok(IngestOutcome::Indexed(count))
}

/// Ingest the whole vault: index new and modified notes, skip unchanged
/// ones, and drop index entries for notes deleted from disk.
///
/// A failure on one note is logged and counted but does not abort the run.
pub async fn ingest_vault(
    index: &ChunkIndex,
    embedder: &dyn Embedder,
    root: &Path,
    force: bool,
) -> Result<IngestStats> {
    let notes = discover_notes(root)?;
    let mut stats = IngestStats::default();

    for note in &notes {
        match ingest_note(index, embedder, note, force).await {
            Ok(IngestOutcome::Indexed(count)) => {
                stats.indexed += 1;
                stats.chunks += count;
            }
            Ok(IngestOutcome::Unchanged) => stats.unchanged += 1,
            Err(e) => {
                log::warn!("failed to ingest {}: {}", note.relative_path, e);
                stats.failed += 1;
            }
        }
    }

    let on_disk: HashSet<&str> = notes.iter().map(|n| n.relative_path.as_str()).collect();
    for summary in index.document_summaries().await? {
        if !on_disk.contains(summary.path.as_str()) {
            index.delete_document(&summary.path).await?;
            log::info!("removed deleted note {} from index", summary.path);
            stats.removed += 1;
        }
    }

    log::info!(
        "ingest complete: {} indexed, {} unchanged, {} removed, {} failed, {} chunk(s)",
        stats.indexed,
        stats.unchanged,
        stats.removed,
        stats.failed,
        stats.chunks
    );
    Ok(stats)
}
