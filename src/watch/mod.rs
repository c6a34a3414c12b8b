//! Live vault watching: re-index notes as they change on disk.
//!
//! A dedicated thread runs the notify watcher and debounces events; the async
//! side receives changed paths and runs the normal ingest pipeline for each,
//! so watch mode and a full `index` run always agree on what gets stored.

mod watcher;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::embeddings::Embedder;
use crate::error::{MemexError, Result};
use crate::index::ChunkIndex;
use crate::ingest::{self, note_file, IngestOutcome};

/// React to one filesystem event inside the vault.
///
/// Non-markdown paths and paths outside the vault are ignored. A deleted
/// note is dropped from the index; anything else goes through the standard
/// hash-checked ingest, so duplicate events are cheap no-ops.
pub async fn handle_file_change(
    index: &ChunkIndex,
    embedder: &dyn Embedder,
    root: &Path,
    path: &Path,
) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()).map(str::to_lowercase) != Some("md".into()) {
        return Ok(());
    }

    let root = root
        .canonicalize()
        .map_err(|e| MemexError::Config(format!("vault canonicalize: {e}")))?;

    // The file may already be gone; resolve the relative path without
    // canonicalizing the file itself.
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    if !absolute.is_file() {
        let Ok(relative) = absolute.strip_prefix(&root) else {
            return Ok(());
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if index.has_document(&relative).await? {
            index.delete_document(&relative).await?;
            log::info!("watch: removed {relative}");
        }
        return Ok(());
    }

    let absolute = absolute
        .canonicalize()
        .map_err(|e| MemexError::Config(format!("path canonicalize: {e}")))?;
    let Some(note) = note_file(&absolute, &root)? else {
        return Ok(());
    };

    let start = std::time::Instant::now();
    match ingest::ingest_note(index, embedder, &note, false).await? {
        IngestOutcome::Indexed(count) => {
            log::info!(
                "watch: {} ({} chunk(s)) in {:?}",
                note.relative_path,
                count,
                start.elapsed()
            );
        }
        IngestOutcome::Unchanged => {
            log::debug!("watch: {} unchanged", note.relative_path);
        }
    }
    Ok(())
}

/// Watch the vault and keep the index current until the watcher thread exits.
pub async fn run_watcher(
    index: ChunkIndex,
    embedder: Arc<dyn Embedder>,
    root: PathBuf,
    debounce_ms: u64,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let rx = Arc::new(Mutex::new(rx));

    let watch_root = root.clone();
    std::thread::spawn(move || {
        if let Err(e) = watcher::run_watcher_thread(&watch_root, debounce_ms, tx) {
            log::error!("watcher thread error: {e}");
        }
    });

    log::info!("watching {} (debounce {}ms)", root.display(), debounce_ms);

    loop {
        let rx_clone = rx.clone();
        let received = tokio::task::spawn_blocking(move || rx_clone.lock().unwrap().recv())
            .await
            .map_err(|e| MemexError::Config(format!("watcher task join: {e}")))?;

        let path = match received {
            Ok(p) => p,
            Err(_) => break,
        };

        if let Err(e) = handle_file_change(&index, embedder.as_ref(), &root, &path).await {
            log::error!("watch {}: {e}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    async fn open_index(dir: &TempDir) -> ChunkIndex {
        ChunkIndex::open(dir.path().join("index.db")).await.unwrap()
    }

    #[tokio::test]
    async fn test_change_indexes_markdown_note() {
        let db_dir = TempDir::new().unwrap();
        let vault = TempDir::new().unwrap();
        let index = open_index(&db_dir).await;

        let path = vault.path().join("note.md");
        fs::write(&path, "# A\nfresh text").unwrap();

        handle_file_change(&index, &FixedEmbedder, vault.path(), &path)
            .await
            .unwrap();
        assert!(index.has_document("note.md").await.unwrap());
    }

    #[tokio::test]
    async fn test_non_markdown_is_ignored() {
        let db_dir = TempDir::new().unwrap();
        let vault = TempDir::new().unwrap();
        let index = open_index(&db_dir).await;

        let path = vault.path().join("image.png");
        fs::write(&path, b"\x89PNG").unwrap();

        handle_file_change(&index, &FixedEmbedder, vault.path(), &path)
            .await
            .unwrap();
        assert_eq!(index.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleted_note_is_dropped_from_index() {
        let db_dir = TempDir::new().unwrap();
        let vault = TempDir::new().unwrap();
        let index = open_index(&db_dir).await;

        let path = vault.path().join("gone.md");
        fs::write(&path, "# G\nsoon deleted").unwrap();
        handle_file_change(&index, &FixedEmbedder, vault.path(), &path)
            .await
            .unwrap();
        assert!(index.has_document("gone.md").await.unwrap());

        fs::remove_file(&path).unwrap();
        handle_file_change(&index, &FixedEmbedder, vault.path(), &path)
            .await
            .unwrap();
        assert!(!index.has_document("gone.md").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_outside_vault_is_ignored() {
        let db_dir = TempDir::new().unwrap();
        let vault = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let index = open_index(&db_dir).await;

        let path = other.path().join("outside.md");
        fs::write(&path, "# O\nnot ours").unwrap();

        handle_file_change(&index, &FixedEmbedder, vault.path(), &path)
            .await
            .unwrap();
        assert_eq!(index.chunk_count().await.unwrap(), 0);
    }
}
