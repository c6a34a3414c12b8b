pub mod vector;

use crate::chunking::Section;
use crate::db::{migrate, Db};
use crate::error::{MemexError, Result};
use chrono::Utc;
use rusqlite::params;
use std::path::Path;
use vector::{blob_to_embedding, cosine_similarity, embedding_to_blob};

/// A search hit: the stored section plus scoring metadata
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub section: Section,
    pub title: String,
    pub indexed_at: String,
    /// Cosine similarity to the query vector, in [-1, 1]
    pub similarity: f32,
}

/// Per-document summary used by stats reporting
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub path: String,
    pub title: String,
    pub chunk_count: usize,
    pub indexed_at: String,
}

/// Persistent chunk + embedding store backed by SQLite.
///
/// The index is an explicitly constructed handle: open it on startup (which
/// runs migrations), pass it where needed, drop it on shutdown. Each upsert
/// replaces a document's whole chunk set inside one transaction, so a
/// concurrent search observes either the old set or the new set for a path,
/// never a mix.
pub struct ChunkIndex {
    db: Db,
}

impl ChunkIndex {
    /// Open (creating if necessary) the index at the given database path
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db = Db::new(db_path);
        db.with_connection(|conn| migrate::run_migrations(conn))
            .await?;
        Ok(Self { db })
    }

    /// Replace all chunks stored for `path` with the given sections and
    /// embeddings.
    ///
    /// `sections` and `embeddings` must be parallel (same length, same
    /// order). An empty section list is a deliberate deletion: prior rows
    /// for the path are cleared and nothing is inserted. Returns the number
    /// of chunks stored.
    pub async fn upsert(
        &self,
        path: &str,
        title: &str,
        file_hash: Option<&str>,
        sections: Vec<Section>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize> {
        if sections.len() != embeddings.len() {
            return Err(MemexError::InvalidInput(format!(
                "{} sections but {} embeddings for {}",
                sections.len(),
                embeddings.len(),
                path
            )));
        }

        let path = path.to_string();
        let title = title.to_string();
        let file_hash = file_hash.map(String::from);
        let indexed_at = Utc::now().to_rfc3339();

        let count = self
            .db
            .with_connection(move |conn| {
                // Delete-then-insert in one transaction: readers never see a
                // mix of old and new rows for this path.
                let tx = conn.transaction()?;

                tx.execute("DELETE FROM chunks WHERE path = ?1", params![path])?;

                if sections.is_empty() {
                    tx.execute("DELETE FROM documents WHERE path = ?1", params![path])?;
                    tx.commit()?;
                    return Ok(0);
                }

                tx.execute(
                    r#"
                    INSERT INTO documents (path, title, file_hash, indexed_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(path) DO UPDATE SET
                        title = excluded.title,
                        file_hash = excluded.file_hash,
                        indexed_at = excluded.indexed_at
                    "#,
                    params![path, title, file_hash, indexed_at],
                )?;

                let inserted = {
                    let mut stmt = tx.prepare(
                        r#"
                        INSERT INTO chunks (
                            path, chunk_index, title, indexed_at,
                            level, header, content, parent_index, child_indices, embedding
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                        "#,
                    )?;

                    for (section, embedding) in sections.iter().zip(embeddings.iter()) {
                        let child_indices =
                            serde_json::to_string(&section.child_indices).map_err(|e| {
                                MemexError::InvalidInput(format!(
                                    "child_indices serialization: {}",
                                    e
                                ))
                            })?;

                        stmt.execute(params![
                            path,
                            section.index as i64,
                            title,
                            indexed_at,
                            section.level as i64,
                            section.header,
                            section.content,
                            section.parent_index.map(|i| i as i64),
                            child_indices,
                            embedding_to_blob(embedding),
                        ])?;
                    }

                    sections.len()
                };

                tx.commit()?;
                Ok(inserted)
            })
            .await?;

        log::debug!("upserted {} chunk(s)", count);
        Ok(count)
    }

    /// Remove a document and all its chunks. Returns the number of chunk
    /// rows removed. Removing an unknown path is a no-op.
    pub async fn delete_document(&self, path: &str) -> Result<usize> {
        let path = path.to_string();
        self.db
            .with_connection(move |conn| {
                let tx = conn.transaction()?;
                let removed = tx.execute("DELETE FROM chunks WHERE path = ?1", params![path])?;
                tx.execute("DELETE FROM documents WHERE path = ?1", params![path])?;
                tx.commit()?;
                Ok(removed)
            })
            .await
    }

    /// Nearest-neighbor search: the `k` stored chunks most similar to the
    /// query embedding under cosine similarity.
    ///
    /// Rows are scanned in insertion order and sorted with a stable sort, so
    /// equal scores break ties deterministically. An empty index (or an
    /// empty query vector) yields an empty result list, not an error.
    pub async fn search(&self, query: &[f32], k: usize, min_score: f32) -> Result<Vec<ScoredChunk>> {
        if query.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = query.to_vec();
        let rows = self
            .db
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT path, chunk_index, title, indexed_at,
                           level, header, content, parent_index, child_indices, embedding
                    FROM chunks
                    WHERE embedding IS NOT NULL
                    ORDER BY rowid
                    "#,
                )?;

                let mut rows = stmt.query([])?;
                let mut scored: Vec<(f32, ScoredChunk)> = Vec::new();

                while let Some(row) = rows.next()? {
                    let blob: Vec<u8> = row.get(9)?;
                    let Some(embedding) = blob_to_embedding(&blob) else {
                        continue;
                    };
                    if embedding.len() != query.len() {
                        continue;
                    }

                    let similarity = cosine_similarity(&query, &embedding);
                    scored.push((similarity, scored_chunk_from_row(row, similarity)?));
                }

                Ok(scored)
            })
            .await?;

        let mut scored = rows;
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .filter(|(score, _)| *score >= min_score)
            .take(k)
            .map(|(_, chunk)| chunk)
            .collect())
    }

    /// Check whether any chunks are stored for the given path
    pub async fn has_document(&self, path: &str) -> Result<bool> {
        let path = path.to_string();
        self.db
            .with_connection(move |conn| {
                let mut stmt = conn.prepare("SELECT 1 FROM documents WHERE path = ?1 LIMIT 1")?;
                Ok(stmt.exists(params![path])?)
            })
            .await
    }

    /// Content hash recorded at last index time, if any
    pub async fn stored_hash(&self, path: &str) -> Result<Option<String>> {
        let path = path.to_string();
        self.db
            .with_connection(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT file_hash FROM documents WHERE path = ?1")?;
                let mut rows = stmt.query(params![path])?;
                if let Some(row) = rows.next()? {
                    return Ok(row.get::<_, Option<String>>(0)?);
                }
                Ok(None)
            })
            .await
    }

    /// Per-document chunk counts, ordered by path
    pub async fn document_summaries(&self) -> Result<Vec<DocumentSummary>> {
        self.db
            .with_connection(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT d.path, d.title, d.indexed_at, COUNT(c.chunk_index)
                    FROM documents d
                    LEFT JOIN chunks c ON c.path = d.path
                    GROUP BY d.path
                    ORDER BY d.path
                    "#,
                )?;

                let summaries = stmt
                    .query_map([], |row| {
                        Ok(DocumentSummary {
                            path: row.get(0)?,
                            title: row.get(1)?,
                            indexed_at: row.get(2)?,
                            chunk_count: row.get::<_, i64>(3)? as usize,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

                Ok(summaries)
            })
            .await
    }

    /// Total number of stored chunks
    pub async fn chunk_count(&self) -> Result<usize> {
        self.db
            .with_connection(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;
                Ok(count as usize)
            })
            .await
    }
}

fn scored_chunk_from_row(row: &rusqlite::Row<'_>, similarity: f32) -> Result<ScoredChunk> {
    let child_indices_json: String = row.get(8)?;
    let child_indices: Vec<usize> = serde_json::from_str(&child_indices_json)
        .map_err(|e| MemexError::Search(format!("corrupt child_indices column: {}", e)))?;

    Ok(ScoredChunk {
        section: Section {
            path: row.get(0)?,
            index: row.get::<_, i64>(1)? as usize,
            level: row.get::<_, i64>(4)? as usize,
            header: row.get(5)?,
            content: row.get(6)?,
            parent_index: row.get::<_, Option<i64>>(7)?.map(|i| i as usize),
            child_indices,
        },
        title: row.get(2)?,
        indexed_at: row.get(3)?,
        similarity,
    })
}
