//! Writing notes into the vault.
//!
//! Notes, artifacts, and journal entries land in fixed folders under the
//! vault root. Writers return the path of the file they touched so callers
//! can reindex it immediately.

use crate::error::{MemexError, Result};
use chrono::Local;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const NOTES_DIR: &str = "Notes";
const ARTIFACTS_DIR: &str = "Artifacts";
const JOURNAL_DIR: &str = "Journal";
const TOPICS_DIR: &str = "Topics";

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(MemexError::InvalidInput("note title is empty".into()));
    }
    if title.contains('/') || title.contains('\\') || title.contains("..") {
        return Err(MemexError::InvalidInput(format!(
            "note title must not contain path separators: {title:?}"
        )));
    }
    Ok(())
}

fn write_markdown(vault: &Path, folder: &str, title: &str, content: &str) -> Result<PathBuf> {
    validate_title(title)?;
    let dir = vault.join(folder);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{title}.md"));
    fs::write(&path, content)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Save a note as `Notes/<title>.md`, overwriting any existing note with
/// the same title
pub fn add_note(vault: &Path, title: &str, content: &str) -> Result<PathBuf> {
    write_markdown(vault, NOTES_DIR, title, content)
}

/// Save a standalone artifact (a document, a snippet, a generated report)
/// as `Artifacts/<title>.md`
pub fn add_artifact(vault: &Path, title: &str, content: &str) -> Result<PathBuf> {
    write_markdown(vault, ARTIFACTS_DIR, title, content)
}

/// Append an entry to today's journal note, `Journal/YYYY-MM-DD.md`.
///
/// Creates the file on first write of the day; later entries are appended
/// with a single blank-free newline between them.
pub fn add_journal_entry(vault: &Path, entry: &str) -> Result<PathBuf> {
    let title = Local::now().format("%Y-%m-%d").to_string();
    let dir = vault.join(JOURNAL_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{title}.md"));

    let mut content = String::new();
    if path.exists() {
        content = fs::read_to_string(&path)?.trim_end().to_string();
        content.push('\n');
    }
    content.push_str(entry.trim_end());
    content.push('\n');

    fs::write(&path, content)?;
    log::info!("journal entry appended to {}", path.display());
    Ok(path)
}

/// Read the topic taxonomy: every `Topics/*.md` note, keyed by file stem.
///
/// An absent Topics folder yields an empty map.
pub fn get_topics(vault: &Path) -> Result<BTreeMap<String, String>> {
    let dir = vault.join(TOPICS_DIR);
    let mut topics = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(topics);
    }

    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        topics.insert(stem.to_string(), fs::read_to_string(&path)?);
    }

    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_note_creates_file() {
        let vault = TempDir::new().unwrap();
        let path = add_note(vault.path(), "rust", "# Rust\ncontent").unwrap();

        assert_eq!(path, vault.path().join("Notes/rust.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Rust\ncontent");
    }

    #[test]
    fn test_add_note_overwrites() {
        let vault = TempDir::new().unwrap();
        add_note(vault.path(), "rust", "old").unwrap();
        let path = add_note(vault.path(), "rust", "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_add_artifact_folder() {
        let vault = TempDir::new().unwrap();
        let path = add_artifact(vault.path(), "report", "body").unwrap();
        assert_eq!(path, vault.path().join("Artifacts/report.md"));
    }

    #[test]
    fn test_title_validation() {
        let vault = TempDir::new().unwrap();
        assert!(add_note(vault.path(), "", "x").is_err());
        assert!(add_note(vault.path(), "   ", "x").is_err());
        assert!(add_note(vault.path(), "a/b", "x").is_err());
        assert!(add_note(vault.path(), "..", "x").is_err());
    }

    #[test]
    fn test_journal_appends_entries() {
        let vault = TempDir::new().unwrap();

        let path = add_journal_entry(vault.path(), "first entry\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first entry\n");

        let path = add_journal_entry(vault.path(), "second entry").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "first entry\nsecond entry\n"
        );

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".md"));
        assert_eq!(name.len(), "2024-01-15.md".len());
    }

    #[test]
    fn test_get_topics() {
        let vault = TempDir::new().unwrap();
        fs::create_dir_all(vault.path().join("Topics")).unwrap();
        fs::write(vault.path().join("Topics/ai.md"), "about ai").unwrap();
        fs::write(vault.path().join("Topics/notes.txt"), "not markdown").unwrap();

        let topics = get_topics(vault.path()).unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics.get("ai").map(String::as_str), Some("about ai"));
    }

    #[test]
    fn test_get_topics_missing_folder() {
        let vault = TempDir::new().unwrap();
        assert!(get_topics(vault.path()).unwrap().is_empty());
    }
}
