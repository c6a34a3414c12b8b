use crate::error::{MemexError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A markdown note discovered in the vault
#[derive(Debug, Clone)]
pub struct NoteFile {
    /// Path relative to the vault root, with forward slashes; used as the
    /// document identifier in the index
    pub relative_path: String,
    pub absolute_path: PathBuf,
    /// File stem, used as the note title
    pub title: String,
}

/// Discover all markdown notes under the vault root.
///
/// Only `.md` files are indexed; everything else in the vault (attachments,
/// images, configuration) is skipped.
pub fn discover_notes(root: &Path) -> Result<Vec<NoteFile>> {
    let mut notes = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        if extension != "md" {
            continue;
        }

        if let Some(note) = note_file(path, root)? {
            notes.push(note);
        }
    }

    log::info!("Discovered {} note(s) in {}", notes.len(), root.display());
    Ok(notes)
}

/// Build a NoteFile for one path under the vault root.
///
/// Returns None for paths outside the root.
pub fn note_file(path: &Path, root: &Path) -> Result<Option<NoteFile>> {
    let Ok(relative) = path.strip_prefix(root) else {
        return Ok(None);
    };

    let relative_path = relative.to_string_lossy().replace('\\', "/");
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            MemexError::InvalidInput(format!("note has no usable file name: {}", path.display()))
        })?
        .to_string();

    Ok(Some(NoteFile {
        relative_path,
        absolute_path: path.to_path_buf(),
        title,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_notes_markdown_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("Notes")).unwrap();
        fs::create_dir_all(root.join("Journal")).unwrap();
        fs::write(root.join("Notes/rust.md"), "# Rust").unwrap();
        fs::write(root.join("Journal/2024-01-15.md"), "- entry").unwrap();
        fs::write(root.join("attachment.png"), b"\x89PNG").unwrap();
        fs::write(root.join("config.json"), "{}").unwrap();

        let mut notes = discover_notes(root).unwrap();
        notes.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].relative_path, "Journal/2024-01-15.md");
        assert_eq!(notes[0].title, "2024-01-15");
        assert_eq!(notes[1].relative_path, "Notes/rust.md");
        assert_eq!(notes[1].title, "rust");
    }

    #[test]
    fn test_discover_notes_empty_vault() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_notes(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_note_file_outside_root() {
        let root = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let path = other.path().join("doc.md");
        fs::write(&path, "# Doc").unwrap();

        assert!(note_file(&path, root.path()).unwrap().is_none());
    }
}
