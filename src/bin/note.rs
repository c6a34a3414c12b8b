//! Save notes, artifacts, and journal entries into the vault.

use anyhow::Result;
use clap::{Parser, Subcommand};
use memex::embeddings::OpenAiEmbedder;
use memex::index::ChunkIndex;
use memex::ingest::note_file;
use memex::{notes, Config};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "note")]
#[command(about = "Save a note, artifact, or journal entry and index it")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Write the file without updating the search index
    #[arg(long, global = true)]
    no_index: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a note as Notes/<title>.md (overwrites an existing note)
    Save { title: String, content: String },
    /// Save an artifact as Artifacts/<title>.md
    Artifact { title: String, content: String },
    /// Append an entry to today's journal note
    Journal { entry: String },
    /// List the topic taxonomy (Topics/*.md)
    Topics,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let vault = config.vault_path();

    let written = match &args.command {
        Command::Save { title, content } => Some(notes::add_note(vault, title, content)?),
        Command::Artifact { title, content } => Some(notes::add_artifact(vault, title, content)?),
        Command::Journal { entry } => Some(notes::add_journal_entry(vault, entry)?),
        Command::Topics => {
            let topics = notes::get_topics(vault)?;
            if topics.is_empty() {
                println!("No topics found.");
            }
            for (title, content) in &topics {
                let first_line = content.lines().next().unwrap_or("");
                println!("{:<32} {}", title, first_line);
            }
            None
        }
    };

    if let Some(path) = written {
        println!("Saved {}", path.display());
        if !args.no_index {
            reindex(&config, vault, &path).await?;
        }
    }

    Ok(())
}

/// Push the freshly written note through the normal ingest pipeline
async fn reindex(config: &Config, vault: &Path, path: &Path) -> Result<()> {
    let index = ChunkIndex::open(config.db_path()).await?;
    let embedder = OpenAiEmbedder::from_config(&config.embeddings)?;

    let vault = vault.canonicalize()?;
    let path = path.canonicalize()?;
    if let Some(note) = note_file(&path, &vault)? {
        memex::ingest::ingest_note(&index, &embedder, &note, true).await?;
        log::info!("indexed {}", note.relative_path);
    }
    Ok(())
}
