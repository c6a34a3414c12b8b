pub mod cache;
pub mod chunking;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod ingest;
pub mod notes;
pub mod search;
pub mod watch;

pub use config::Config;
pub use error::{MemexError, Result};
