use crate::error::{MemexError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::task;

pub mod migrate;

/// Database connection wrapper
///
/// Opens a fresh connection per closure and runs it on a blocking task so
/// async callers never hold a connection across an await point.
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    fn open_connection(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path).map_err(MemexError::Database)?;

        // WAL for reader/writer concurrency, NORMAL sync for speed.
        // Readers on their own connections see a consistent snapshot while
        // an upsert transaction is in flight.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA temp_store = MEMORY; \
             PRAGMA cache_size = -65536;",
        )?;

        Ok(conn)
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Self::open_connection(&path)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| MemexError::Config(format!("database task join: {}", e)))?
    }
}
