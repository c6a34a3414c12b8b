use thiserror::Error;

/// Main error type for memex
#[derive(Error, Debug)]
pub enum MemexError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding provider errors (retryable from the caller's point of view)
    #[error("Embedding provider error: {0}")]
    Embedding(String),

    /// Search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using MemexError
pub type Result<T> = std::result::Result<T, MemexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MemexError::Config("missing vault".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing vault"));
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: MemexError = rusqlite_err.into();
        assert!(matches!(err, MemexError::Database(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MemexError = io_err.into();
        assert!(matches!(err, MemexError::Io(_)));
    }
}
