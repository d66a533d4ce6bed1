use thiserror::Error;

use crate::http::FetchError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid repository record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to create directory {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Repository store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum PomError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid POM {location}: {reason}")]
    Parse { location: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
