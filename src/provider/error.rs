use thiserror::Error;

use crate::repository::error::{PomError, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read addons file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid addon catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bundled resource {0} is missing")]
    MissingResource(String),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Pom(#[from] PomError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
