use thiserror::Error;

use crate::http::FetchError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
