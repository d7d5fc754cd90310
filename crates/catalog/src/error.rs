use std::io;
use thiserror::Error;

/// Errors surfaced while listing embedding models.
///
/// None of these are fatal to resolution: callers log them and resolve with an
/// empty catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (connect failure, timeout, TLS).
    #[error("http request failed: {0}")]
    Http(String),
    /// The service answered with a non-success status.
    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body was not a model listing.
    #[error("invalid catalog response: {0}")]
    Decode(String),
    /// Configuration is inconsistent (e.g. an empty API URL).
    #[error("invalid catalog config: {0}")]
    InvalidConfig(String),
    /// Cache entry could not be written or removed.
    #[error("cache error: {0}")]
    Cache(String),
    /// Low-level IO failures while touching the cache directory.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}
