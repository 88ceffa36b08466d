//! Error types for Satchel.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Remote classifier failed, timed out, or returned unparseable data.
    /// Callers recover by running the deterministic fallback classifier.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// Remote store unreachable or rejected a write. The local cache stays
    /// authoritative; sync is retried on the next write cycle.
    #[error("Remote store error: {0}")]
    RemoteStore(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
