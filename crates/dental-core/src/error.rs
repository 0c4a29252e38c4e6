//! Error types for dental

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The storage substrate rejected a write or removal.
    #[error("Failed to save '{key}': {reason}")]
    Persistence { key: String, reason: String },

    /// Input that is not valid JSON, or a value that does not fit the key it
    /// was assigned to.
    #[error("Invalid data format: {0}")]
    Format(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn persistence(key: &str, reason: impl std::fmt::Display) -> Self {
        Error::Persistence {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
