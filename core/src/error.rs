//! Error types for the persisted log store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("corrupt payload under '{key}': {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed backup document: {0}")]
    MalformedBackup(#[source] serde_json::Error),

    #[error("invalid goal '{0}'. Use protein, steps, water, or workout")]
    InvalidGoal(String),
}

impl StoreError {
    /// True when the stored text was present but could not be decoded.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}
