//! Error taxonomy for a single explorer search.
//!
//! Every variant is recoverable and local to one pipeline invocation. The
//! session converts them into a visible status message; malformed records
//! never produce an error because normalization always falls back to
//! defaults.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// The trimmed query is shorter than the configured minimum. No request
    /// is issued.
    #[error("Type at least {min} characters to start searching.")]
    QueryTooShort { min: usize },

    /// The search endpoint answered with a non-2xx status.
    #[error("Search failed with status {0}")]
    Status(u16),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Search failed: {0}")]
    Transport(String),

    /// The response body was not a JSON array of records.
    #[error("Search returned an unreadable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExplorerError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ExplorerError::Status(status.as_u16())
        } else {
            ExplorerError::Transport(err.to_string())
        }
    }
}
