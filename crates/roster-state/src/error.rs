//! Error types for roster-state

use thiserror::Error;

/// Errors that can occur while talking to the record authority
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// The request never produced a response (connection refused, DNS, reset)
    #[error("Authority unreachable: {0}")]
    Transport(String),

    /// The authority answered with a non-2xx status
    #[error("Authority rejected request with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body could not be decoded into records
    #[error("Malformed response body: {0}")]
    Decode(String),

    /// The addressed record does not exist (in-memory authority only;
    /// the HTTP authority reports this as a 404 `Status`)
    #[error("Record not found: {0}")]
    NotFound(i64),
}

impl AuthorityError {
    /// Status code if the authority answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthorityError::Status { status, .. } => Some(*status),
            AuthorityError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthorityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthorityError::Decode(err.to_string())
        } else {
            AuthorityError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthorityError {
    fn from(err: serde_json::Error) -> Self {
        AuthorityError::Decode(err.to_string())
    }
}
