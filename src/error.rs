//! # Error Types
//!
//! Error taxonomy for scheduling and aggregation. Configuration problems fail
//! fast before any work; candidate-set failures abort a whole aggregation;
//! per-commit fetch failures degrade to recorded skips.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitPulseError>;

#[derive(Error, Debug)]
pub enum GitPulseError {
    /// Invalid constraints or configuration. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Listing the candidate commit set failed. Fatal to the aggregation call.
    #[error("failed to list commits: {0}")]
    CandidateSet(#[source] FetchError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<toml::de::Error> for GitPulseError {
    fn from(err: toml::de::Error) -> Self {
        GitPulseError::Parse(err.to_string())
    }
}

/// Failure modes of a single remote fetch call.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level or rate-limit failure worth retrying.
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The commit does not exist on the remote. Never retried.
    #[error("commit not found: {0}")]
    NotFound(String),

    /// Unexpected HTTP status outside the mapped cases.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Whether the aggregator should retry this failure with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transient(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::NotFound(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Connection problems, timeouts, and body decode failures all come
        // through here; none of them prove the commit is missing.
        FetchError::Transient(err.to_string())
    }
}
