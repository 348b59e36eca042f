//! Error types for euro5-digest
//!
//! `FeedError` is the single failure type of a feed fetch. Each variant renders
//! a message fit for the reader; callers that need the cause match on it.
//! Row-level validation failures are not errors (see `schema`).

use crate::feeds::FeedKind;
use thiserror::Error;

/// Feed fetch errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Deadline elapsed before the feed was received
    #[error("Timed out after {}s fetching CSV.", seconds(.timeout_ms))]
    Timeout { timeout_ms: u64 },

    /// Transport failure, no response received
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status
    #[error("Failed to fetch CSV. HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Structural CSV problems; the whole batch is discarded
    #[error("CSV parse errors: {0}")]
    Parse(String),

    /// Rows were present but none passed the schema
    #[error("CSV validation failed: 0/{total} valid rows. Check header names and row values.")]
    AllRowsInvalid { total: usize },
}

impl FeedError {
    pub(crate) fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            FeedError::Timeout { timeout_ms }
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

fn seconds(timeout_ms: &u64) -> f64 {
    *timeout_ms as f64 / 1000.0
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Joint digest load errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// A required feed failed
    #[error("{feed} feed failed: {source}")]
    Feed {
        feed: FeedKind,
        #[source]
        source: FeedError,
    },

    /// Failure outside any single feed (e.g. HTTP client construction)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoadError {
    /// Message shown to the reader; `None` means the cause is unknown and
    /// the caller substitutes its generic text
    pub fn user_message(&self) -> Option<String> {
        match self {
            LoadError::Feed { source, .. } => Some(source.to_string()),
            LoadError::Internal(_) => None,
        }
    }
}
