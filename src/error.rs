// Error types for the scan session. Library code returns `ScanError` so
// callers can tell a skipped operation (no hash yet) apart from a network
// failure or a server that answered with something unexpected. The binary
// wraps these in `anyhow` at the top level.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    /// A hash-dependent operation was called before `upload` succeeded.
    /// No request is sent in this case.
    #[error("No hash found")]
    NoHash,

    /// The session already holds a hash; sessions are single-use per artifact.
    #[error("File already uploaded (hash {hash})")]
    AlreadyUploaded { hash: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection failures, timeouts and other transport-level problems.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Upload response has no `hash` field: {body}")]
    MissingHash { body: String },

    /// The body was not JSON, or a required field was missing.
    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the precondition failure that is reported and skipped
    /// rather than treated as a real error.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ScanError::NoHash | ScanError::AlreadyUploaded { .. })
    }
}
