//! Error types for the analysis engine
//!
//! Library code returns `GraphResult`; the binary wraps these in `anyhow`
//! with additional context.

use std::path::PathBuf;

/// Errors raised while building or persisting a resource graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Analysis run cancelled")]
    Cancelled,

    #[error("Analysis run timed out after {0} seconds")]
    TimedOut(u64),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
