//! Error types for the query service.
//!
//! Everything fallible in the server returns [`ServerResult<T>`].

use prime_cache::PrimeCacheError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// All errors that can occur while configuring or running the server
#[derive(Error, Debug)]
pub enum ServerError {
    // Configuration errors
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    // Transport errors
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker pool is no longer accepting requests")]
    PoolClosed,

    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),

    // Query errors
    #[error(transparent)]
    Compute(#[from] PrimeCacheError),
}

impl ServerError {
    /// Wrap an I/O error with a description of what was being attempted
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
