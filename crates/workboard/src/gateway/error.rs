//! Record store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the record store and object bucket.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The hosted store answered with a non-success status.
    #[error("{operation} failed ({status}): {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The hosted store answered with something we cannot use.
    #[error("Unexpected response for {operation}: {reason}")]
    UnexpectedResponse {
        operation: &'static str,
        reason: String,
    },

    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Malformed JSON column or payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error when creating the local store directory.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// The local store lock was poisoned.
    #[error("Store lock poisoned")]
    LockPoisoned,
}
