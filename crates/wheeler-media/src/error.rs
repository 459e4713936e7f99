//! Blob store error types.

use std::path::PathBuf;

/// Errors from blob store backends.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Local filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// HTTP transport error talking to a remote store.
    #[error("HTTP error during {operation}: {source}")]
    Http {
        operation: &'static str,
        source: reqwest::Error,
    },
    /// Remote store returned a non-2xx status.
    #[error("{operation} returned {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },
    /// Remote store response could not be decoded.
    #[error("failed to decode {operation} response: {source}")]
    Deserialization {
        operation: &'static str,
        source: reqwest::Error,
    },
    /// Backend misconfiguration.
    #[error("configuration error: {0}")]
    Config(String),
}
