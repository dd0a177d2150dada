//! Error types for dirscout
//!
//! This module defines the error hierarchy for a scan run:
//! - Configuration errors (fatal, surfaced before any request is issued)
//! - Dictionary loading errors (fatal, surfaced before any request is issued)
//! - Per-request transport errors (recovered, carried inside scan results)
//! - Worker thread and output errors
//!
//! Library code uses thiserror; the binary wraps these in anyhow with context.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a scan run
#[derive(Error, Debug)]
pub enum ScanError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dictionary could not be loaded
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Result output errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Target is not an absolute http(s) URL
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Invalid thread count
    #[error("Invalid thread count {count}: must be between 1 and {max}")]
    InvalidThreadCount { count: usize, max: usize },

    /// Zero or otherwise unusable timeout
    #[error("Invalid HTTP timeout {millis}ms: must be greater than zero")]
    InvalidTimeout { millis: u64 },

    /// Cookie not in `name=value` form
    #[error("cookie format is invalid: '{raw}'")]
    InvalidCookie { raw: String },

    /// Header not in `Name: value` form
    #[error("header is in invalid format: '{raw}'")]
    InvalidHeader { raw: String },

    /// SOCKS5 address not in `host:port` form
    #[error("Invalid SOCKS5 address '{address}': {reason}")]
    InvalidProxy { address: String, reason: String },

    /// Status code outside the HTTP range
    #[error("Invalid HTTP status {status}: must be between 100 and 599")]
    InvalidStatus { status: u16 },

    /// Dictionary argument is unusable
    #[error("Invalid dictionary '{source_name}': {reason}")]
    InvalidDictionary { source_name: String, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },

    /// HTTP client could not be built from the configuration
    #[error("Failed to build HTTP client: {reason}")]
    HttpClient { reason: String },
}

/// Dictionary loading errors
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// Local dictionary file could not be read
    #[error("Failed to read dictionary '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Remote dictionary could not be fetched
    #[error("Failed to fetch dictionary from '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Remote dictionary answered with a non-success status
    #[error("Failed to fetch dictionary from '{url}': server answered {status}")]
    BadStatus { url: String, status: u16 },

    /// Dictionary has no usable entries
    #[error("Dictionary '{source_name}' contains no entries")]
    Empty { source_name: String },
}

/// Per-request transport errors
///
/// These never abort a scan. They are reported through the result sink and
/// the failing task's subtree is simply not expanded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Request exceeded the configured timeout
    #[error("failed to perform request to '{url}': timed out: {reason}")]
    Timeout { url: String, reason: String },

    /// Connection (or proxy connection) could not be established
    #[error("failed to perform request to '{url}': {reason}")]
    Connect { url: String, reason: String },

    /// Any other transport/protocol failure
    #[error("failed to perform request to '{url}': {reason}")]
    Transport { url: String, reason: String },
}

impl RequestError {
    /// The URL the failed request targeted
    pub fn url(&self) -> &str {
        match self {
            RequestError::Timeout { url, .. }
            | RequestError::Connect { url, .. }
            | RequestError::Transport { url, .. } => url,
        }
    }

    /// Check if this error was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout { .. })
    }
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },
}

/// Result output errors
#[derive(Error, Debug)]
pub enum OutputError {
    /// Output file could not be created
    #[error("Failed to create output file '{path}': {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Output could not be flushed
    #[error("Failed to write output file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

/// Render an error together with its whole source chain
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
