//! Error types for Chatpad
//!
//! This module defines the error types used by the fallible plumbing of the
//! application (configuration, storage, HTTP client setup), using `thiserror`
//! for ergonomic error handling. Chat-facing failures never surface as errors;
//! they are converted to user-facing strings by the inference client.

use thiserror::Error;

/// Main error type for Chatpad operations
#[derive(Error, Debug)]
pub enum ChatpadError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inference client errors (HTTP client construction, etc.)
    #[error("Inference error: {0}")]
    Inference(String),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// No session matches the given id or id prefix
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// An id prefix matches more than one session
    #[error("Ambiguous session id '{prefix}': matches {count} sessions")]
    AmbiguousSessionId {
        /// The prefix that was looked up
        prefix: String,
        /// Number of sessions whose id starts with the prefix
        count: usize,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Chatpad operations
///
/// Uses `anyhow::Error` as the error type, allowing for rich error context
/// and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
