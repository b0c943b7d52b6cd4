//! Error types for linefetch
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FetchError
pub type Result<T> = std::result::Result<T, FetchError>;

/// Unified error type for linefetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    /// Host unresolvable or connection refused
    #[error("Failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// Listening socket could not be bound
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Request line exceeds {limit} bytes")]
    RequestTooLong { limit: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// True for errors caused by the peer going away mid-exchange
    pub fn is_disconnect(&self) -> bool {
        match self {
            FetchError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
