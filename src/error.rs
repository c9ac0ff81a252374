//! Error types for the ADDE client
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using AddeError
pub type Result<T> = std::result::Result<T, AddeError>;

/// Unified error type for ADDE client operations
#[derive(Debug, Error)]
pub enum AddeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// Host unreachable, connection refused, or connect deadline exceeded.
    #[error("Connection to {host}:{port} failed: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Timeout Errors
    // -------------------------------------------------------------------------
    /// Response deadline exceeded during an exchange. Carries the service
    /// tag and host for diagnostics; the partial buffer is discarded.
    #[error("{service} request to {host} timed out")]
    Timeout { service: String, host: String },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Server-signaled failure or a malformed/undecodable response.
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    /// Caller-supplied parameter failed a precondition. Raised before any
    /// network exchange takes place.
    #[error("Validation error: {0}")]
    Validation(String),
}
