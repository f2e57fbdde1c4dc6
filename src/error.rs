//! Error types for memcsasl
//!
//! Data-operation misses (key not found, key exists, ...) are not errors;
//! they come back as `false`/`None` from the client. Everything here is
//! either a transport fault, a rejected argument, or a failed SASL step.

use thiserror::Error;

/// Result type alias using MemcError
pub type Result<T> = std::result::Result<T, MemcError>;

/// Unified error type for memcsasl operations
#[derive(Debug, Error)]
pub enum MemcError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed: expected {expected} bytes, received {received}")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not connected")]
    NotConnected,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed header: expected 24 bytes, got {0}")]
    MalformedHeader(usize),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Authentication Errors
    // -------------------------------------------------------------------------
    #[error("Authentication failed (status 0x{status:04x}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemcError {
    /// Whether the connection is unusable after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MemcError::Io(_)
                | MemcError::ConnectionClosed { .. }
                | MemcError::Timeout(_)
                | MemcError::MalformedHeader(_)
                | MemcError::Protocol(_)
        )
    }

    /// Map an I/O error, turning elapsed socket deadlines into `Timeout`.
    pub(crate) fn from_io(err: std::io::Error, op: &str) -> Self {
        match err.kind() {
            // Unix reports an elapsed SO_RCVTIMEO as WouldBlock, Windows as TimedOut
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                MemcError::Timeout(format!("{} deadline elapsed", op))
            }
            _ => MemcError::Io(err),
        }
    }
}
