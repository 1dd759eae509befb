//! Error types for filexfer
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using XferError
pub type Result<T> = std::result::Result<T, XferError>;

/// Unified error type for filexfer operations
#[derive(Debug, Error)]
pub enum XferError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Local filesystem failure (disk full, permission denied, ...)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors (always fatal to the connection)
    // -------------------------------------------------------------------------
    /// Socket-level failure while reading or writing a frame
    #[error("Connection error: {0}")]
    Connection(#[source] std::io::Error),

    /// Peer closed the stream in the middle of a frame or transfer
    #[error("Connection truncated: expected {expected} bytes, received {received}")]
    ConnectionTruncated { expected: u64, received: u64 },

    /// Peer closed the stream while a response was still owed
    #[error("Connection closed by peer")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Transfer Errors
    // -------------------------------------------------------------------------
    /// A chunk header announced more than the bytes still owed; its payload
    /// is left unread, so this is fatal too
    #[error("Chunk length mismatch: expected {expected} bytes in total, peer delivered {delivered}")]
    ChunkLengthMismatch { expected: u64, delivered: u64 },

    #[error("File too large: {size} bytes (max {max})")]
    SizeLimitExceeded { size: u64, max: u64 },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// Another session is transferring or deleting the same name
    #[error("file busy: {0}")]
    FileBusy(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The server answered with `status: error`
    #[error("Server error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl XferError {
    /// Framing-level failures that leave the stream unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            XferError::Connection(_)
                | XferError::ConnectionTruncated { .. }
                | XferError::ConnectionClosed
                | XferError::ChunkLengthMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for XferError {
    fn from(err: serde_json::Error) -> Self {
        XferError::Serialization(err.to_string())
    }
}
