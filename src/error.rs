//! Error types for pnwal
//!
//! Provides a unified error type for all log operations.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type alias using WalError
pub type Result<T> = std::result::Result<T, WalError>;

/// The I/O operation that was in flight when a sink or source failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Open,
    Read,
    Append,
    Flush,
    Close,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IoOp::Open => "open",
            IoOp::Read => "read",
            IoOp::Append => "append",
            IoOp::Flush => "flush",
            IoOp::Close => "close",
        };
        f.write_str(name)
    }
}

/// Unified error type for pnwal operations
#[derive(Debug, Error)]
pub enum WalError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error during {op}: {source}")]
    Io {
        op: IoOp,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Header Errors (fatal to the whole decode)
    // -------------------------------------------------------------------------
    #[error("invalid magic number: found {found:02X?}")]
    InvalidMagic { found: Vec<u8> },

    #[error("unknown WAL format version {0}")]
    UnknownVersion(u16),

    /// Valid magic, but the source ended inside the version field.
    #[error("WAL header cut short after {0} bytes")]
    TruncatedHeader(usize),

    // -------------------------------------------------------------------------
    // Entry Errors (terminate the entry sequence)
    // -------------------------------------------------------------------------
    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The source ended in the middle of a frame.
    #[error("truncated {0}")]
    Truncated(&'static str),

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    #[error("timestamp outside encodable range: {0}")]
    EncodingRange(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Writer Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("WAL header has not been written")]
    NotInitialized,

    #[error("WAL header was already written")]
    HeaderAlreadyWritten,

    #[error("WAL writer is closed")]
    Closed,

    #[error("WAL writer disabled after a failed append")]
    WriterFailed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WalError {
    pub(crate) fn io(op: IoOp, source: io::Error) -> Self {
        WalError::Io { op, source }
    }

    /// True when the error only means the stream stopped mid-frame
    pub fn is_truncation(&self) -> bool {
        matches!(self, WalError::Truncated(_))
    }

    /// True for errors that reject the file as a whole rather than one entry
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            WalError::InvalidMagic { .. }
                | WalError::UnknownVersion(_)
                | WalError::TruncatedHeader(_)
        )
    }
}
