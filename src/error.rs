//! Error types and handling infrastructure for termscroll.
//!
//! Every store, search and export operation returns [`Result`] rather than
//! panicking. None of these errors are fatal: callers are expected to log or
//! display the condition and carry on.
//!
//! `thiserror` provides the library error type; the `termscroll` binary wraps
//! it in `anyhow` for context.

use thiserror::Error;

/// The main error type for termscroll operations.
#[derive(Error, Debug)]
pub enum TermscrollError {
    /// A required input was empty or otherwise unusable
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Copying line text or building export output failed to allocate
    #[error("Out of memory")]
    OutOfMemory,

    /// The line store was used after it was closed
    #[error("Scrollback buffer is not initialized")]
    NotInitialized,

    /// File system errors while writing an export
    #[error("I/O operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Export range is empty or inverted after normalization
    #[error("Invalid line range {start}..={end} for buffer of {len} lines")]
    InvalidRange { start: i64, end: i64, len: usize },

    /// A regex search pattern failed to compile
    #[error("Invalid search pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Match navigation was requested with nothing to navigate
    #[error("No search results")]
    NoResults,

    /// Configuration file or value errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Standard Result type for termscroll operations.
pub type Result<T> = std::result::Result<T, TermscrollError>;

impl TermscrollError {
    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an Io error from an io::Error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from the file system rather than from encoding
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

impl From<std::io::Error> for TermscrollError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found",
            std::io::ErrorKind::PermissionDenied => "Permission denied",
            _ => "IO operation failed",
        };
        Self::Io {
            message: message.to_string(),
            source: err,
        }
    }
}

impl From<std::collections::TryReserveError> for TermscrollError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}
