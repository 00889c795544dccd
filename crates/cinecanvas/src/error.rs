//! Error types for the cinecanvas crate
//!
//! Follows the same philosophy as the rest of the stack:
//! - Use thiserror for structured error handling (no anyhow)
//! - Provide detailed context for debugging
//! - Keep the error type `Clone + PartialEq` by carrying IO failures as
//!   message strings

use core::fmt;
use thiserror::Error;

/// Main error type for codec operations
///
/// Soft failures during parsing (malformed numeric attributes, unknown
/// `Effect` values, malformed override tags) are not represented here; each
/// has a documented default and stays local to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// CineCanvas XML could not be loaded or its structure is invalid
    #[error("CineCanvas parse error: {message}")]
    Parse { message: String },

    /// Serialization or IO failure while writing a CineCanvas document
    #[error("CineCanvas write error: {message}")]
    Write { message: String },

    /// IO error outside of the write path
    #[error("IO error: {0}")]
    Io(String),

    /// No registered format handles the given path
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl CodecError {
    /// Create a new parse error
    pub fn parse<T: fmt::Display>(message: T) -> Self {
        Self::Parse {
            message: message.to_string(),
        }
    }

    /// Create a new write error
    pub fn write<T: fmt::Display>(message: T) -> Self {
        Self::Write {
            message: message.to_string(),
        }
    }

    /// Create a new IO error
    pub fn io<T: fmt::Display>(message: T) -> Self {
        Self::Io(message.to_string())
    }

    /// Check if this is a parse-side error
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this is a write-side error
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

/// Result type alias for codec operations
pub type Result<T> = core::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            CodecError::parse("bad root").to_string(),
            "CineCanvas parse error: bad root"
        );
        assert_eq!(
            CodecError::write("disk full").to_string(),
            "CineCanvas write error: disk full"
        );
        assert_eq!(CodecError::io("denied").to_string(), "IO error: denied");
    }

    #[test]
    fn error_predicates() {
        assert!(CodecError::parse("x").is_parse());
        assert!(!CodecError::parse("x").is_write());
        assert!(CodecError::write("x").is_write());
        assert!(!CodecError::io("x").is_parse());
    }
}
