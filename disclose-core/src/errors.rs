//! errors.rs - Custom error types for the disclose-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Setup-time failures (`PatternCompileError`, `CaptureDefinitionError`) are
//! fatal for the pattern they concern; `CapacityExceeded` rejects a single
//! request. A scan that finds nothing is never an error.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

use crate::pattern::parser::ParseError;

/// This enum represents all possible error types in the `disclose-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DiscloseError {
    #[error("Failed to compile pattern '{0}': {1}")]
    PatternCompileError(String, String),

    #[error("Pattern '{0}': invalid capture definition: {1}")]
    CaptureDefinitionError(String, String),

    #[error("Input of {len} bytes exceeds the buffer capacity of {capacity} bytes")]
    CapacityExceeded { len: usize, capacity: usize },

    #[error("Buffer of {actual} bytes does not match the expected capacity of {expected} bytes")]
    CapacityMismatch { expected: usize, actual: usize },

    #[error("Pattern '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Pattern '{0}' is not registered")]
    UnknownPattern(String),

    #[error("Pattern '{0}' has no capture group named '{1}'")]
    UnknownCaptureGroup(String, String),

    #[error("Cannot pack {0} bytes per word; expected 1 to 16")]
    InvalidPackWidth(usize),

    #[error("Failed to serialize or deserialize a compiled pattern: {0}")]
    SerializationError(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

impl DiscloseError {
    /// Wraps a syntax error from the pattern parser for the named pattern.
    pub fn from_parse(pattern: &str, err: ParseError) -> Self {
        match err {
            ParseError::InvalidCaptureName(_) | ParseError::NestedCapture(_) => {
                DiscloseError::CaptureDefinitionError(pattern.to_string(), err.to_string())
            }
            other => DiscloseError::PatternCompileError(pattern.to_string(), other.to_string()),
        }
    }

    /// True for errors raised while compiling a pattern, as opposed to errors
    /// raised while scanning a request.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            DiscloseError::PatternCompileError(..)
                | DiscloseError::CaptureDefinitionError(..)
                | DiscloseError::PatternLengthExceeded(..)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_both_sizes() {
        let err = DiscloseError::CapacityExceeded { len: 12, capacity: 10 };
        assert_eq!(
            err.to_string(),
            "Input of 12 bytes exceeds the buffer capacity of 10 bytes"
        );
        assert!(!err.is_setup_error());

        let err = DiscloseError::CapacityMismatch { expected: 10, actual: 4 };
        assert_eq!(
            err.to_string(),
            "Buffer of 4 bytes does not match the expected capacity of 10 bytes"
        );
    }

    #[test]
    fn test_parse_errors_are_classified() {
        let err = DiscloseError::from_parse("p", ParseError::NestedCapture("inner".into()));
        assert!(matches!(err, DiscloseError::CaptureDefinitionError(..)));
        let err = DiscloseError::from_parse("p", ParseError::UnexpectedEnd);
        assert!(matches!(err, DiscloseError::PatternCompileError(..)));
        assert!(err.is_setup_error());
    }
}
