//! Error types for gmlgeom
//!
//! This module defines all error types used throughout the engine.
//! Structural errors are fatal for a document parse; coordinate errors are
//! recoverable at geometry scope and are recorded on the affected geometry
//! rather than surfaced through `Result`.

use std::fmt;
use thiserror::Error;

/// Result type alias using the gmlgeom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gmlgeom operations
#[derive(Error, Debug)]
pub enum Error {
    /// Structural mismatch in the document (stack corruption, truncation)
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Malformed coordinate text
    #[error("coordinate error: {0}")]
    Coordinate(#[from] CoordinateError),

    /// Schema reading error
    #[error("schema error: {0}")]
    Schema(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Structural mismatch with context
///
/// Raised when an element close does not match the expected closing signal,
/// or when the document ends with open elements. Continuing past either
/// would attach geometry to the wrong feature, so these abort the parse.
#[derive(Debug, Clone)]
pub struct StructuralError {
    /// Error message
    pub message: String,
    /// Qualified name the handler expected to close
    pub expected: Option<String>,
    /// Qualified name actually found
    pub found: Option<String>,
    /// Byte position in the input, if known
    pub position: Option<u64>,
}

impl StructuralError {
    /// Create a new structural error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            found: None,
            position: None,
        }
    }

    /// Set the expected qualified name
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the qualified name actually found
    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    /// Set the byte position
    pub fn with_position(mut self, position: u64) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected '{}'", expected)?;
            if let Some(ref found) = self.found {
                write!(f, ", found '{}'", found)?;
            }
            write!(f, ")")?;
        } else if let Some(ref found) = self.found {
            write!(f, " (found '{}')", found)?;
        }

        if let Some(position) = self.position {
            write!(f, " at byte {}", position)?;
        }

        Ok(())
    }
}

impl std::error::Error for StructuralError {}

/// Malformed coordinate text
///
/// Tuple arity does not match the declared dimension, or a token is not a
/// finite number. Never padded or silently dropped.
#[derive(Debug, Clone)]
pub struct CoordinateError {
    /// Error message
    pub message: String,
    /// The offending token or text fragment
    pub text: Option<String>,
}

impl CoordinateError {
    /// Create a new coordinate error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            text: None,
        }
    }

    /// Set the offending text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref text) = self.text {
            write!(f, ": '{}'", text)?;
        }
        Ok(())
    }
}

impl std::error::Error for CoordinateError {}
