//! Parse error types for structural paths.

use thiserror::Error;

/// An error that occurred while parsing a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A syntax error with the column where parsing stopped.
    #[error("syntax error in path '{input}' at column {column}: {message}")]
    Syntax {
        input: String,
        column: usize,
        message: String,
    },

    /// The path has no steps.
    #[error("path is empty")]
    EmptyPath,

    /// A token read path did not end in an attribute step.
    #[error("read path '{input}' must end with '/@attribute'")]
    MissingReadAttribute { input: String },
}
