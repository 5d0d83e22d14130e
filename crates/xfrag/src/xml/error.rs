//! Error types for document parsing.

use thiserror::Error;

/// An error that occurred while parsing an XML document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The reader rejected the input.
    #[error("malformed XML at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },

    /// An attribute could not be read or unescaped.
    #[error("bad attribute on <{tag}> at byte {offset}: {message}")]
    Attribute {
        tag: String,
        offset: usize,
        message: String,
    },

    /// A close tag appeared with no element open.
    #[error("unexpected close tag at byte {offset}")]
    UnexpectedClose { offset: usize },

    /// The input ended with elements still open.
    #[error("unclosed element(s): <{}>", tags.join(">, <"))]
    Unclosed { tags: Vec<String> },

    /// The input holds no element at all.
    #[error("document has no root element")]
    Empty,
}
