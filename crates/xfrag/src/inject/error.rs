//! Error types for injection-target resolution.

use thiserror::Error;

use crate::parser::ParseError;

/// A request the resolver cannot act on.
///
/// Missing or ambiguous targets are not errors; they are reported as a
/// [`Resolution`](super::Resolution).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    /// The fragment key has no injection path, grouped or plain.
    #[error("no injection path is configured for fragment '{key}'")]
    UnmappedKey { key: String },

    /// A group path did not form a valid path for the chosen instance.
    #[error("group '{group}': expanded path for '{key}' is invalid: {source}")]
    Expansion {
        group: String,
        key: String,
        #[source]
        source: ParseError,
    },

    /// An explicit group pick names no instance.
    #[error("group '{group}' has no instance {pick}")]
    NoSuchInstance { group: String, pick: String },

    /// An explicit target pick is past the end of the candidate list.
    #[error("pick {pick} is out of range: {candidates} candidate(s)")]
    PickOutOfRange { pick: usize, candidates: usize },
}
