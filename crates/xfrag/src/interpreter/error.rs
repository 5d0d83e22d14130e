//! Error and warning types for rendering.

use std::fmt::{Display, Formatter, Result as FmtResult};

use strsim::levenshtein;
use thiserror::Error;

/// A fatal error that stops a generation pass before any line is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The selection holds no non-blank line.
    #[error("selection is empty")]
    EmptySelection,
}

/// A recoverable problem found while rendering one line.
///
/// Warnings never stop rendering: the affected condition evaluates to false
/// and the remaining fragments and lines are still produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    /// A condition referenced tokens that are undefined or empty.
    InvalidTokens {
        line: usize,
        fragment: String,
        tokens: Vec<String>,
        suggestions: Vec<String>,
    },

    /// A `{$` block whose braces never balance; it was kept as literal text.
    UnterminatedBlock {
        line: usize,
        fragment: String,
        offset: usize,
    },
}

impl Display for RenderWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RenderWarning::InvalidTokens {
                line,
                fragment,
                tokens,
                suggestions,
            } => {
                write!(
                    f,
                    "line {line}, fragment '{fragment}': condition references undefined or empty token(s) {}; treated as false",
                    tokens.join(", ")
                )?;
                if !suggestions.is_empty() {
                    write!(f, " (did you mean: {}?)", suggestions.join(", "))?;
                }
                Ok(())
            }
            RenderWarning::UnterminatedBlock {
                line,
                fragment,
                offset,
            } => write!(
                f,
                "line {line}, fragment '{fragment}': unterminated '{{$' block at offset {offset}; kept as text"
            ),
        }
    }
}

/// Compute typo suggestions for `name` among `available` names.
///
/// - Maximum edit distance 1 for names of 3 characters or fewer, 2 otherwise
/// - Exact matches are excluded
/// - Limit to 3 suggestions, sorted by distance
pub fn compute_suggestions<'a>(
    name: &str,
    available: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let max_distance = if name.len() <= 3 { 1 } else { 2 };
    let mut suggestions: Vec<(usize, String)> = available
        .into_iter()
        .filter_map(|candidate| {
            let dist = levenshtein(name, candidate);
            if dist <= max_distance && dist > 0 {
                Some((dist, candidate.to_string()))
            } else {
                None
            }
        })
        .collect();

    suggestions.sort_by_key(|(dist, _)| *dist);
    suggestions.into_iter().take(3).map(|(_, s)| s).collect()
}
