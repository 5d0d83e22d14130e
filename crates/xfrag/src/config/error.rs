//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;

/// An error that stops a configuration from loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error when reading a configuration file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but failed validation.
    #[error("invalid configuration ({} problem(s)):\n  {}", problems.len(), join_problems(problems))]
    Invalid { problems: Vec<ConfigProblem> },
}

impl ConfigError {
    pub fn invalid(problems: Vec<ConfigProblem>) -> Self {
        ConfigError::Invalid { problems }
    }

    /// The validation problems carried by this error, if any.
    pub fn problems(&self) -> &[ConfigProblem] {
        match self {
            ConfigError::Invalid { problems } => problems,
            ConfigError::Io { .. } | ConfigError::Json(_) => &[],
        }
    }

    pub(crate) fn into_problems(self) -> Vec<ConfigProblem> {
        match self {
            ConfigError::Invalid { problems } => problems,
            other => vec![ConfigProblem::Field {
                context: "configuration".to_string(),
                message: other.to_string(),
            }],
        }
    }
}

fn join_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// A single validation problem. Loading collects all of them before failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigProblem {
    /// The top-level value is not a JSON object.
    #[error("configuration must be an object")]
    NotAnObject,

    /// The token declaration string is missing or not a string.
    #[error("'tokens' must be a declaration string such as \"name:default,other\"")]
    MissingTokens,

    #[error("token declarations are empty")]
    EmptyTokenDeclarations,

    #[error("token declaration {index} has an empty name")]
    EmptyTokenName { index: usize },

    #[error("token name '{name}' may only contain letters, digits, '_' and '-'")]
    InvalidTokenName { name: String },

    #[error("token '{name}' is declared more than once")]
    DuplicateToken { name: String },

    /// The fragment map is missing or not an object.
    #[error("'fragments' must be an object mapping keys to templates")]
    FragmentsNotObject,

    #[error("'fragments' is empty")]
    EmptyFragments,

    #[error("fragment '{key}' must be a string template")]
    FragmentNotString { key: String },

    /// A section that must be an object is something else.
    #[error("'{field}' must be an object")]
    SectionNotObject { field: String },

    /// A configured path failed to parse.
    #[error("{context}: {source}")]
    InvalidPath {
        context: String,
        #[source]
        source: ParseError,
    },

    /// A section refers to a token that is not declared.
    #[error("{context}: unknown token '{name}'{}", format_suggestions(suggestions))]
    UnknownToken {
        context: String,
        name: String,
        suggestions: Vec<String>,
    },

    /// An injection path template has no step whose predicate holds `{value}`.
    #[error("token '{token}': injection path template '{template}' needs exactly one predicate holding {{value}}")]
    TemplateWithoutPlaceholder { token: String, template: String },

    /// A group path template does not mention the group path token.
    #[error("group '{group}': path for '{key}' does not contain '{token}'")]
    GroupPathMissingToken {
        group: String,
        key: String,
        token: String,
    },

    /// A required string field is empty.
    #[error("{context}: '{field}' must not be empty")]
    EmptyField { context: String, field: String },

    /// A field has the wrong shape.
    #[error("{context}: {message}")]
    Field { context: String, message: String },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
