//! Miette diagnostics for configuration and document errors.

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use xfrag::{ConfigProblem, DocumentError};

/// A syntax error pointing into a source file.
#[derive(Debug, Error, Diagnostic)]
#[error("syntax error: {message}")]
#[diagnostic(code(xfrag::syntax))]
pub struct SourceDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl SourceDiagnostic {
    /// A diagnostic at a byte offset of `content`.
    pub fn at_offset(
        path: &Path,
        content: &str,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        // Clamp offset to content length to avoid miette panic on out-of-bounds
        let offset = offset.min(content.len());
        SourceDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: (offset, 1).into(),
            message: message.into(),
            help: None,
        }
    }

    /// A diagnostic for invalid JSON, located by serde_json's line and column.
    pub fn from_json_error(path: &Path, content: &str, err: &serde_json::Error) -> Self {
        let offset = content
            .lines()
            .take(err.line().saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum::<usize>()
            + err.column().saturating_sub(1);
        Self::at_offset(path, content, offset, err.to_string())
    }

    /// A diagnostic for a document quick-xml could not read.
    pub fn from_document_error(path: &Path, content: &str, err: &DocumentError) -> Self {
        let offset = match err {
            DocumentError::Malformed { offset, .. }
            | DocumentError::Attribute { offset, .. }
            | DocumentError::UnexpectedClose { offset } => *offset,
            DocumentError::Unclosed { .. } | DocumentError::Empty => content.len(),
        };
        let mut diagnostic = Self::at_offset(path, content, offset, err.to_string());
        if matches!(err, DocumentError::Unclosed { .. }) {
            diagnostic.help = Some("every opened element needs a matching close tag".to_string());
        }
        diagnostic
    }
}

/// Every validation problem of a configuration file.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid configuration '{path}' ({} problem(s))", problems.len())]
#[diagnostic(code(xfrag::config), help("run `xfrag check` for the full report"))]
pub struct ConfigDiagnostic {
    path: String,

    #[related]
    problems: Vec<ProblemDiagnostic>,
}

impl ConfigDiagnostic {
    pub fn new(path: &Path, problems: &[ConfigProblem]) -> Self {
        ConfigDiagnostic {
            path: path.display().to_string(),
            problems: problems.iter().cloned().map(ProblemDiagnostic).collect(),
        }
    }
}

/// One configuration problem as a related diagnostic.
#[derive(Debug, Error, Diagnostic)]
#[error("{0}")]
#[diagnostic(severity(Error))]
pub struct ProblemDiagnostic(ConfigProblem);
