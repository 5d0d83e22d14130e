//! Loading configuration files, documents, and selections.

use std::fs::read_to_string;
use std::io::{self, stdin};
use std::path::Path;

use miette::{miette, Result};
use xfrag::{ConfigError, GeneratorConfig, GroupPick, XmlDocument};

use crate::output::{ConfigDiagnostic, SourceDiagnostic};

/// Read a file, naming it in the error.
pub fn read_file(path: &Path, what: &str) -> Result<String> {
    read_to_string(path).map_err(|e| miette!("Cannot read {} {}: {}", what, path.display(), e))
}

/// Read all of standard input.
pub fn read_stdin() -> Result<String> {
    io::read_to_string(stdin()).map_err(|e| miette!("Cannot read standard input: {}", e))
}

/// Load and validate a configuration, turning failures into diagnostics.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let content = read_file(path, "configuration")?;
    parse_config(path, &content)
}

/// Validate configuration text read from `path`.
pub fn parse_config(path: &Path, content: &str) -> Result<GeneratorConfig> {
    GeneratorConfig::from_json_str(content).map_err(|err| match err {
        ConfigError::Json(json) => SourceDiagnostic::from_json_error(path, content, &json).into(),
        ConfigError::Invalid { problems } => ConfigDiagnostic::new(path, &problems).into(),
        ConfigError::Io { .. } => miette!("{}", err),
    })
}

/// Load and parse an XML document.
pub fn load_document(path: &Path) -> Result<XmlDocument> {
    let content = read_file(path, "document")?;
    XmlDocument::parse(content.clone())
        .map_err(|err| SourceDiagnostic::from_document_error(path, &content, &err).into())
}

/// Parse a 1-based `--pick` number into an index.
pub fn parse_pick(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("invalid pick '{s}': expected a number from 1")),
        Ok(n) => Ok(n - 1),
    }
}

/// Parse a `--group-pick`: a 1-based number or a display attribute value.
pub fn parse_group_pick(s: &str) -> Result<GroupPick, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("group picks are numbered from 1".to_string()),
        Ok(n) => Ok(GroupPick::Index(n - 1)),
        Err(_) => Ok(GroupPick::Display(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn picks_are_one_based() {
        assert_eq!(parse_pick("1"), Ok(0));
        assert!(parse_pick("0").is_err());
        assert!(parse_pick("x").is_err());
        assert_eq!(parse_group_pick("2"), Ok(GroupPick::Index(1)));
        assert_eq!(
            parse_group_pick("Main"),
            Ok(GroupPick::Display("Main".to_string()))
        );
    }

    #[test]
    fn loads_configuration_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tokens": "label", "fragments": {{"Field": "<F N=\"{{$label}}\"/>"}}}}"#
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fragments.len(), 1);
    }

    #[test]
    fn invalid_configuration_is_a_diagnostic() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"tokens": "", "fragments": {{}}}}"#).unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("2 problem(s)"));
    }
}
