//! Token declarations and per-line token resolution.

use tracing::debug;

use crate::config::{ConfigError, ConfigProblem, TokenRule};
use crate::parser::is_token_char;
use crate::types::{TokenDefinition, TokenMap, TokenValue};
use crate::xml::XmlQuery;

/// The ordered token definitions of a configuration.
///
/// # Example
///
/// ```
/// use xfrag::TokenSet;
///
/// let tokens = TokenSet::parse("appname,type:Text,label").unwrap();
/// let line = tokens.resolve_line("crm, , Due Date ");
///
/// assert_eq!(line.clean("appname"), Some("crm"));
/// assert_eq!(line.clean("type"), Some("Text"));
/// assert_eq!(line.clean("label"), Some("DueDate"));
/// assert_eq!(line.raw("label"), Some(" Due Date "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    definitions: Vec<TokenDefinition>,
}

impl TokenSet {
    /// Parse a declaration string of the form `name[:default],...`.
    ///
    /// Every problem in the string is reported at once. An empty string, an
    /// empty name, a name with characters outside `[A-Za-z0-9_-]`, or a
    /// repeated name makes the whole declaration invalid.
    pub fn parse(declarations: &str) -> Result<Self, ConfigError> {
        if declarations.trim().is_empty() {
            return Err(ConfigError::invalid(vec![
                ConfigProblem::EmptyTokenDeclarations,
            ]));
        }

        let mut problems = Vec::new();
        let mut definitions: Vec<TokenDefinition> = Vec::new();

        for (index, declaration) in declarations.split(',').enumerate() {
            let (name, default_value) = declaration.split_once(':').unwrap_or((declaration, ""));
            let name = name.trim();

            if name.is_empty() {
                problems.push(ConfigProblem::EmptyTokenName { index });
            } else if !name.chars().all(is_token_char) {
                problems.push(ConfigProblem::InvalidTokenName {
                    name: name.to_string(),
                });
            } else if definitions.iter().any(|def| def.name == name) {
                problems.push(ConfigProblem::DuplicateToken {
                    name: name.to_string(),
                });
            } else {
                definitions.push(TokenDefinition {
                    name: name.to_string(),
                    default_value: default_value.trim().to_string(),
                    index,
                });
            }
        }

        if problems.is_empty() {
            Ok(Self { definitions })
        } else {
            Err(ConfigError::invalid(problems))
        }
    }

    pub fn definitions(&self) -> &[TokenDefinition] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&TokenDefinition> {
        self.definitions.iter().find(|def| def.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Token names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve one comma-separated input line.
    ///
    /// Fields are assigned by position. A missing field, or one that is empty
    /// after sanitizing, takes the token's default for both forms.
    pub fn resolve_line(&self, line: &str) -> TokenMap {
        let fields: Vec<&str> = line.split(',').collect();
        self.definitions
            .iter()
            .map(|def| {
                let raw = fields.get(def.index).copied().unwrap_or("");
                let clean = sanitize(raw);
                let value = if clean.is_empty() {
                    TokenValue::uniform(def.default_value.clone())
                } else {
                    TokenValue::new(raw, clean)
                };
                (def.name.clone(), value)
            })
            .collect()
    }

    /// Resolve a line, then fill tokens that are still empty from the
    /// document using each token's read paths.
    pub fn resolve_line_with_document(
        &self,
        line: &str,
        rules: &[TokenRule],
        document: &dyn XmlQuery,
    ) -> TokenMap {
        let mut tokens = self.resolve_line(line);
        for rule in rules {
            if tokens.get(&rule.token).is_some_and(|value| !value.is_empty()) {
                continue;
            }
            let found = rule
                .read_paths
                .iter()
                .filter_map(|path| document.read_attribute(path))
                .map(|value| (sanitize(&value), value))
                .find(|(clean, _)| !clean.is_empty());
            if let Some((clean, raw)) = found {
                debug!(token = %rule.token, value = %clean, "token read from document");
                tokens.insert(rule.token.clone(), TokenValue::new(raw, clean));
            }
        }
        tokens
    }
}

/// Trim and strip everything outside `[A-Za-z0-9_-]`, whitespace included.
pub fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|&c| is_token_char(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_whitespace_and_punctuation() {
        assert_eq!(sanitize("  Due Date! "), "DueDate");
        assert_eq!(sanitize("order_line-2"), "order_line-2");
        assert_eq!(sanitize(" \t "), "");
    }

    #[test]
    fn default_after_colon_is_trimmed() {
        let tokens = TokenSet::parse(" entity : Order ,type").unwrap();
        assert_eq!(tokens.get("entity").unwrap().default_value, "Order");
        assert_eq!(tokens.get("type").unwrap().default_value, "");
        assert_eq!(tokens.get("type").unwrap().index, 1);
    }

    #[test]
    fn defaults_may_contain_colons() {
        let tokens = TokenSet::parse("url:http://host").unwrap();
        assert_eq!(tokens.get("url").unwrap().default_value, "http://host");
    }
}
