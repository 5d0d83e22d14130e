//! Configuration loading and validation.
//!
//! Configuration arrives as loosely typed JSON. It is validated once, up
//! front, into the typed structures used by rendering and resolution; every
//! problem found is reported together in a single [`ConfigError::Invalid`].

mod error;
mod raw;
mod types;

pub use error::{ConfigError, ConfigProblem};
pub use types::{
    ANY_ATTRIBUTE, AttributeMatchOrder, FragmentTemplate, HierarchicalGroupConfig,
    InjectionPathTemplate, TokenRule, VALUE_PLACEHOLDER,
};

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::interpreter::{TokenSet, compute_suggestions};
use crate::parser::{StructuralPath, parse_fragment_key, parse_path, parse_read_path};
use raw::{RawGroup, RawTokenDefinition};

/// A validated generator configuration.
///
/// # Example
///
/// ```
/// use xfrag::GeneratorConfig;
///
/// let config = GeneratorConfig::from_json_str(r#"{
///     "tokens": "entity,label",
///     "fragments": { "Field": "<Field Name=\"{$label}\"/>" },
///     "injectionPaths": { "Field": "EntityDef/Attributes" }
/// }"#).unwrap();
///
/// assert_eq!(config.tokens.len(), 2);
/// assert_eq!(config.fragments[0].source_key, "Field");
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub tokens: TokenSet,
    /// Fragment templates in configuration order.
    pub fragments: Vec<FragmentTemplate>,
    /// Fragment key to injection path, for keys outside any group.
    pub injection_paths: Vec<(String, StructuralPath)>,
    /// Token rules in configuration order.
    pub token_rules: Vec<TokenRule>,
    pub groups: Vec<HierarchicalGroupConfig>,
}

impl GeneratorConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration string.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let Some(root) = value.as_object() else {
            return Err(ConfigError::invalid(vec![ConfigProblem::NotAnObject]));
        };

        let mut problems = Vec::new();

        let tokens = match root.get("tokens").and_then(Value::as_str) {
            Some(declarations) => match TokenSet::parse(declarations) {
                Ok(tokens) => Some(tokens),
                Err(err) => {
                    problems.extend(err.into_problems());
                    None
                }
            },
            None => {
                problems.push(ConfigProblem::MissingTokens);
                None
            }
        };

        let fragments = load_fragments(root.get("fragments"), &mut problems);
        let injection_paths = load_injection_paths(root.get("injectionPaths"), &mut problems);
        let token_rules = load_token_rules(
            root.get("tokenDefinitions"),
            tokens.as_ref(),
            &mut problems,
        );
        let groups = load_groups(root.get("hierarchicalGroups"), &mut problems);

        match tokens {
            Some(tokens) if problems.is_empty() => {
                debug!(
                    tokens = tokens.len(),
                    fragments = fragments.len(),
                    rules = token_rules.len(),
                    groups = groups.len(),
                    "configuration loaded"
                );
                Ok(Self {
                    tokens,
                    fragments,
                    injection_paths,
                    token_rules,
                    groups,
                })
            }
            _ => Err(ConfigError::invalid(problems)),
        }
    }

    /// The rule configured for `token`, if any.
    pub fn rule(&self, token: &str) -> Option<&TokenRule> {
        self.token_rules.iter().find(|rule| rule.token == token)
    }

    /// The plain injection path for fragment `key`, if configured.
    pub fn injection_path(&self, key: &str) -> Option<&StructuralPath> {
        self.injection_paths
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, path)| path)
    }

    /// The group scoping fragment `key`, with its path template.
    pub fn group_for(&self, key: &str) -> Option<(&HierarchicalGroupConfig, &str)> {
        self.groups
            .iter()
            .find_map(|group| group.path_template(key).map(|template| (group, template)))
    }

    /// Every fragment key that has an injection path, grouped or not.
    pub fn injection_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.injection_paths.iter().map(|(k, _)| k.as_str()).collect();
        for group in &self.groups {
            for (key, _) in &group.paths {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

/// Optional object section: `None` if absent, a problem if not an object.
fn section<'v>(
    value: Option<&'v Value>,
    field: &str,
    problems: &mut Vec<ConfigProblem>,
) -> Option<&'v Map<String, Value>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            problems.push(ConfigProblem::SectionNotObject {
                field: field.to_string(),
            });
            None
        }
    }
}

fn load_path(
    text: &str,
    context: String,
    problems: &mut Vec<ConfigProblem>,
) -> Option<StructuralPath> {
    match parse_path(text) {
        Ok(path) => Some(path),
        Err(source) => {
            problems.push(ConfigProblem::InvalidPath { context, source });
            None
        }
    }
}

fn load_fragments(
    value: Option<&Value>,
    problems: &mut Vec<ConfigProblem>,
) -> Vec<FragmentTemplate> {
    let Some(map) = value.and_then(Value::as_object) else {
        problems.push(ConfigProblem::FragmentsNotObject);
        return Vec::new();
    };
    if map.is_empty() {
        problems.push(ConfigProblem::EmptyFragments);
        return Vec::new();
    }

    let mut fragments = Vec::with_capacity(map.len());
    for (key, body) in map {
        match body.as_str() {
            Some(body) => fragments.push(FragmentTemplate {
                source_key: key.clone(),
                key: parse_fragment_key(key),
                body: body.to_string(),
            }),
            None => problems.push(ConfigProblem::FragmentNotString { key: key.clone() }),
        }
    }
    fragments
}

fn load_injection_paths(
    value: Option<&Value>,
    problems: &mut Vec<ConfigProblem>,
) -> Vec<(String, StructuralPath)> {
    let Some(map) = section(value, "injectionPaths", problems) else {
        return Vec::new();
    };

    let mut paths = Vec::with_capacity(map.len());
    for (key, path) in map {
        let context = format!("injection path for '{key}'");
        match path.as_str() {
            Some(text) => {
                if let Some(path) = load_path(text, context, problems) {
                    paths.push((key.clone(), path));
                }
            }
            None => problems.push(ConfigProblem::Field {
                context,
                message: "must be a string".to_string(),
            }),
        }
    }
    paths
}

fn load_token_rules(
    value: Option<&Value>,
    tokens: Option<&TokenSet>,
    problems: &mut Vec<ConfigProblem>,
) -> Vec<TokenRule> {
    let Some(map) = section(value, "tokenDefinitions", problems) else {
        return Vec::new();
    };

    let mut rules = Vec::with_capacity(map.len());
    for (name, definition) in map {
        let context = format!("token definition '{name}'");
        if let Some(tokens) = tokens
            && !tokens.contains(name)
        {
            problems.push(ConfigProblem::UnknownToken {
                context,
                name: name.clone(),
                suggestions: compute_suggestions(name, tokens.names()),
            });
            continue;
        }

        let raw: RawTokenDefinition = match serde_json::from_value(definition.clone()) {
            Ok(raw) => raw,
            Err(err) => {
                problems.push(ConfigProblem::Field {
                    context,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let injection_path_template = raw.injection_path_template.and_then(|template| {
            let base = load_path(&template.base_path, format!("{context} basePath"), problems)?;
            let path = load_path(
                &template.template_path,
                format!("{context} templatePath"),
                problems,
            )?;
            let built = InjectionPathTemplate::new(name.clone(), base, path);
            if built.is_none() {
                problems.push(ConfigProblem::TemplateWithoutPlaceholder {
                    token: name.clone(),
                    template: template.template_path.clone(),
                });
            }
            built
        });

        let mut read_paths = Vec::with_capacity(raw.token_read_paths.len());
        for text in &raw.token_read_paths {
            match parse_read_path(text) {
                Ok(path) => read_paths.push(path),
                Err(source) => problems.push(ConfigProblem::InvalidPath {
                    context: format!("{context} tokenReadPaths"),
                    source,
                }),
            }
        }

        rules.push(TokenRule {
            token: name.clone(),
            affects_injection: raw.affects_injection,
            injection_path_template,
            attribute_match_order: AttributeMatchOrder::new(
                &raw.attribute_match_order_for_injection,
            ),
            read_paths,
        });
    }
    rules
}

fn load_groups(
    value: Option<&Value>,
    problems: &mut Vec<ConfigProblem>,
) -> Vec<HierarchicalGroupConfig> {
    let Some(map) = section(value, "hierarchicalGroups", problems) else {
        return Vec::new();
    };

    let mut groups = Vec::with_capacity(map.len());
    for (name, definition) in map {
        let context = format!("group '{name}'");
        let raw: RawGroup = match serde_json::from_value(definition.clone()) {
            Ok(raw) => raw,
            Err(err) => {
                problems.push(ConfigProblem::Field {
                    context,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let before = problems.len();
        for (field, text) in [
            ("groupDisplayAttribute", &raw.group_display_attribute),
            ("groupPathToken", &raw.group_path_token),
        ] {
            if text.trim().is_empty() {
                problems.push(ConfigProblem::EmptyField {
                    context: context.clone(),
                    field: field.to_string(),
                });
            }
        }
        let selector = load_path(&raw.group_selector, format!("{context} groupSelector"), problems);

        let mut paths = Vec::with_capacity(raw.paths.len());
        for (key, template) in &raw.paths {
            let Some(template) = template.as_str() else {
                problems.push(ConfigProblem::Field {
                    context: format!("{context} path for '{key}'"),
                    message: "must be a string".to_string(),
                });
                continue;
            };
            if raw.group_path_token.trim().is_empty() {
                continue;
            }
            if !template.contains(&raw.group_path_token) {
                problems.push(ConfigProblem::GroupPathMissingToken {
                    group: name.clone(),
                    key: key.clone(),
                    token: raw.group_path_token.clone(),
                });
                continue;
            }
            // The template must form a valid path once the token is replaced.
            let expanded = template.replace(&raw.group_path_token, &raw.group_selector);
            if load_path(&expanded, format!("{context} path for '{key}'"), problems).is_some() {
                paths.push((key.clone(), template.to_string()));
            }
        }

        if let Some(group_selector) = selector
            && problems.len() == before
        {
            groups.push(HierarchicalGroupConfig {
                name: name.clone(),
                group_selector,
                group_display_attribute: raw.group_display_attribute.trim().to_string(),
                group_path_token: raw.group_path_token,
                paths,
            });
        }
    }
    groups
}
