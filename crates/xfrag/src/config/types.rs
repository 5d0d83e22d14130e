//! Strongly typed configuration structures.

use crate::parser::ast::{FragmentKey, PathStep, ReadPath, StructuralPath};

/// Placeholder for the token value in an injection path template.
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// Attribute-list entry that matches any attribute of a candidate.
pub const ANY_ATTRIBUTE: &str = "any";

/// A fragment template as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentTemplate {
    /// The key exactly as written in the configuration.
    pub source_key: String,
    pub key: FragmentKey,
    pub body: String,
}

/// Injection behavior attached to a declared token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenRule {
    pub token: String,
    pub affects_injection: bool,
    pub injection_path_template: Option<InjectionPathTemplate>,
    pub attribute_match_order: AttributeMatchOrder,
    /// Document locations to read the value from when a line leaves it empty.
    pub read_paths: Vec<ReadPath>,
}

impl TokenRule {
    /// Returns true if the token takes part in exact matching.
    pub fn takes_part_in_matching(&self) -> bool {
        self.affects_injection || !self.attribute_match_order.is_empty()
    }
}

/// Rewrites a generic path into one scoped by a token value, e.g.
/// `EntityDefs/EntityDef/Attributes` into
/// `EntityDefs/EntityDef[@Name='{value}']/Attributes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPathTemplate {
    pub token: String,
    pub base_path: StructuralPath,
    pub template_path: StructuralPath,
    /// Index of the template step whose predicate holds the placeholder.
    distinguishing_step: usize,
}

impl InjectionPathTemplate {
    /// Build a template. Returns `None` unless exactly one step of
    /// `template_path` has a predicate value containing `{value}`.
    pub fn new(
        token: impl Into<String>,
        base_path: StructuralPath,
        template_path: StructuralPath,
    ) -> Option<Self> {
        let mut holders = template_path.steps.iter().enumerate().filter(|(_, step)| {
            step.predicate
                .as_ref()
                .is_some_and(|predicate| predicate.value.contains(VALUE_PLACEHOLDER))
        });
        let (distinguishing_step, _) = holders.next()?;
        if holders.next().is_some() {
            return None;
        }
        Some(Self {
            token: token.into(),
            base_path,
            template_path,
            distinguishing_step,
        })
    }

    /// The template step that carries the placeholder, e.g.
    /// `EntityDef[@Name='{value}']`.
    pub fn distinguishing_step(&self) -> &PathStep {
        &self.template_path.steps[self.distinguishing_step]
    }
}

/// Ordered attribute names tried when matching a token against a candidate,
/// optionally ending in the `any` wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMatchOrder {
    pub attributes: Vec<String>,
    pub any: bool,
}

impl AttributeMatchOrder {
    pub fn new<S: AsRef<str>>(entries: impl IntoIterator<Item = S>) -> Self {
        let mut order = Self::default();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry == ANY_ATTRIBUTE {
                order.any = true;
            } else if !entry.is_empty() && !order.attributes.iter().any(|a| a == entry) {
                order.attributes.push(entry.to_string());
            }
        }
        order
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && !self.any
    }
}

/// Repeated containers whose inner paths are resolved once one instance has
/// been chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalGroupConfig {
    pub name: String,
    /// Path enumerating the container instances.
    pub group_selector: StructuralPath,
    /// Attribute identifying an instance, used in its enriched path.
    pub group_display_attribute: String,
    /// Placeholder in `paths` replaced by the chosen instance's path.
    pub group_path_token: String,
    /// Fragment key to path template, in configuration order.
    pub paths: Vec<(String, String)>,
}

impl HierarchicalGroupConfig {
    /// The path template for `key`, if this group scopes it.
    pub fn path_template(&self, key: &str) -> Option<&str> {
        self.paths
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, template)| template.as_str())
    }
}
