//! Hierarchical group instances and path expansion.

use tracing::warn;

use crate::config::HierarchicalGroupConfig;
use crate::parser::{ParseError, PathStep, StructuralPath, parse_path};
use crate::types::XmlTargetSection;
use crate::xml::XmlQuery;

/// One container matched by a group's selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInstance {
    pub section: XmlTargetSection,
    /// The instance's value for the group's display attribute.
    pub display_value: String,
    /// The selector path narrowed to this instance, e.g. `Forms/Form[@Name='Main']`.
    pub enriched_path: StructuralPath,
}

/// How a caller names a group instance explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupPick {
    /// Zero-based position among the enumerated instances.
    Index(usize),
    /// The instance's display attribute value.
    Display(String),
}

/// Every instance of `group` in the document, in document order.
///
/// Containers lacking the display attribute cannot be addressed and are
/// skipped.
pub fn enumerate_instances(
    group: &HierarchicalGroupConfig,
    document: &dyn XmlQuery,
) -> Vec<GroupInstance> {
    document
        .find(&group.group_selector)
        .into_iter()
        .filter_map(|section| {
            let Some(display_value) = section.attribute(&group.group_display_attribute) else {
                warn!(
                    group = %group.name,
                    attribute = %group.group_display_attribute,
                    at = %section,
                    "group instance skipped: display attribute missing"
                );
                return None;
            };
            let display_value = display_value.to_string();
            let enriched_path = enrich(
                &group.group_selector,
                &group.group_display_attribute,
                &display_value,
            );
            Some(GroupInstance {
                section,
                display_value,
                enriched_path,
            })
        })
        .collect()
}

/// The instance named by `pick`, if it exists.
pub fn pick_instance<'i>(
    instances: &'i [GroupInstance],
    pick: &GroupPick,
) -> Option<&'i GroupInstance> {
    match pick {
        GroupPick::Index(index) => instances.get(*index),
        GroupPick::Display(value) => instances.iter().find(|i| i.display_value == *value),
    }
}

/// Expand a dependent path template for the chosen instance.
pub fn expand_template(
    group: &HierarchicalGroupConfig,
    instance: &GroupInstance,
    template: &str,
) -> Result<StructuralPath, ParseError> {
    let expanded = template.replace(&group.group_path_token, &instance.enriched_path.to_string());
    parse_path(&expanded)
}

/// Expand every path of `group` for `instance`, keyed by fragment key.
/// Paths that do not belong to the group pass through unchanged.
pub fn expand_paths(
    group: &HierarchicalGroupConfig,
    instance: &GroupInstance,
    plain: &[(String, StructuralPath)],
) -> Result<Vec<(String, StructuralPath)>, ParseError> {
    let mut paths = plain.to_vec();
    for (key, template) in &group.paths {
        let path = expand_template(group, instance, template)?;
        match paths.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = path,
            None => paths.push((key.clone(), path)),
        }
    }
    Ok(paths)
}

fn enrich(selector: &StructuralPath, attribute: &str, value: &str) -> StructuralPath {
    let mut path = selector.clone();
    if let Some(last) = path.steps.last_mut() {
        *last = PathStep::with_predicate(last.name.clone(), attribute, value);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn forms() -> HierarchicalGroupConfig {
        HierarchicalGroupConfig {
            name: "forms".to_string(),
            group_selector: parse_path("Forms/Form").unwrap(),
            group_display_attribute: "Name".to_string(),
            group_path_token: "{groupPath}".to_string(),
            paths: vec![("FormField".to_string(), "{groupPath}/Fields".to_string())],
        }
    }

    const DOC: &str = r#"<App><Forms><Form Name="Main"><Fields/></Form><Form/><Form Name="Detail"><Fields/></Form></Forms></App>"#;

    #[test]
    fn instances_without_display_attribute_are_skipped() {
        let doc = XmlDocument::parse(DOC).unwrap();
        let instances = enumerate_instances(&forms(), &doc);
        let names: Vec<&str> = instances.iter().map(|i| i.display_value.as_str()).collect();
        assert_eq!(names, vec!["Main", "Detail"]);
        assert_eq!(instances[1].enriched_path.to_string(), "Forms/Form[@Name='Detail']");
    }

    #[test]
    fn expansion_scopes_paths_to_the_instance() {
        let doc = XmlDocument::parse(DOC).unwrap();
        let group = forms();
        let instances = enumerate_instances(&group, &doc);
        let chosen = pick_instance(&instances, &GroupPick::Display("Detail".to_string())).unwrap();
        let plain = vec![("Other".to_string(), parse_path("App/Other").unwrap())];

        let paths = expand_paths(&group, chosen, &plain).unwrap();
        assert_eq!(paths[0].1.to_string(), "App/Other");
        assert_eq!(paths[1].0, "FormField");
        assert_eq!(paths[1].1.to_string(), "Forms/Form[@Name='Detail']/Fields");
        assert_eq!(doc.find(&paths[1].1).len(), 1);
    }

    #[test]
    fn display_values_with_both_quotes_expand() {
        let doc = XmlDocument::parse(
            r#"<Forms><Form Name="It's &quot;new&quot;"><Fields/></Form></Forms>"#,
        )
        .unwrap();
        let group = forms();
        let instances = enumerate_instances(&group, &doc);
        assert_eq!(instances[0].display_value, r#"It's "new""#);

        let path = expand_template(&group, &instances[0], "{groupPath}/Fields").unwrap();
        assert_eq!(path.to_string(), r#"Forms/Form[@Name='It''s "new"']/Fields"#);
        assert_eq!(doc.find(&path).len(), 1);
    }
}
