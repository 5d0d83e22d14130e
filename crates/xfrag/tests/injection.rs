//! Integration tests for injection-target resolution

use xfrag::inject::{
    Disambiguation, RelevantToken, apply_all, disambiguate, relevant_tokens, token_matches,
};
use xfrag::parser::parse_path;
use xfrag::{
    AmbiguityStage, Choice, GeneratorConfig, GroupPick, InjectError, InjectionResolver, Picks,
    Renderer, Resolution, XmlDocument, XmlQuery, XmlTargetSection,
};

const DOCUMENT: &str = r#"<Root>
  <Applications>
    <Application Name="crm">
      <EntityDefs>
        <EntityDef Name="Order">
          <Attributes>
            <Attribute Name="Id"/>
          </Attributes>
        </EntityDef>
        <EntityDef Name="Customer">
          <Attributes></Attributes>
        </EntityDef>
      </EntityDefs>
    </Application>
    <Application Name="sales">
      <EntityDefs>
        <EntityDef Name="Order">
          <Attributes/>
        </EntityDef>
      </EntityDefs>
    </Application>
  </Applications>
  <Tables>
    <Table EntityDefName="Order" Name="OrderTable">
      <Columns/>
    </Table>
  </Tables>
  <Forms>
    <Form Name="Main">
      <Fields/>
    </Form>
    <Form Name="Detail">
      <Fields>
        <Field Name="x"/>
      </Fields>
    </Form>
  </Forms>
</Root>
"#;

fn config() -> GeneratorConfig {
    GeneratorConfig::from_json_str(
        r#"{
            "tokens": "appname,entity,label,form",
            "fragments": {
                "Attribute": "<Attribute Name=\"{$label}\"/>",
                "Column": "<Column Name=\"{$label}\"/>",
                "FormField": "<Field Name=\"{$label}\"/>"
            },
            "injectionPaths": {
                "Attribute": "EntityDefs/EntityDef/Attributes",
                "Column": "Tables/Table[@EntityDefName='Order']/Columns"
            },
            "tokenDefinitions": {
                "appname": { "attributeMatchOrderForInjection": ["Name"] },
                "entity": {
                    "affectsInjection": true,
                    "injectionPathTemplate": {
                        "basePath": "EntityDefs/EntityDef/Attributes",
                        "templatePath": "EntityDefs/EntityDef[@Name='{value}']/Attributes"
                    },
                    "attributeMatchOrderForInjection": ["Name"]
                },
                "form": { "attributeMatchOrderForInjection": ["Name"] }
            },
            "hierarchicalGroups": {
                "forms": {
                    "groupSelector": "Forms/Form",
                    "groupDisplayAttribute": "Name",
                    "groupPathToken": "{groupPath}",
                    "paths": { "FormField": "{groupPath}/Fields" }
                }
            }
        }"#,
    )
    .unwrap()
}

fn resolve(line: &str, key: &str) -> Resolution {
    resolve_with(line, key, &Picks::default()).unwrap()
}

fn resolve_with(line: &str, key: &str, picks: &Picks) -> Result<Resolution, InjectError> {
    let config = config();
    let document = XmlDocument::parse(DOCUMENT).unwrap();
    let tokens = config.tokens.resolve_line(line);
    InjectionResolver::new(&config, &document).resolve_with(key, &tokens, picks)
}

#[test]
fn test_unique_exact_match_is_selected() {
    match resolve("crm,Order,Due Date", "Attribute") {
        Resolution::Selected { path, target } => {
            assert_eq!(path.to_string(), "EntityDefs/EntityDef[@Name='Order']/Attributes");
            assert!(target.has_path_segment("crm"));
            assert!(target.position.has_child_content);
        }
        other => panic!("expected selection, got {other:?}"),
    }
}

#[test]
fn test_several_exact_matches_are_ambiguous() {
    match resolve(",Order,Due Date", "Attribute") {
        Resolution::Ambiguous(ambiguity) => {
            assert_eq!(ambiguity.stage, AmbiguityStage::Target);
            assert_eq!(ambiguity.candidates.len(), 2);
            assert_eq!(ambiguity.exact_matches, vec![0, 1]);
            assert_eq!(
                ambiguity.choices,
                vec![Choice::Candidate(0), Choice::Candidate(1), Choice::Skip]
            );
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_token_foreign_to_the_section_does_not_take_part() {
    // No candidate lies under an application named 'hr', so appname says
    // nothing about them and both remain exact matches.
    match resolve("hr,Order,Due Date", "Attribute") {
        Resolution::Ambiguous(ambiguity) => {
            assert_eq!(ambiguity.exact_matches, vec![0, 1]);
            assert_eq!(ambiguity.choices.last(), Some(&Choice::Skip));
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }

    // The form token belongs to the forms group, not to entity attributes.
    match resolve("crm,Order,Due Date,Detail", "Attribute") {
        Resolution::Selected { target, .. } => assert!(target.has_path_segment("crm")),
        other => panic!("expected selection, got {other:?}"),
    }
}

#[test]
fn test_no_candidates_is_no_target() {
    match resolve("crm,Invoice,Due Date", "Attribute") {
        Resolution::NoTarget { path } => {
            assert_eq!(path.to_string(), "EntityDefs/EntityDef[@Name='Invoice']/Attributes");
        }
        other => panic!("expected no target, got {other:?}"),
    }
}

#[test]
fn test_entity_def_name_attribute_does_not_rewrite() {
    match resolve(",Order,Due Date", "Column") {
        Resolution::Selected { path, target } => {
            assert_eq!(path.to_string(), "Tables/Table[@EntityDefName='Order']/Columns");
            assert_eq!(target.tag, "Columns");
        }
        other => panic!("expected selection, got {other:?}"),
    }
}

#[test]
fn test_explicit_pick_overrides_ambiguity() {
    let picks = Picks {
        target: Some(1),
        ..Picks::default()
    };
    match resolve_with(",Order,Due Date", "Attribute", &picks).unwrap() {
        Resolution::Selected { target, .. } => assert!(target.has_path_segment("sales")),
        other => panic!("expected selection, got {other:?}"),
    }

    let picks = Picks {
        target: Some(5),
        ..Picks::default()
    };
    assert_eq!(
        resolve_with(",Order,Due Date", "Attribute", &picks),
        Err(InjectError::PickOutOfRange {
            pick: 5,
            candidates: 2
        })
    );
}

#[test]
fn test_unmapped_key() {
    assert_eq!(
        resolve_with("crm", "Nothing", &Picks::default()),
        Err(InjectError::UnmappedKey {
            key: "Nothing".to_string()
        })
    );
}

#[test]
fn test_group_instance_chosen_by_token() {
    match resolve(",,Due Date,Detail", "FormField") {
        Resolution::Selected { path, target } => {
            assert_eq!(path.to_string(), "Forms/Form[@Name='Detail']/Fields");
            assert!(!target.self_closing);
        }
        other => panic!("expected selection, got {other:?}"),
    }
}

#[test]
fn test_group_ambiguity_surfaces_at_group_stage() {
    match resolve(",,Due Date", "FormField") {
        Resolution::Ambiguous(ambiguity) => {
            assert_eq!(
                ambiguity.stage,
                AmbiguityStage::Group {
                    name: "forms".to_string()
                }
            );
            assert_eq!(ambiguity.path.to_string(), "Forms/Form");
            let names: Vec<Option<&str>> = ambiguity
                .candidates
                .iter()
                .map(|c| c.attribute("Name"))
                .collect();
            assert_eq!(names, vec![Some("Main"), Some("Detail")]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_group_pick_by_display_value() {
    let picks = Picks {
        group: Some(GroupPick::Display("Main".to_string())),
        ..Picks::default()
    };
    match resolve_with(",,Due Date", "FormField", &picks).unwrap() {
        Resolution::Selected { path, target } => {
            assert_eq!(path.to_string(), "Forms/Form[@Name='Main']/Fields");
            assert!(target.self_closing);
        }
        other => panic!("expected selection, got {other:?}"),
    }

    let picks = Picks {
        group: Some(GroupPick::Display("Missing".to_string())),
        ..Picks::default()
    };
    assert!(matches!(
        resolve_with(",,Due Date", "FormField", &picks),
        Err(InjectError::NoSuchInstance { .. })
    ));
}

#[test]
fn test_disambiguator_on_two_candidates() {
    let config = config();
    let document = XmlDocument::parse(DOCUMENT).unwrap();
    let candidates = document.find(&parse_path("EntityDef").unwrap());
    assert_eq!(candidates.len(), 3);

    let tokens = config.tokens.resolve_line("sales,Order");
    let relevant = relevant_tokens(&config.token_rules, &tokens, &candidates);
    assert_eq!(relevant.len(), 2);
    assert_eq!(disambiguate(&relevant, &candidates), Disambiguation::Selected(2));

    let tokens = config.tokens.resolve_line(",Order");
    let relevant = relevant_tokens(&config.token_rules, &tokens, &candidates);
    assert!(matches!(
        disambiguate(&relevant, &candidates),
        Disambiguation::Ambiguous { exact_matches, .. } if exact_matches == vec![0, 2]
    ));

    // Each token matches a different candidate, so none matches both.
    let tokens = config.tokens.resolve_line("sales,Customer");
    let relevant = relevant_tokens(&config.token_rules, &tokens, &candidates);
    assert_eq!(relevant.len(), 2);
    assert!(matches!(
        disambiguate(&relevant, &candidates),
        Disambiguation::Ambiguous { exact_matches, choices }
            if exact_matches.is_empty() && choices.len() == 4
    ));
}

#[test]
fn test_insert_after_existing_child_line() {
    let resolution = resolve(",,Due Date,Detail", "FormField");
    let insertion = resolution.plan("        <Field Name=\"DueDate\"/>").unwrap();
    assert_eq!(insertion.text, "        <Field Name=\"DueDate\"/>\n");

    let updated = insertion.apply(DOCUMENT);
    assert!(updated.contains(
        "<Field Name=\"x\"/>\n        <Field Name=\"DueDate\"/>\n      </Fields>"
    ));
    assert!(XmlDocument::parse(updated).is_ok());
}

#[test]
fn test_insert_into_empty_and_self_closing_targets() {
    let empty = resolve("crm,Customer,Due Date", "Attribute");
    let insertion = empty.plan("<Attribute/>").unwrap();
    assert_eq!(insertion.text, "\n<Attribute/>\n");

    let self_closing = resolve("sales,Order,Due Date", "Attribute");
    let insertion = self_closing.plan("<Attribute/>").unwrap();
    assert_eq!(insertion.text, "\n<Attribute/>");
    assert!(insertion.apply(DOCUMENT).contains("<Attributes/>\n<Attribute/>"));
}

#[test]
fn test_inject_rendered_line() {
    let config = config();
    let document = XmlDocument::parse(DOCUMENT).unwrap();
    let output = Renderer::new(&config)
        .render_selection_with_document("crm,Order,Due Date,Detail", &document)
        .unwrap();
    let line = &output.lines[0];
    let resolver = InjectionResolver::new(&config, &document);

    let insertions: Vec<_> = line
        .fragments
        .iter()
        .filter_map(|f| resolver.resolve(&f.key, &line.tokens).ok()?.plan(&f.text))
        .collect();
    assert_eq!(insertions.len(), 3);

    let updated = apply_all(document.source(), &insertions);
    assert!(updated.contains(
        "<Attribute Name=\"Id\"/>\n<Attribute Name=\"DueDate\"/>\n          </Attributes>"
    ));
    assert!(updated.contains("<Columns/>\n<Column Name=\"DueDate\"/>"));
    assert!(updated.contains("<Field Name=\"x\"/>\n<Field Name=\"DueDate\"/>\n      </Fields>"));
    assert!(XmlDocument::parse(updated).is_ok());
}

#[test]
fn test_resolution_is_idempotent() {
    let first = resolve("crm,Order,Due Date", "Attribute");
    let second = resolve("crm,Order,Due Date", "Attribute");
    assert_eq!(first, second);
}

const CATALOG: &str = r#"<Catalog>
  <Section Name="Main" Code="sec-a">
    <Items/>
  </Section>
  <Section Name="Archive" Code="sec-b">
    <Items/>
  </Section>
  <Section Label="Drafts">
    <Items/>
  </Section>
</Catalog>
"#;

fn resolve_in_catalog(config_json: &str, line: &str, key: &str) -> Resolution {
    let config = GeneratorConfig::from_json_str(config_json).unwrap();
    let document = XmlDocument::parse(CATALOG).unwrap();
    let tokens = config.tokens.resolve_line(line);
    InjectionResolver::new(&config, &document)
        .resolve(key, &tokens)
        .unwrap()
}

const MATCH_ORDER_CONFIG: &str = r#"{
    "tokens": "section,label",
    "fragments": { "Item": "<Item Name=\"{$section}\"/>" },
    "injectionPaths": { "Item": "Catalog/Section" },
    "tokenDefinitions": {
        "section": { "attributeMatchOrderForInjection": ["Name", "Code"] },
        "label": { "attributeMatchOrderForInjection": ["any"] }
    }
}"#;

#[test]
fn test_match_order_falls_back_to_later_attribute() {
    match resolve_in_catalog(MATCH_ORDER_CONFIG, "sec-b", "Item") {
        Resolution::Selected { target, .. } => {
            assert_eq!(target.attribute("Name"), Some("Archive"));
        }
        other => panic!("expected selection, got {other:?}"),
    }

    let config = GeneratorConfig::from_json_str(MATCH_ORDER_CONFIG).unwrap();
    let rule = config.rule("section").unwrap();
    let candidate = XmlTargetSection::builder()
        .tag("Section")
        .attributes(vec![
            ("Name".to_string(), "Main".to_string()),
            ("Code".to_string(), "sec-a".to_string()),
        ])
        .build();
    let matches = |value: &str| token_matches(&RelevantToken { rule, value }, &candidate);
    assert!(matches("Main"));
    assert!(matches("sec-a"));
    assert!(!matches("Archive"));
}

#[test]
fn test_any_wildcard_matches_any_attribute() {
    match resolve_in_catalog(MATCH_ORDER_CONFIG, ",Drafts", "Item") {
        Resolution::Selected { target, .. } => {
            assert_eq!(target.attribute("Label"), Some("Drafts"));
        }
        other => panic!("expected selection, got {other:?}"),
    }
}

#[test]
fn test_tokens_matching_different_candidates_leave_no_exact_match() {
    match resolve_in_catalog(MATCH_ORDER_CONFIG, "Main,Drafts", "Item") {
        Resolution::Ambiguous(ambiguity) => {
            assert!(ambiguity.exact_matches.is_empty());
            assert_eq!(ambiguity.candidates.len(), 3);
            assert_eq!(ambiguity.choices.last(), Some(&Choice::Skip));
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_first_applicable_rewrite_wins() {
    let config = r#"{
        "tokens": "section,code",
        "fragments": { "Item": "<Item/>" },
        "injectionPaths": { "Item": "Section/Items" },
        "tokenDefinitions": {
            "section": {
                "affectsInjection": true,
                "injectionPathTemplate": {
                    "basePath": "Section/Items",
                    "templatePath": "Section[@Name='{value}']/Items"
                }
            },
            "code": {
                "affectsInjection": true,
                "injectionPathTemplate": {
                    "basePath": "Section/Items",
                    "templatePath": "Section[@Code='{value}']/Items"
                }
            }
        }
    }"#;

    match resolve_in_catalog(config, "Archive,sec-a", "Item") {
        Resolution::Selected { path, target } => {
            assert_eq!(path.to_string(), "Section[@Name='Archive']/Items");
            assert!(target.has_path_segment("Archive"));
        }
        other => panic!("expected selection, got {other:?}"),
    }

    // With the first token empty, the second definition applies.
    match resolve_in_catalog(config, ",sec-a", "Item") {
        Resolution::Selected { path, target } => {
            assert_eq!(path.to_string(), "Section[@Code='sec-a']/Items");
            assert!(target.has_path_segment("Main"));
        }
        other => panic!("expected selection, got {other:?}"),
    }
}
