//! Integration tests for fragment rendering and conditional keys

use insta::assert_snapshot;
use xfrag::{GeneratorConfig, RenderError, RenderOptions, RenderWarning, Renderer};

fn config(json: &str) -> GeneratorConfig {
    GeneratorConfig::from_json_str(json).unwrap()
}

fn field_config() -> GeneratorConfig {
    config(
        r#"{
            "tokens": "entity,label,type:Text",
            "fragments": {
                "Field": "<Field Name=\"{$label}\" Caption=\"{$label:friendly}\" Type=\"{$type:internal}\"{$type=='Lookup' ? ' List=\"{$label}List\"' : ''}/>",
                "{$type=='Lookup' ? 'LookupList' : ''}": "<LookupList Name=\"{$label}List\"/>",
                "{$type in ('Text', 'Memo') ? 'Text' : ''}Index": "<Index On=\"{$label}\"/>"
            }
        }"#,
    )
}

#[test]
fn test_conditional_key_included_when_true() {
    let output = Renderer::new(&field_config())
        .render_selection("Order,Customer,Lookup")
        .unwrap();
    assert_eq!(
        output.fragment("LookupList"),
        Some(r#"<LookupList Name="CustomerList"/>"#)
    );
    assert_eq!(output.fragment("TextIndex"), None);
}

#[test]
fn test_conditional_key_omitted_when_false() {
    let output = Renderer::new(&field_config())
        .render_selection("Order,Notes,Memo")
        .unwrap();
    assert_eq!(output.fragment("LookupList"), None);
    assert_eq!(output.fragment("TextIndex"), Some(r#"<Index On="Notes"/>"#));
    let keys: Vec<&str> = output.fragments.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["Field", "TextIndex"]);
}

#[test]
fn test_friendly_preserves_whitespace() {
    let output = Renderer::new(&field_config())
        .render_selection("Order, Due Date ")
        .unwrap();
    assert_snapshot!(
        output.fragment("Field").unwrap(),
        @r#"<Field Name="DueDate" Caption=" Due Date " Type="Text"/>"#
    );
}

#[test]
fn test_branch_placeholders_are_substituted_after_resolution() {
    let output = Renderer::new(&field_config())
        .render_selection("Order,Owner,Lookup")
        .unwrap();
    assert_snapshot!(
        output.fragment("Field").unwrap(),
        @r#"<Field Name="Owner" Caption="Owner" Type="Lookup" List="OwnerList"/>"#
    );
}

#[test]
fn test_nested_brace_literal_in_condition() {
    let config = config(
        r#"{
            "tokens": "type",
            "fragments": { "Out": "{$'{$type}'=='Lookup' ? 'LookupList' : ''}" }
        }"#,
    );
    let renderer = Renderer::new(&config);
    assert_eq!(
        renderer.render_selection("Lookup").unwrap().fragment("Out"),
        Some("LookupList")
    );
    assert_eq!(renderer.render_selection("Text").unwrap().fragment("Out"), Some(""));
}

#[test]
fn test_branch_chooses_nested_block() {
    let config = config(
        r#"{
            "tokens": "a,b",
            "fragments": { "Out": "[{$a=='1' ? '{$b=='2' ? 'both' : 'a only'}' : 'neither'}]" }
        }"#,
    );
    let renderer = Renderer::new(&config);
    assert_eq!(renderer.render_selection("1,2").unwrap().fragment("Out"), Some("[both]"));
    assert_eq!(renderer.render_selection("1,3").unwrap().fragment("Out"), Some("[a only]"));
    assert_eq!(renderer.render_selection("0,2").unwrap().fragment("Out"), Some("[neither]"));
}

#[test]
fn test_lines_are_grouped_by_key() {
    let output = Renderer::new(&field_config())
        .render_selection("Order,Customer,Lookup\n\n   \nOrder,Notes,Memo\nOrder,Total")
        .unwrap();
    assert_eq!(output.lines.len(), 3);
    assert_snapshot!(output.fragment("Field").unwrap(), @r#"
    <Field Name="Customer" Caption="Customer" Type="Lookup" List="CustomerList"/>
    <Field Name="Notes" Caption="Notes" Type="Memo"/>
    <Field Name="Total" Caption="Total" Type="Text"/>
    "#);
    assert_eq!(
        output.fragment("TextIndex"),
        Some("<Index On=\"Notes\"/>\n<Index On=\"Total\"/>")
    );
    let keys: Vec<&str> = output.fragments.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["Field", "LookupList", "TextIndex"]);
}

#[test]
fn test_empty_selection_is_fatal() {
    let config = field_config();
    let renderer = Renderer::new(&config);
    assert_eq!(renderer.render_selection(" \n\t\n"), Err(RenderError::EmptySelection));
    assert_eq!(renderer.render_selection(""), Err(RenderError::EmptySelection));
}

#[test]
fn test_invalid_tokens_warn_and_continue() {
    let config = config(
        r#"{
            "tokens": "type,label",
            "fragments": {
                "A": "{$typ=='Lookup' ? 'yes' : 'no'}",
                "B": "{$label}"
            }
        }"#,
    );
    let output = Renderer::new(&config).render_selection("Lookup,X\nText,Y").unwrap();
    assert_eq!(output.fragment("A"), Some("no\nno"));
    assert_eq!(output.fragment("B"), Some("X\nY"));
    assert_eq!(output.warnings.len(), 2);
    assert_eq!(
        output.warnings[0],
        RenderWarning::InvalidTokens {
            line: 1,
            fragment: "A".to_string(),
            tokens: vec!["typ".to_string()],
            suggestions: vec!["type".to_string()],
        }
    );
}

#[test]
fn test_empty_token_forces_false_without_suggestion() {
    let config = config(
        r#"{
            "tokens": "type,label",
            "fragments": { "A": "{$label != 'x' ? 'yes' : 'no'}" }
        }"#,
    );
    let output = Renderer::new(&config).render_selection("Lookup").unwrap();
    assert_eq!(output.fragment("A"), Some("no"));
    assert!(matches!(
        &output.warnings[..],
        [RenderWarning::InvalidTokens { suggestions, .. }] if suggestions.is_empty()
    ));
}

#[test]
fn test_warnings_can_be_suppressed() {
    let config = config(
        r#"{ "tokens": "type", "fragments": { "A": "{$missing ? 'y' : 'n'}" } }"#,
    );
    let options = RenderOptions::builder().warn_on_invalid_tokens(false).build();
    let output = Renderer::with_options(&config, options)
        .render_selection("x")
        .unwrap();
    assert_eq!(output.fragment("A"), Some("n"));
    assert!(output.warnings.is_empty());
}

#[test]
fn test_unterminated_block_is_kept_as_text() {
    let config = config(
        r#"{ "tokens": "type", "fragments": { "A": "a{$type=='x' ? 'y' : 'n'" } }"#,
    );
    let output = Renderer::new(&config).render_selection("x").unwrap();
    assert_eq!(output.fragment("A"), Some("a{$type=='x' ? 'y' : 'n'"));
    assert_eq!(
        output.warnings,
        vec![RenderWarning::UnterminatedBlock {
            line: 1,
            fragment: "A".to_string(),
            offset: 1,
        }]
    );
}

#[test]
fn test_rendering_is_idempotent() {
    let config = field_config();
    let renderer = Renderer::new(&config);
    let first = renderer.render_selection("Order,Customer,Lookup").unwrap();
    let second = renderer.render_selection("Order,Customer,Lookup").unwrap();
    assert_eq!(first, second);
}
