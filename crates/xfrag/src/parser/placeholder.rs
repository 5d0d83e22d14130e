//! Token placeholder parser using winnow.
//!
//! Splits text into literal runs and `{$name}`, `{$name:internal}` and
//! `{$name:friendly}` placeholders. Anything that is not a well-formed
//! placeholder, including `{$...}` conditional blocks and unknown forms such
//! as `{$name:other}`, stays literal.

use super::ast::{PlaceholderForm, TemplateSegment};
use winnow::combinator::{alt, delimited, opt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{any, take_while};

/// Parse text into literal and placeholder segments. Never fails: text that
/// is not a placeholder is returned as literal segments.
pub fn parse_placeholders(input: &str) -> Vec<TemplateSegment> {
    let mut remaining = input;
    match segments(&mut remaining) {
        Ok(segments) if remaining.is_empty() => segments,
        _ => vec![TemplateSegment::Literal(input.to_string())],
    }
}

/// Returns true if `c` may appear in a token name.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn segments(input: &mut &str) -> ModalResult<Vec<TemplateSegment>> {
    let segments: Vec<TemplateSegment> =
        repeat(0.., alt((placeholder, literal_char))).parse_next(input)?;
    Ok(merge_literals(segments))
}

/// Merge adjacent Literal segments into single segments.
fn merge_literals(segments: Vec<TemplateSegment>) -> Vec<TemplateSegment> {
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        match segment {
            TemplateSegment::Literal(text) => {
                if let Some(TemplateSegment::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(TemplateSegment::Literal(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Parse a placeholder: {$name} or {$name:form}
fn placeholder(input: &mut &str) -> ModalResult<TemplateSegment> {
    delimited("{$", (token_name, opt(preceded(':', form))), '}')
        .map(|(name, form)| TemplateSegment::Placeholder {
            name: name.to_string(),
            form: form.unwrap_or(PlaceholderForm::Bare),
        })
        .parse_next(input)
}

fn form(input: &mut &str) -> ModalResult<PlaceholderForm> {
    alt((
        "friendly".value(PlaceholderForm::Friendly),
        "internal".value(PlaceholderForm::Internal),
    ))
    .parse_next(input)
}

fn literal_char(input: &mut &str) -> ModalResult<TemplateSegment> {
    any.map(|c: char| TemplateSegment::Literal(c.to_string()))
        .parse_next(input)
}

/// Parse a token name.
pub(crate) fn token_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_token_char).parse_next(input)
}
