//! Structural path parser using winnow.
//!
//! Paths are `/`-separated element steps, each with an optional
//! attribute-equality predicate:
//!
//! ```text
//! EntityDefs/EntityDef[@Name='Order']/Attributes
//! /Forms/Form[@Name="Main"]
//! Forms/Form[@Name='It''s "new"']
//! ```
//!
//! Inside a quoted value, a doubled quote character stands for one.

use super::ast::{PathStep, Predicate, ReadPath, StructuralPath};
use super::error::ParseError;
use winnow::combinator::{delimited, opt, preceded, separated};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

/// Parse a structural path.
pub fn parse_path(input: &str) -> Result<StructuralPath, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Err(ParseError::EmptyPath);
    }

    let mut remaining = trimmed;
    match path(&mut remaining) {
        Ok(parsed) => {
            if remaining.is_empty() {
                Ok(parsed)
            } else {
                Err(ParseError::Syntax {
                    input: trimmed.to_string(),
                    column: column(trimmed, remaining),
                    message: format!(
                        "unexpected character: '{}'",
                        remaining.chars().next().unwrap_or('?')
                    ),
                })
            }
        }
        Err(e) => Err(ParseError::Syntax {
            input: trimmed.to_string(),
            column: column(trimmed, remaining),
            message: format!("parse error: {e}"),
        }),
    }
}

/// Parse a path to an attribute, e.g. `Application/@Name`.
pub fn parse_read_path(input: &str) -> Result<ReadPath, ParseError> {
    let trimmed = input.trim();
    let missing = || ParseError::MissingReadAttribute {
        input: trimmed.to_string(),
    };

    let (path, attribute) = trimmed.rsplit_once("/@").ok_or_else(missing)?;
    if attribute.is_empty() || !attribute.chars().all(is_name_char) {
        return Err(missing());
    }

    Ok(ReadPath {
        path: parse_path(path)?,
        attribute: attribute.to_string(),
    })
}

/// One-based column of the first unconsumed character.
fn column(original: &str, remaining: &str) -> usize {
    original[..original.len() - remaining.len()].chars().count() + 1
}

fn path(input: &mut &str) -> ModalResult<StructuralPath> {
    let anchored = opt('/').parse_next(input)?.is_some();
    let steps: Vec<PathStep> = separated(1.., step, '/').parse_next(input)?;
    Ok(StructuralPath { anchored, steps })
}

/// Parse a step: name or name[@attr='value']
fn step(input: &mut &str) -> ModalResult<PathStep> {
    (name, opt(predicate))
        .map(|(name, predicate)| PathStep {
            name: name.to_string(),
            predicate,
        })
        .parse_next(input)
}

fn predicate(input: &mut &str) -> ModalResult<Predicate> {
    delimited(
        ('[', ws),
        (preceded('@', name), ws, '=', ws, quoted_value),
        (ws, ']'),
    )
    .map(|(attribute, (), _, (), value)| Predicate {
        attribute: attribute.to_string(),
        value,
    })
    .parse_next(input)
}

fn quoted_value(input: &mut &str) -> ModalResult<String> {
    let mut quote = one_of(['\'', '"']).parse_next(input)?;
    let mut value = String::new();
    loop {
        value.push_str(take_while(0.., |c: char| c != quote).parse_next(input)?);
        quote.parse_next(input)?;
        if opt(quote).parse_next(input)?.is_none() {
            return Ok(value);
        }
        value.push(quote);
    }
}

/// Parse an element or attribute name.
fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_name_char).parse_next(input)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}
