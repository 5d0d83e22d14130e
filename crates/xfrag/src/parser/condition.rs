//! Condition parser using winnow.
//!
//! Parses the text of a conditional block into a [`ConditionalExpression`].
//! Grammars are tried in order:
//! - comparison: `left == right`, `!=`, `<>`, `<=`, `>=`
//! - list membership: `value in ('a', 'b')`, `value not in (...)`
//! - a single operand judged by truthiness
//!
//! Condition text matching none of them is judged by truthiness as a whole,
//! so parsing a condition never fails.

use super::ast::{
    CompareOp, ConditionalExpression, FragmentKey, Operand, OperandPart, TemplateSegment,
};
use super::placeholder::{parse_placeholders, token_name};
use super::scanner::{BlockScan, next_conditional_block};
use winnow::combinator::{alt, delimited, eof, opt, preceded, terminated};
use winnow::prelude::*;
use winnow::token::take_while;

/// Parse a fragment key. Keys starting with a conditional block become
/// [`FragmentKey::Conditional`]; everything else is literal.
pub fn parse_fragment_key(key: &str) -> FragmentKey {
    if let Some(BlockScan::Found(span)) = next_conditional_block(key, 0)
        && span.start == 0
    {
        return FragmentKey::Conditional {
            expression: parse_block(
                span.condition(key),
                span.when_true(key),
                span.when_false(key),
            ),
            remainder: key[span.end..].to_string(),
        };
    }
    FragmentKey::Literal(key.to_string())
}

/// Build a ternary from the three parts of a scanned block.
///
/// Branches are trimmed and one layer of surrounding quotes is removed; their
/// contents are otherwise kept verbatim.
pub fn parse_block(condition: &str, when_true: &str, when_false: &str) -> ConditionalExpression {
    ConditionalExpression::Ternary {
        condition: Box::new(parse_condition(condition)),
        when_true: strip_quotes(when_true).to_string(),
        when_false: strip_quotes(when_false).to_string(),
    }
}

/// Parse condition text.
pub fn parse_condition(input: &str) -> ConditionalExpression {
    let trimmed = input.trim();
    let mut remaining = trimmed;
    match full_condition(&mut remaining) {
        Ok(expression) => expression,
        Err(_) => ConditionalExpression::Truthy(interpolated(trimmed)),
    }
}

fn full_condition(input: &mut &str) -> ModalResult<ConditionalExpression> {
    alt((
        terminated(comparison, (ws, eof)),
        terminated(membership, (ws, eof)),
        terminated(truthy, (ws, eof)),
    ))
    .parse_next(input)
}

/// Parse a comparison: operand op operand
fn comparison(input: &mut &str) -> ModalResult<ConditionalExpression> {
    (operand, ws, compare_op, ws, operand)
        .map(|(left, (), op, (), right)| ConditionalExpression::Comparison { op, left, right })
        .parse_next(input)
}

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    alt((
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::NotEq),
        "<>".value(CompareOp::NotEq),
        "<=".value(CompareOp::LessEq),
        ">=".value(CompareOp::GreaterEq),
    ))
    .parse_next(input)
}

/// Parse list membership: operand (not)? in (items)
fn membership(input: &mut &str) -> ModalResult<ConditionalExpression> {
    let value = operand(input)?;
    ws1(input)?;
    let negated = opt(terminated("not", ws1)).parse_next(input)?.is_some();
    "in".parse_next(input)?;
    ws(input)?;
    let items: &str = delimited('(', take_while(0.., |c: char| c != ')'), ')').parse_next(input)?;

    let list = items
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| interpolated(strip_quotes(item)))
        .collect();

    Ok(ConditionalExpression::ListMembership {
        negated,
        value,
        list,
    })
}

fn truthy(input: &mut &str) -> ModalResult<ConditionalExpression> {
    operand.map(ConditionalExpression::Truthy).parse_next(input)
}

/// Parse an operand: quoted string, {$token}, or a bare word.
fn operand(input: &mut &str) -> ModalResult<Operand> {
    alt((quoted, token_reference, bare_word)).parse_next(input)
}

fn quoted(input: &mut &str) -> ModalResult<Operand> {
    alt((
        delimited('\'', take_while(0.., |c: char| c != '\''), '\''),
        delimited('"', take_while(0.., |c: char| c != '"'), '"'),
    ))
    .map(interpolated)
    .parse_next(input)
}

/// Parse {$name} with an optional :form suffix. Conditions always compare
/// clean values, so the form is ignored.
fn token_reference(input: &mut &str) -> ModalResult<Operand> {
    delimited("{$", (token_name, opt(preceded(':', token_name))), '}')
        .map(|(name, _)| Operand::token(name))
        .parse_next(input)
}

/// Parse a bare word. Words starting with a letter or underscore name a
/// token; anything else (numbers, negative numbers) is literal.
fn bare_word(input: &mut &str) -> ModalResult<Operand> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        .map(|word: &str| {
            if word.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                Operand::token(word)
            } else {
                Operand::text(word)
            }
        })
        .parse_next(input)
}

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

fn ws1(input: &mut &str) -> ModalResult<()> {
    take_while(1.., char::is_whitespace)
        .void()
        .parse_next(input)
}

/// Split quoted text into literal runs and token references.
fn interpolated(text: &str) -> Operand {
    let parts = parse_placeholders(text)
        .into_iter()
        .map(|segment| match segment {
            TemplateSegment::Literal(text) => OperandPart::Text(text),
            TemplateSegment::Placeholder { name, .. } => OperandPart::Token(name),
        })
        .collect();
    Operand { parts }
}

/// Trim and remove one layer of matching single or double quotes.
fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    ['\'', '"']
        .into_iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(trimmed)
}
