//! Evaluation of conditional expressions against a line's tokens.
//!
//! Token references resolve to clean values. A reference to a token that is
//! undefined, or whose value is empty, is recorded as invalid and reads as an
//! empty string; any invalid reference forces the whole condition to false.

use crate::parser::ast::{CompareOp, ConditionalExpression, Operand, OperandPart};
use crate::types::TokenMap;

/// The result of evaluating a condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionOutcome {
    pub condition: bool,
    pub has_valid_tokens: bool,
    /// Referenced tokens that were undefined or empty, in order of first use.
    pub invalid_tokens: Vec<String>,
}

/// The branch chosen for a ternary, with the outcome that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSelection<'e> {
    pub literal: &'e str,
    pub outcome: ConditionOutcome,
}

/// Evaluate an expression to a boolean.
pub fn evaluate_condition(
    expression: &ConditionalExpression,
    tokens: &TokenMap,
) -> ConditionOutcome {
    let mut invalid_tokens = Vec::new();
    let condition = eval(expression, tokens, &mut invalid_tokens);
    let has_valid_tokens = invalid_tokens.is_empty();
    ConditionOutcome {
        condition: condition && has_valid_tokens,
        has_valid_tokens,
        invalid_tokens,
    }
}

/// Choose the branch of a ternary. The literal is returned verbatim; its
/// placeholders are left for the caller to substitute.
///
/// Expressions that are not ternaries select an empty literal.
pub fn select_branch<'e>(
    expression: &'e ConditionalExpression,
    tokens: &TokenMap,
) -> BranchSelection<'e> {
    match expression {
        ConditionalExpression::Ternary {
            condition,
            when_true,
            when_false,
        } => {
            let outcome = evaluate_condition(condition, tokens);
            let literal = if outcome.condition {
                when_true
            } else {
                when_false
            };
            BranchSelection { literal, outcome }
        }
        other => BranchSelection {
            literal: "",
            outcome: evaluate_condition(other, tokens),
        },
    }
}

/// `""`, `"false"` and `"0"` are false; everything else is true.
pub fn is_truthy(value: &str) -> bool {
    !matches!(value, "" | "false" | "0")
}

fn eval(expression: &ConditionalExpression, tokens: &TokenMap, invalid: &mut Vec<String>) -> bool {
    match expression {
        ConditionalExpression::Comparison { op, left, right } => {
            let left = resolve_operand(left, tokens, invalid);
            let right = resolve_operand(right, tokens, invalid);
            match op {
                CompareOp::Eq => left == right,
                CompareOp::NotEq => left != right,
                CompareOp::LessEq => left <= right,
                CompareOp::GreaterEq => left >= right,
            }
        }
        ConditionalExpression::ListMembership {
            negated,
            value,
            list,
        } => {
            let value = resolve_operand(value, tokens, invalid);
            let items: Vec<String> = list
                .iter()
                .map(|item| resolve_operand(item, tokens, invalid))
                .collect();
            items.contains(&value) != *negated
        }
        ConditionalExpression::Truthy(operand) => {
            is_truthy(&resolve_operand(operand, tokens, invalid))
        }
        ConditionalExpression::Ternary {
            condition,
            when_true,
            when_false,
        } => {
            if eval(condition, tokens, invalid) {
                is_truthy(when_true)
            } else {
                is_truthy(when_false)
            }
        }
    }
}

fn resolve_operand(operand: &Operand, tokens: &TokenMap, invalid: &mut Vec<String>) -> String {
    let mut value = String::new();
    for part in &operand.parts {
        match part {
            OperandPart::Text(text) => value.push_str(text),
            OperandPart::Token(name) => match tokens.clean(name) {
                Some(clean) if !clean.is_empty() => value.push_str(clean),
                _ => {
                    if !invalid.contains(name) {
                        invalid.push(name.clone());
                    }
                }
            },
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_block, parse_condition};
    use crate::types::TokenValue;

    fn tokens(pairs: &[(&str, &str)]) -> TokenMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), TokenValue::uniform(*value)))
            .collect()
    }

    fn holds(condition: &str, tokens: &TokenMap) -> bool {
        evaluate_condition(&parse_condition(condition), tokens).condition
    }

    #[test]
    fn comparisons() {
        let t = tokens(&[("type", "Lookup"), ("size", "b")]);
        assert!(holds("type == 'Lookup'", &t));
        assert!(holds("type != 'Text'", &t));
        assert!(holds("type <> 'Text'", &t));
        assert!(holds("{$size} >= 'a'", &t));
        assert!(!holds("{$size} <= 'a'", &t));
    }

    #[test]
    fn membership() {
        let t = tokens(&[("type", "Lookup")]);
        assert!(holds("type in ('Text', 'Lookup')", &t));
        assert!(!holds("type not in ('Text', 'Lookup')", &t));
        assert!(holds("type not in ('Text')", &t));
        assert!(!holds("type in ()", &t));
    }

    #[test]
    fn truthiness_fallback() {
        let t = tokens(&[("flag", "0"), ("other", "yes")]);
        assert!(!holds("{$flag}", &t));
        assert!(holds("{$other}", &t));
        assert!(!holds("'false'", &t));
        assert!(holds("'{$other} and more'", &t));
    }

    #[test]
    fn invalid_tokens_force_false_even_when_negated() {
        let t = tokens(&[("empty", "")]);
        let outcome = evaluate_condition(&parse_condition("missing not in ('x')"), &t);
        assert!(!outcome.condition);
        assert!(!outcome.has_valid_tokens);
        assert_eq!(outcome.invalid_tokens, vec!["missing"]);

        let outcome =
            evaluate_condition(&parse_condition("'{$empty}{$missing}{$empty}' == ''"), &t);
        assert!(!outcome.condition);
        assert_eq!(outcome.invalid_tokens, vec!["empty", "missing"]);
    }

    #[test]
    fn select_branch_returns_literal_verbatim() {
        let t = tokens(&[("type", "Lookup")]);
        let expression = parse_block("type=='Lookup' ", " '{$label}' ", " ''");
        let selection = select_branch(&expression, &t);
        assert_eq!(selection.literal, "{$label}");
        assert!(selection.outcome.condition);
    }
}
