//! Exact-match disambiguation of injection candidates.
//!
//! Matching is boolean per token. A candidate is an exact match only when
//! every token relevant to its section matches it, and a target is chosen
//! automatically only when exactly one candidate is an exact match.

use tracing::debug;

use crate::config::TokenRule;
use crate::types::{TokenMap, XmlTargetSection};

/// A token taking part in matching, with its value for the current line.
#[derive(Debug, Clone, Copy)]
pub struct RelevantToken<'a> {
    pub rule: &'a TokenRule,
    pub value: &'a str,
}

/// An entry of the list offered to the user when no target is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// The candidate at this index.
    Candidate(usize),
    /// Insert nothing for this fragment.
    Skip,
}

/// The decision over a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disambiguation {
    /// Exactly one candidate matched every relevant token.
    Selected(usize),
    /// Zero or several exact matches; every candidate is offered, plus skip.
    Ambiguous {
        exact_matches: Vec<usize>,
        choices: Vec<Choice>,
    },
    /// There were no candidates at all.
    NoCandidates,
}

/// The tokens relevant to one injection section.
///
/// A token takes part when its rule affects injection or has an attribute
/// match order, its value for this line is non-empty, and it matches at
/// least one of the section's `candidates`. A token that matches none of
/// them describes some other part of the document.
pub fn relevant_tokens<'a>(
    rules: &'a [TokenRule],
    tokens: &'a TokenMap,
    candidates: &[XmlTargetSection],
) -> Vec<RelevantToken<'a>> {
    rules
        .iter()
        .filter(|rule| rule.takes_part_in_matching())
        .filter_map(|rule| {
            let value = tokens.clean(&rule.token).filter(|value| !value.is_empty())?;
            Some(RelevantToken { rule, value })
        })
        .filter(|token| {
            let relevant = candidates
                .iter()
                .any(|candidate| token_matches(token, candidate));
            if !relevant {
                debug!(
                    token = %token.rule.token,
                    value = token.value,
                    "token not relevant to section"
                );
            }
            relevant
        })
        .collect()
}

/// Whether one token matches a candidate.
///
/// The attribute order is tried first, then the `any` wildcard. A complete
/// segment of the candidate's structural path matches regardless of the
/// order.
pub fn token_matches(token: &RelevantToken<'_>, candidate: &XmlTargetSection) -> bool {
    let order = &token.rule.attribute_match_order;
    let by_attribute = order
        .attributes
        .iter()
        .any(|name| candidate.attribute(name) == Some(token.value));
    by_attribute
        || (order.any && candidate.has_attribute_value(token.value))
        || candidate.has_path_segment(token.value)
}

/// Whether every relevant token matches the candidate.
pub fn is_exact_match(relevant: &[RelevantToken<'_>], candidate: &XmlTargetSection) -> bool {
    relevant.iter().all(|token| token_matches(token, candidate))
}

/// Decide between `candidates` without guessing.
pub fn disambiguate(
    relevant: &[RelevantToken<'_>],
    candidates: &[XmlTargetSection],
) -> Disambiguation {
    if candidates.is_empty() {
        return Disambiguation::NoCandidates;
    }

    let exact_matches: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| is_exact_match(relevant, candidate))
        .map(|(index, _)| index)
        .collect();
    debug!(
        candidates = candidates.len(),
        exact = exact_matches.len(),
        tokens = relevant.len(),
        "disambiguated"
    );

    if let [only] = &exact_matches[..] {
        return Disambiguation::Selected(*only);
    }
    let mut choices: Vec<Choice> = (0..candidates.len()).map(Choice::Candidate).collect();
    choices.push(Choice::Skip);
    Disambiguation::Ambiguous {
        exact_matches,
        choices,
    }
}
