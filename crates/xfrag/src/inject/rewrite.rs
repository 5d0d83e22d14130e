//! Token-driven rewriting of structural paths.

use tracing::debug;

use crate::config::{TokenRule, VALUE_PLACEHOLDER};
use crate::parser::{PathStep, Predicate, StructuralPath};
use crate::types::TokenMap;

/// Rewrite `path` with the first applicable token rule.
///
/// A rule applies when its token affects injection, carries an injection
/// path template, has a non-empty value for this line, and `path` holds a
/// step with exactly the template's distinguishing element name. The first
/// such step is replaced by the distinguishing step with the token value
/// filled in. Names are compared whole, so an `EntityDefName` attribute or a
/// `EntityDefs` step never triggers an `EntityDef` rewrite.
///
/// Rules are tried in configuration order; only one rewrite happens.
pub fn rewrite_path(
    path: &StructuralPath,
    rules: &[TokenRule],
    tokens: &TokenMap,
) -> StructuralPath {
    for rule in rules.iter().filter(|rule| rule.affects_injection) {
        let Some(template) = &rule.injection_path_template else {
            continue;
        };
        let Some(value) = tokens.clean(&rule.token).filter(|value| !value.is_empty()) else {
            continue;
        };
        let distinguishing = template.distinguishing_step();
        let Some(index) = path
            .steps
            .iter()
            .position(|step| step.name == distinguishing.name)
        else {
            continue;
        };

        let mut rewritten = path.clone();
        rewritten.steps[index] = fill_step(distinguishing, value);
        debug!(token = %rule.token, from = %path, to = %rewritten, "path rewritten");
        return rewritten;
    }
    path.clone()
}

fn fill_step(step: &PathStep, value: &str) -> PathStep {
    PathStep {
        name: step.name.clone(),
        predicate: step.predicate.as_ref().map(|predicate| Predicate {
            attribute: predicate.attribute.clone(),
            value: predicate.value.replace(VALUE_PLACEHOLDER, value),
        }),
    }
}
