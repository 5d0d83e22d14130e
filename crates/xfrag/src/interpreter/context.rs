//! Render context for tracking state while rendering one selection.

use std::mem;

use crate::interpreter::error::RenderWarning;

/// Render context carrying state through the lines of a selection.
///
/// The context tracks:
/// - The 1-based number of the line being rendered
/// - The source key of the fragment being rendered
/// - Warnings collected so far, without duplicates
/// - Whether invalid-token warnings are reported at all
pub struct RenderContext {
    line: usize,
    fragment: String,
    warnings: Vec<RenderWarning>,
    warn_on_invalid_tokens: bool,
}

impl RenderContext {
    pub fn new(warn_on_invalid_tokens: bool) -> Self {
        Self {
            line: 0,
            fragment: String::new(),
            warnings: Vec::new(),
            warn_on_invalid_tokens,
        }
    }

    /// Move on to line `number`.
    pub fn enter_line(&mut self, number: usize) {
        self.line = number;
        self.fragment.clear();
    }

    /// Move on to the fragment configured under `source_key`.
    pub fn enter_fragment(&mut self, source_key: &str) {
        source_key.clone_into(&mut self.fragment);
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Record that a condition referenced undefined or empty tokens.
    pub fn invalid_tokens(&mut self, tokens: Vec<String>, suggestions: Vec<String>) {
        if !self.warn_on_invalid_tokens {
            return;
        }
        self.add_warning(RenderWarning::InvalidTokens {
            line: self.line,
            fragment: self.fragment.clone(),
            tokens,
            suggestions,
        });
    }

    /// Record a `{$` block that never closes.
    pub fn unterminated_block(&mut self, offset: usize) {
        self.add_warning(RenderWarning::UnterminatedBlock {
            line: self.line,
            fragment: self.fragment.clone(),
            offset,
        });
    }

    /// Add a warning to this context.
    pub fn add_warning(&mut self, warning: RenderWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Drain all collected warnings from this context.
    pub fn take_warnings(&mut self) -> Vec<RenderWarning> {
        mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_warnings_are_dropped() {
        let mut ctx = RenderContext::new(true);
        ctx.enter_line(1);
        ctx.enter_fragment("Field");
        ctx.invalid_tokens(vec!["typo".to_string()], vec![]);
        ctx.invalid_tokens(vec!["typo".to_string()], vec![]);
        ctx.enter_line(2);
        ctx.enter_fragment("Field");
        ctx.invalid_tokens(vec!["typo".to_string()], vec![]);

        let warnings = ctx.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(ctx.take_warnings().is_empty());
    }

    #[test]
    fn invalid_token_warnings_can_be_suppressed() {
        let mut ctx = RenderContext::new(false);
        ctx.enter_line(1);
        ctx.invalid_tokens(vec!["typo".to_string()], vec![]);
        ctx.unterminated_block(4);
        assert_eq!(
            ctx.take_warnings(),
            vec![RenderWarning::UnterminatedBlock {
                line: 1,
                fragment: String::new(),
                offset: 4,
            }]
        );
    }
}
