//! Fragment rendering for a selection of input lines.

use bon::Builder;
use tracing::debug;

use crate::config::{FragmentTemplate, GeneratorConfig};
use crate::interpreter::context::RenderContext;
use crate::interpreter::error::{RenderError, RenderWarning, compute_suggestions};
use crate::interpreter::evaluator::{ConditionOutcome, select_branch};
use crate::parser::{
    BlockScan, FragmentKey, PlaceholderForm, TemplateSegment, next_conditional_block,
    parse_block, parse_placeholders,
};
use crate::types::TokenMap;
use crate::xml::XmlQuery;

/// Options controlling a rendering pass.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct RenderOptions {
    /// Report conditions that reference undefined or empty tokens.
    #[builder(default = true)]
    pub warn_on_invalid_tokens: bool,

    /// Joins the bodies rendered for the same key by successive lines.
    #[builder(default = "\n".to_string())]
    pub line_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::builder().build()
    }
}

/// One output section: every body rendered under an effective key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    pub key: String,
    pub text: String,
}

/// The fragments one input line produced, before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// 1-based position among the non-blank lines of the selection.
    pub number: usize,
    pub tokens: TokenMap,
    pub fragments: Vec<RenderedFragment>,
}

/// The result of rendering a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Fragments grouped by effective key, in order of first appearance.
    pub fragments: Vec<RenderedFragment>,
    pub warnings: Vec<RenderWarning>,
    pub lines: Vec<RenderedLine>,
}

impl RenderOutput {
    /// The grouped text rendered under `key`.
    pub fn fragment(&self, key: &str) -> Option<&str> {
        self.fragments
            .iter()
            .find(|fragment| fragment.key == key)
            .map(|fragment| fragment.text.as_str())
    }
}

/// Renders fragment templates for input lines.
///
/// # Example
///
/// ```
/// use xfrag::{GeneratorConfig, Renderer};
///
/// let config = GeneratorConfig::from_json_str(r#"{
///     "tokens": "label,type:Text",
///     "fragments": {
///         "Field": "<Field Name=\"{$label}\" Type=\"{$type}\"/>",
///         "{$type == 'Lookup' ? 'Lookup' : ''}List": "<List For=\"{$label}\"/>"
///     }
/// }"#).unwrap();
///
/// let output = Renderer::new(&config).render_selection("Due Date\nOwner,Lookup").unwrap();
/// assert_eq!(
///     output.fragment("Field"),
///     Some("<Field Name=\"DueDate\" Type=\"Text\"/>\n<Field Name=\"Owner\" Type=\"Lookup\"/>")
/// );
/// assert_eq!(output.fragment("LookupList"), Some("<List For=\"Owner\"/>"));
/// ```
pub struct Renderer<'c> {
    config: &'c GeneratorConfig,
    options: RenderOptions,
}

impl<'c> Renderer<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self::with_options(config, RenderOptions::default())
    }

    pub fn with_options(config: &'c GeneratorConfig, options: RenderOptions) -> Self {
        Self { config, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render every non-blank line of `selection`.
    pub fn render_selection(&self, selection: &str) -> Result<RenderOutput, RenderError> {
        self.render_lines(selection, |line| self.config.tokens.resolve_line(line))
    }

    /// Render a selection, filling tokens a line leaves empty from the
    /// document's configured read paths.
    pub fn render_selection_with_document(
        &self,
        selection: &str,
        document: &dyn XmlQuery,
    ) -> Result<RenderOutput, RenderError> {
        self.render_lines(selection, |line| {
            self.config
                .tokens
                .resolve_line_with_document(line, &self.config.token_rules, document)
        })
    }

    fn render_lines(
        &self,
        selection: &str,
        resolve: impl Fn(&str) -> TokenMap,
    ) -> Result<RenderOutput, RenderError> {
        let input: Vec<&str> = selection
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if input.is_empty() {
            return Err(RenderError::EmptySelection);
        }

        let mut ctx = RenderContext::new(self.options.warn_on_invalid_tokens);
        let mut output = RenderOutput::default();

        for (index, line) in input.into_iter().enumerate() {
            let number = index + 1;
            ctx.enter_line(number);
            let tokens = resolve(line);
            let fragments = self.render_line(&tokens, &mut ctx);
            debug!(line = number, fragments = fragments.len(), "line rendered");

            for fragment in &fragments {
                match output.fragments.iter_mut().find(|f| f.key == fragment.key) {
                    Some(existing) => {
                        existing.text.push_str(&self.options.line_separator);
                        existing.text.push_str(&fragment.text);
                    }
                    None => output.fragments.push(fragment.clone()),
                }
            }
            output.lines.push(RenderedLine {
                number,
                tokens,
                fragments,
            });
        }

        output.warnings = ctx.take_warnings();
        Ok(output)
    }

    /// Render every fragment template for one line of tokens, in
    /// configuration order. Fragments whose conditional key is false are
    /// omitted.
    pub fn render_line(&self, tokens: &TokenMap, ctx: &mut RenderContext) -> Vec<RenderedFragment> {
        let mut fragments = Vec::new();
        for template in &self.config.fragments {
            ctx.enter_fragment(&template.source_key);
            let Some(key) = self.effective_key(template, tokens, ctx) else {
                continue;
            };
            let resolved = self.resolve_conditionals(&template.body, tokens, ctx);
            fragments.push(RenderedFragment {
                key,
                text: substitute_tokens(&resolved, tokens),
            });
        }
        fragments
    }

    /// The key a fragment is emitted under for this line, or `None` when a
    /// conditional key evaluates to false.
    pub fn effective_key(
        &self,
        template: &FragmentTemplate,
        tokens: &TokenMap,
        ctx: &mut RenderContext,
    ) -> Option<String> {
        match &template.key {
            FragmentKey::Literal(key) => Some(key.clone()),
            FragmentKey::Conditional {
                expression,
                remainder,
            } => {
                let selection = select_branch(expression, tokens);
                self.report(&selection.outcome, ctx);
                if !selection.outcome.condition {
                    return None;
                }
                let key = format!("{}{remainder}", selection.literal);
                Some(substitute_tokens(&key, tokens))
            }
        }
    }

    /// Replace every conditional block in `text` with its chosen branch.
    ///
    /// Blocks are resolved left to right. After a replacement, scanning
    /// resumes where the block started, so a branch that itself holds a
    /// block is resolved too. Branch literals keep their placeholders.
    pub fn resolve_conditionals(
        &self,
        text: &str,
        tokens: &TokenMap,
        ctx: &mut RenderContext,
    ) -> String {
        let mut text = text.to_string();
        let mut from = 0;
        while let Some(scan) = next_conditional_block(&text, from) {
            let span = match scan {
                BlockScan::Found(span) => span,
                BlockScan::Unterminated { start } => {
                    ctx.unterminated_block(start);
                    break;
                }
            };
            let condition = self.resolve_conditionals(span.condition(&text), tokens, ctx);
            let expression = parse_block(&condition, span.when_true(&text), span.when_false(&text));
            let selection = select_branch(&expression, tokens);
            self.report(&selection.outcome, ctx);

            let literal = selection.literal.to_string();
            text.replace_range(span.start..span.end, &literal);
            from = span.start;
        }
        text
    }

    fn report(&self, outcome: &ConditionOutcome, ctx: &mut RenderContext) {
        if outcome.has_valid_tokens {
            return;
        }
        let declared = &self.config.tokens;
        let mut suggestions = Vec::new();
        for name in outcome.invalid_tokens.iter().filter(|name| !declared.contains(name)) {
            for suggestion in compute_suggestions(name, declared.names()) {
                if !suggestions.contains(&suggestion) {
                    suggestions.push(suggestion);
                }
            }
        }
        ctx.invalid_tokens(outcome.invalid_tokens.clone(), suggestions);
    }
}

/// Substitute token placeholders in a single pass. `{$name:friendly}` takes
/// the raw value; `{$name}` and `{$name:internal}` take the clean value.
/// Placeholders naming unknown tokens are kept as written.
pub fn substitute_tokens(text: &str, tokens: &TokenMap) -> String {
    parse_placeholders(text)
        .iter()
        .map(|segment| match segment {
            TemplateSegment::Literal(text) => text.clone(),
            TemplateSegment::Placeholder { name, form } => match tokens.get(name) {
                Some(value) => match form {
                    PlaceholderForm::Friendly => value.raw.clone(),
                    PlaceholderForm::Bare | PlaceholderForm::Internal => value.clean.clone(),
                },
                None => segment.source_text(),
            },
        })
        .collect()
}
