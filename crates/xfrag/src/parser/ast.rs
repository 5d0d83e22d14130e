//! AST types for conditional expressions, placeholders, and paths.

use std::fmt::{Display, Formatter, Result as FmtResult};

// =============================================================================
// Conditional expressions
// =============================================================================

/// A parsed `{$...}` conditional block or one of its conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalExpression {
    /// `left <op> right`
    Comparison {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    /// `value in (a, b)` or `value not in (a, b)`
    ListMembership {
        negated: bool,
        value: Operand,
        list: Vec<Operand>,
    },
    /// A lone operand judged by truthiness: `""`, `"false"` and `"0"` are false.
    Truthy(Operand),
    /// `condition ? 'when_true' : 'when_false'`
    ///
    /// The branch literals are kept verbatim; token placeholders inside them
    /// are substituted only after a branch has been chosen.
    Ternary {
        condition: Box<ConditionalExpression>,
        when_true: String,
        when_false: String,
    },
}

/// Comparison operators accepted in conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `<=`, compared lexically
    LessEq,
    /// `>=`, compared lexically
    GreaterEq,
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::LessEq => "<=",
            CompareOp::GreaterEq => ">=",
        };
        write!(f, "{symbol}")
    }
}

/// One side of a comparison: literal text interleaved with token references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operand {
    pub parts: Vec<OperandPart>,
}

/// A piece of an [`Operand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandPart {
    Text(String),
    /// Reference to a token's clean value.
    Token(String),
}

impl Operand {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![OperandPart::Text(text.into())],
        }
    }

    pub fn token(name: impl Into<String>) -> Self {
        Self {
            parts: vec![OperandPart::Token(name.into())],
        }
    }

    /// Names of every token this operand references.
    pub fn token_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            OperandPart::Token(name) => Some(name.as_str()),
            OperandPart::Text(_) => None,
        })
    }
}

// =============================================================================
// Fragment keys and placeholders
// =============================================================================

/// The key of a fragment template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentKey {
    /// A plain key, always included.
    Literal(String),
    /// `{$cond ? 'a' : 'b'}remainder`: included under `a + remainder` when
    /// the condition holds and omitted otherwise.
    Conditional {
        expression: ConditionalExpression,
        remainder: String,
    },
}

/// A segment of text after conditional blocks have been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    Literal(String),
    Placeholder { name: String, form: PlaceholderForm },
}

/// Which token value a placeholder asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderForm {
    /// `{$name}`: the clean value.
    Bare,
    /// `{$name:internal}`: the clean value.
    Internal,
    /// `{$name:friendly}`: the raw value with whitespace preserved.
    Friendly,
}

impl TemplateSegment {
    /// The placeholder written back out as source text.
    pub fn source_text(&self) -> String {
        match self {
            TemplateSegment::Literal(text) => text.clone(),
            TemplateSegment::Placeholder { name, form } => match form {
                PlaceholderForm::Bare => format!("{{${name}}}"),
                PlaceholderForm::Internal => format!("{{${name}:internal}}"),
                PlaceholderForm::Friendly => format!("{{${name}:friendly}}"),
            },
        }
    }
}

// =============================================================================
// Structural paths
// =============================================================================

/// A locator such as `EntityDefs/EntityDef[@Name='Order']/Attributes`.
///
/// A leading `/` anchors the first step at the document root; otherwise the
/// first step may match at any depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralPath {
    pub anchored: bool,
    pub steps: Vec<PathStep>,
}

/// One element step of a [`StructuralPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub name: String,
    pub predicate: Option<Predicate>,
}

/// An attribute-equality predicate: `[@attribute='value']`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub attribute: String,
    pub value: String,
}

/// A path to an attribute value: `EntityDefs/Application/@Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPath {
    pub path: StructuralPath,
    pub attribute: String,
}

impl PathStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: None,
        }
    }

    pub fn with_predicate(
        name: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Some(Predicate {
                attribute: attribute.into(),
                value: value.into(),
            }),
        }
    }

    /// Returns true if an element with this tag and these attributes
    /// satisfies the step.
    pub fn matches(&self, tag: &str, attributes: &[(String, String)]) -> bool {
        if self.name != tag {
            return false;
        }
        match &self.predicate {
            None => true,
            Some(predicate) => attributes
                .iter()
                .any(|(key, value)| *key == predicate.attribute && *value == predicate.value),
        }
    }
}

impl StructuralPath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self {
            anchored: false,
            steps,
        }
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.value.contains('\''), self.value.contains('"')) {
            (false, _) => write!(f, "[@{}='{}']", self.attribute, self.value),
            (true, false) => write!(f, "[@{}=\"{}\"]", self.attribute, self.value),
            (true, true) => {
                let escaped = self.value.replace('\'', "''");
                write!(f, "[@{}='{escaped}']", self.attribute)
            }
        }
    }
}

impl Display for PathStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name)?;
        if let Some(predicate) = &self.predicate {
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

impl Display for StructuralPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.anchored {
            write!(f, "/")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl Display for ReadPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/@{}", self.path, self.attribute)
    }
}
