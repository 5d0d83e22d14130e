//! Token resolution, condition evaluation, and fragment rendering.

mod context;
mod error;
mod evaluator;
mod renderer;
mod tokens;

pub use context::RenderContext;
pub use error::{RenderError, RenderWarning, compute_suggestions};
pub use evaluator::{
    BranchSelection, ConditionOutcome, evaluate_condition, is_truthy, select_branch,
};
pub use renderer::{
    RenderOptions, RenderOutput, RenderedFragment, RenderedLine, Renderer, substitute_tokens,
};
pub use tokens::{TokenSet, sanitize};
