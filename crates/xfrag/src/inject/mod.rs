//! Injection-target resolution.
//!
//! A fragment key is mapped to a structural path (a plain injection path, or
//! a hierarchical group template once an instance is chosen), rewritten with
//! the line's tokens, looked up in the document, and disambiguated by exact
//! matching. Nothing here ever guesses: anything short of a single exact
//! match is handed back to the caller.

mod error;
mod group;
mod insertion;
mod matcher;
mod resolver;
mod rewrite;

pub use error::InjectError;
pub use group::{
    GroupInstance, GroupPick, enumerate_instances, expand_paths, expand_template, pick_instance,
};
pub use insertion::{Insertion, apply_all};
pub use matcher::{
    Choice, Disambiguation, RelevantToken, disambiguate, is_exact_match, relevant_tokens,
    token_matches,
};
pub use resolver::{Ambiguity, AmbiguityStage, InjectionResolver, Picks, Resolution};
pub use rewrite::rewrite_path;
