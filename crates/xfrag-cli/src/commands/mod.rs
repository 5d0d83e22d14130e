//! CLI command implementations.

mod check;
mod inject;
mod input;
mod render;
mod resolve;

pub use check::{run_check, CheckArgs};
pub use inject::{run_inject, InjectArgs};
pub use render::{run_render, RenderArgs};
pub use resolve::{run_resolve, ResolveArgs};
