//! Parsers for conditional blocks, token placeholders, and structural paths.
//!
//! Conditional blocks are located by a brace-depth scanner and their contents
//! are parsed into a [`ConditionalExpression`] AST. Placeholders and paths
//! are parsed with winnow.

pub mod ast;
pub mod error;
mod condition;
mod path;
mod placeholder;
mod scanner;

pub use ast::*;
pub use condition::{parse_block, parse_condition, parse_fragment_key};
pub use error::ParseError;
pub use path::{parse_path, parse_read_path};
pub use placeholder::{is_token_char, parse_placeholders};
pub use scanner::{BlockScan, BlockSpan, next_conditional_block};
