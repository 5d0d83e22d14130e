//! Diagnostics and tables for terminal output.

pub mod diagnostic;
pub mod table;

pub use diagnostic::{ConfigDiagnostic, SourceDiagnostic};
