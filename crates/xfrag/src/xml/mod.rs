//! XML document model and structural candidate lookup.
//!
//! The document is parsed once with quick-xml into a flat element index that
//! keeps the byte offsets needed to insert text. Lookups never interpret
//! token syntax; they compare tag names and attribute values only.

mod document;
mod error;

pub use document::XmlDocument;
pub use error::DocumentError;

use crate::parser::{ReadPath, StructuralPath};
use crate::types::XmlTargetSection;

/// Structural queries the injection resolver runs against a document.
pub trait XmlQuery {
    /// Every element matching `path`, in document order.
    fn find(&self, path: &StructuralPath) -> Vec<XmlTargetSection>;

    /// The first non-empty value of the attribute named by `path`.
    fn read_attribute(&self, path: &ReadPath) -> Option<String>;
}
