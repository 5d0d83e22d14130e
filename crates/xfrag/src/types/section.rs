use std::fmt::{Display, Formatter, Result as FmtResult};

use bon::Builder;

/// Byte offsets locating an element within the document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionPosition {
    /// Offset of the `<` that opens the element.
    pub open_tag_start: usize,
    /// Offset just past the `>` of the open tag (or `/>` when self-closing).
    pub open_tag_end: usize,
    /// Offset of the `<` of the close tag. `None` for self-closing elements.
    pub close_tag_start: Option<usize>,
    /// Start of the close tag's line, when only whitespace precedes the close
    /// tag on that line and the line begins after the open tag.
    pub close_line_start: Option<usize>,
    /// Offset just past the last byte of the element.
    pub element_end: usize,
    /// Whether the element already holds child elements, text, or comments.
    pub has_child_content: bool,
}

/// An element of the live document that could receive generated content.
///
/// Sections are built fresh from the document for every resolution pass and
/// must not be kept across edits: their offsets describe one snapshot only.
///
/// # Example
///
/// ```
/// use xfrag::{SectionPosition, XmlTargetSection};
///
/// let section = XmlTargetSection::builder()
///     .tag("Attributes")
///     .attributes(vec![("Name".to_string(), "Order".to_string())])
///     .position(SectionPosition::default())
///     .build();
///
/// assert_eq!(section.attribute("Name"), Some("Order"));
/// assert!(!section.self_closing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct XmlTargetSection {
    /// Element name as written in the document.
    pub tag: String,

    /// Attributes in document order.
    #[builder(default)]
    pub attributes: Vec<(String, String)>,

    #[builder(default)]
    pub position: SectionPosition,

    #[builder(default)]
    pub self_closing: bool,

    /// Structural segments from the root down to this element: each
    /// element's tag name followed by its attribute values.
    #[builder(default)]
    pub path_segments: Vec<String>,

    /// Human-readable locator, e.g. `EntityDefs/EntityDef[@Name='Order']/Attributes`.
    #[builder(default)]
    pub display_path: String,
}

impl XmlTargetSection {
    /// The value of attribute `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if any attribute on the element has exactly `value`.
    pub fn has_attribute_value(&self, value: &str) -> bool {
        self.attributes.iter().any(|(_, v)| v == value)
    }

    /// Returns true if `value` is a complete segment of the element's
    /// structural path. Substrings of a segment never count.
    pub fn has_path_segment(&self, value: &str) -> bool {
        self.path_segments.iter().any(|segment| segment == value)
    }
}

impl Display for XmlTargetSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.display_path.is_empty() {
            write!(f, "<{}>", self.tag)
        } else {
            write!(f, "{}", self.display_path)
        }
    }
}
