use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::XmlQuery;
use super::error::DocumentError;
use crate::parser::{PathStep, ReadPath, StructuralPath};
use crate::types::{SectionPosition, XmlTargetSection};

/// An element recorded while reading the document.
#[derive(Debug, Clone)]
struct ElementNode {
    tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<usize>,
    position: SectionPosition,
    self_closing: bool,
}

/// An immutable snapshot of an XML document.
///
/// # Example
///
/// ```
/// use xfrag::parser::parse_path;
/// use xfrag::{XmlDocument, XmlQuery};
///
/// let doc = XmlDocument::parse(r#"<Forms><Form Name="Main"><Fields/></Form></Forms>"#).unwrap();
/// let found = doc.find(&parse_path("Form/Fields").unwrap());
///
/// assert_eq!(found.len(), 1);
/// assert!(found[0].self_closing);
/// ```
#[derive(Debug, Clone)]
pub struct XmlDocument {
    source: String,
    elements: Vec<ElementNode>,
}

impl XmlDocument {
    /// Parse a document, recording every element with its byte offsets.
    pub fn parse(source: impl Into<String>) -> Result<Self, DocumentError> {
        let source = source.into();
        let elements = read_elements(&source)?;
        debug!(elements = elements.len(), "parsed document");
        Ok(Self { source, elements })
    }

    /// The document text the offsets refer to.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of elements in the document.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// One-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let consumed = &self.source[..offset];
        let line = consumed.chars().filter(|&c| c == '\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(pos) => consumed[pos + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        (line, column)
    }

    /// Build the target section for the element at `index`.
    fn section(&self, index: usize) -> XmlTargetSection {
        let mut lineage = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            lineage.push(&self.elements[i]);
            current = self.elements[i].parent;
        }
        lineage.reverse();

        let mut path_segments = Vec::new();
        let mut display = Vec::with_capacity(lineage.len());
        for node in &lineage {
            path_segments.push(node.tag.clone());
            path_segments.extend(node.attributes.iter().map(|(_, value)| value.clone()));
            let step = match node.attributes.first() {
                Some((key, value)) => PathStep::with_predicate(&node.tag, key, value),
                None => PathStep::new(&node.tag),
            };
            display.push(step.to_string());
        }

        let node = &self.elements[index];
        XmlTargetSection::builder()
            .tag(node.tag.clone())
            .attributes(node.attributes.clone())
            .position(node.position)
            .self_closing(node.self_closing)
            .path_segments(path_segments)
            .display_path(display.join("/"))
            .build()
    }

    /// Returns true if the element at `index` ends a chain of ancestors
    /// matching the path's steps.
    fn matches_path(&self, index: usize, path: &StructuralPath) -> bool {
        let mut current = Some(index);
        for step in path.steps.iter().rev() {
            let Some(i) = current else {
                return false;
            };
            let node = &self.elements[i];
            if !step.matches(&node.tag, &node.attributes) {
                return false;
            }
            current = node.parent;
        }
        !path.anchored || current.is_none()
    }
}

impl XmlQuery for XmlDocument {
    fn find(&self, path: &StructuralPath) -> Vec<XmlTargetSection> {
        let found: Vec<XmlTargetSection> = (0..self.elements.len())
            .filter(|&index| self.matches_path(index, path))
            .map(|index| self.section(index))
            .collect();
        debug!(%path, candidates = found.len(), "structural lookup");
        found
    }

    fn read_attribute(&self, path: &ReadPath) -> Option<String> {
        (0..self.elements.len())
            .filter(|&index| self.matches_path(index, &path.path))
            .find_map(|index| {
                self.elements[index]
                    .attributes
                    .iter()
                    .find(|(key, value)| *key == path.attribute && !value.is_empty())
                    .map(|(_, value)| value.clone())
            })
    }
}

fn to_offset<T>(position: T) -> usize
where
    usize: TryFrom<T>,
{
    usize::try_from(position).unwrap_or(usize::MAX)
}

/// Read all elements with quick-xml, tracking open elements on a stack.
fn read_elements(source: &str) -> Result<Vec<ElementNode>, DocumentError> {
    let mut reader = Reader::from_str(source);
    let mut elements: Vec<ElementNode> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    loop {
        let before = to_offset(reader.buffer_position());
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(DocumentError::Malformed {
                    offset: to_offset(reader.error_position()),
                    message: err.to_string(),
                });
            }
        };
        let after = to_offset(reader.buffer_position());

        match event {
            Event::Start(start) => {
                mark_content(&mut elements, &stack);
                let node = element_node(&start, before, after, stack.last().copied(), false)?;
                elements.push(node);
                stack.push(elements.len() - 1);
            }
            Event::Empty(start) => {
                mark_content(&mut elements, &stack);
                let node = element_node(&start, before, after, stack.last().copied(), true)?;
                elements.push(node);
            }
            Event::End(_) => {
                let index = stack
                    .pop()
                    .ok_or(DocumentError::UnexpectedClose { offset: before })?;
                let position = &mut elements[index].position;
                position.close_tag_start = Some(before);
                position.close_line_start = line_start(source, position.open_tag_end, before);
                position.element_end = after;
            }
            Event::Text(text) => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    mark_content(&mut elements, &stack);
                }
            }
            Event::CData(_) | Event::Comment(_) => mark_content(&mut elements, &stack),
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        let tags = stack.iter().map(|&i| elements[i].tag.clone()).collect();
        return Err(DocumentError::Unclosed { tags });
    }
    if elements.is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(elements)
}

/// Record that the innermost open element has child content.
fn mark_content(elements: &mut [ElementNode], stack: &[usize]) {
    if let Some(&open) = stack.last() {
        elements[open].position.has_child_content = true;
    }
}

/// The start of the line holding `offset`, if that line holds only
/// whitespace before it and begins at or after `floor`.
fn line_start(source: &str, floor: usize, offset: usize) -> Option<usize> {
    let indent = source[..offset]
        .bytes()
        .rev()
        .take_while(|byte| *byte == b' ' || *byte == b'\t')
        .count();
    let start = offset - indent;
    let newline = start.checked_sub(1)?;
    (newline >= floor && source.as_bytes()[newline] == b'\n').then_some(start)
}

fn element_node(
    start: &BytesStart<'_>,
    open_tag_start: usize,
    open_tag_end: usize,
    parent: Option<usize>,
    self_closing: bool,
) -> Result<ElementNode, DocumentError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| DocumentError::Attribute {
            tag: tag.clone(),
            offset: open_tag_start,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| DocumentError::Attribute {
                tag: tag.clone(),
                offset: open_tag_start,
                message: err.to_string(),
            })?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(ElementNode {
        tag,
        attributes,
        parent,
        position: SectionPosition {
            open_tag_start,
            open_tag_end,
            close_tag_start: None,
            close_line_start: None,
            element_end: open_tag_end,
            has_child_content: false,
        },
        self_closing,
    })
}
