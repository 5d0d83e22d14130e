//! Planning and applying text insertions.

use std::cmp::Reverse;
use std::slice;

use crate::types::XmlTargetSection;

/// Text to insert at a byte offset of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub offset: usize,
    pub text: String,
}

impl Insertion {
    /// Plan inserting `content` into `target`.
    ///
    /// - self-closing target: after the element, as `\n` + content
    /// - open target with children: before the close tag, as content + `\n`
    /// - empty open target: before the close tag, as `\n` + content + `\n`
    ///
    /// When the close tag sits on its own line, the insertion goes to the
    /// start of that line instead, so `content` keeps its own indentation and
    /// the close tag keeps its. The line break in front of that line already
    /// stands in for the leading `\n`.
    pub fn plan(target: &XmlTargetSection, content: &str) -> Self {
        let position = &target.position;
        match position.close_tag_start {
            Some(_) if target.self_closing => Self::after_element(target, content),
            Some(close) => match position.close_line_start {
                Some(line_start) => Self {
                    offset: line_start,
                    text: format!("{content}\n"),
                },
                None if position.has_child_content => Self {
                    offset: close,
                    text: format!("{content}\n"),
                },
                None => Self {
                    offset: close,
                    text: format!("\n{content}\n"),
                },
            },
            None => Self::after_element(target, content),
        }
    }

    fn after_element(target: &XmlTargetSection, content: &str) -> Self {
        Self {
            offset: target.position.element_end,
            text: format!("\n{content}"),
        }
    }

    /// The text with this insertion applied.
    pub fn apply(&self, source: &str) -> String {
        apply_all(source, slice::from_ref(self))
    }

    /// One-based line and column of the insertion point in `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let offset = self.offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit_once('\n')
            .map_or(before, |(_, tail)| tail)
            .chars()
            .count()
            + 1;
        (line, column)
    }
}

/// Apply several insertions planned against the same text. Insertions at the
/// same offset keep their order.
pub fn apply_all(source: &str, insertions: &[Insertion]) -> String {
    let mut ordered: Vec<(usize, &Insertion)> = insertions.iter().enumerate().collect();
    ordered.sort_by_key(|(index, insertion)| (Reverse(insertion.offset), Reverse(*index)));

    let mut text = source.to_string();
    for (_, insertion) in ordered {
        let offset = insertion.offset.min(text.len());
        text.insert_str(offset, &insertion.text);
    }
    text
}
