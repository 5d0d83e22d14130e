//! Brace-depth scanner for `{$...}` conditional blocks.
//!
//! A block starts at `{$` and ends where the brace depth returns to zero, so
//! branch literals may themselves contain `{$token}` placeholders. Inside the
//! block, the first `?` at depth 1 separates the condition from the branches
//! and the last `:` at depth 1 separates the two branches, which lets quoted
//! literals contain colons.

/// Location of a conditional block within a text. All offsets are bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Offset of the opening `{`.
    pub start: usize,
    /// Offset just past the closing `}`.
    pub end: usize,
    /// Offset of the `?` that ends the condition.
    pub question: usize,
    /// Offset of the `:` that separates the branches.
    pub colon: usize,
}

impl BlockSpan {
    /// The condition text, without the leading `{$`.
    pub fn condition<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start + 2..self.question]
    }

    pub fn when_true<'a>(&self, text: &'a str) -> &'a str {
        &text[self.question + 1..self.colon]
    }

    pub fn when_false<'a>(&self, text: &'a str) -> &'a str {
        &text[self.colon + 1..self.end - 1]
    }
}

/// Result of looking for the next conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScan {
    Found(BlockSpan),
    /// A `{$` whose braces never balance before the end of the text.
    Unterminated { start: usize },
}

/// Find the first conditional block starting at or after byte offset `from`.
///
/// `{$...}` blocks without a depth-1 `?` followed by a depth-1 `:` are plain
/// placeholders and are skipped over.
pub fn next_conditional_block(text: &str, from: usize) -> Option<BlockScan> {
    let mut search = from;
    while let Some(found) = text.get(search..).and_then(|rest| rest.find("{$")) {
        let start = search + found;
        let mut depth = 0_usize;
        let mut question = None;
        let mut colon = None;
        let mut end = None;

        for (offset, c) in text[start..].char_indices() {
            let position = start + offset;
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(position + 1);
                        break;
                    }
                }
                '?' if depth == 1 && question.is_none() => question = Some(position),
                ':' if depth == 1 && question.is_some() => colon = Some(position),
                _ => {}
            }
        }

        let Some(end) = end else {
            return Some(BlockScan::Unterminated { start });
        };
        if let (Some(question), Some(colon)) = (question, colon) {
            return Some(BlockScan::Found(BlockSpan {
                start,
                end,
                question,
                colon,
            }));
        }
        search = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(text: &str) -> BlockSpan {
        match next_conditional_block(text, 0) {
            Some(BlockScan::Found(span)) => span,
            other => panic!("expected a block in {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn splits_condition_and_branches() {
        let text = "a{$type=='Lookup' ? 'LookupList' : ''}b";
        let span = found(text);
        assert_eq!(span.start, 1);
        assert_eq!(&text[span.end..], "b");
        assert_eq!(span.condition(text), "type=='Lookup' ");
        assert_eq!(span.when_true(text), " 'LookupList' ");
        assert_eq!(span.when_false(text), " ''");
    }

    #[test]
    fn nested_placeholders_do_not_end_the_block() {
        let text = "{$'{$type}'=='Lookup' ? '{$label}' : 'none'}";
        let span = found(text);
        assert_eq!(span.end, text.len());
        assert_eq!(span.condition(text), "'{$type}'=='Lookup' ");
        assert_eq!(span.when_true(text), " '{$label}' ");
    }

    #[test]
    fn last_colon_separates_branches() {
        let text = "{$a=='x' ? 'http://host' : 'none'}";
        let span = found(text);
        assert_eq!(span.when_true(text), " 'http://host' ");
        assert_eq!(span.when_false(text), " 'none'");
    }

    #[test]
    fn plain_placeholders_are_skipped() {
        let text = "{$name:friendly} {$flag=='1' ? 'on' : 'off'}";
        let span = found(text);
        assert_eq!(span.start, 17);
    }

    #[test]
    fn unbalanced_block_is_reported() {
        assert_eq!(
            next_conditional_block("x {$a=='b' ? 'c' : 'd'", 0),
            Some(BlockScan::Unterminated { start: 2 })
        );
    }

    #[test]
    fn text_without_blocks_yields_nothing() {
        assert_eq!(next_conditional_block("<Field Name=\"{$label}\"/>", 0), None);
    }
}
