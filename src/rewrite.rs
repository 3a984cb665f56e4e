//! Text splicing at token positions.
//!
//! Source files are never re-printed from the syntax tree. Instead each patched attribute
//! becomes a [`SourceEdit`] on the original text, located through the line/column
//! information of token spans, so formatting and comments elsewhere stay untouched.

use proc_macro2::{LineColumn, Span, TokenStream, TokenTree};
use std::ops::Range;
use syn::Attribute;

/// Maps span positions of a parsed source back to byte offsets.
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            source,
            line_starts,
        }
    }

    /// Byte offset of a 1-based line and a column counted in characters.
    pub fn offset(&self, position: LineColumn) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line.saturating_sub(1)) else {
            return self.source.len();
        };
        let line_end = self
            .line_starts
            .get(position.line)
            .copied()
            .unwrap_or(self.source.len());
        let line = &self.source[line_start..line_end];
        line_start
            + line
                .char_indices()
                .nth(position.column)
                .map(|(i, _)| i)
                .unwrap_or(line.len())
    }

    /// Byte range from the start of `first` to the end of `last`.
    pub fn range(&self, first: Span, last: Span) -> Range<usize> {
        self.offset(first.start())..self.offset(last.end())
    }

    /// Source text from the start of `first` to the end of `last`.
    pub fn slice(&self, first: Span, last: Span) -> &'a str {
        let range = self.range(first, last);
        &self.source[range]
    }

    /// The leading whitespace of the line containing `offset`.
    pub fn indentation(&self, offset: usize) -> &'a str {
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.source[line_start..];
        let width = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..width]
    }

    /// The line terminator of the line containing `offset`, `\n` for the last line.
    pub fn line_ending(&self, offset: usize) -> &'static str {
        match self.source[offset..].find('\n') {
            Some(end) if self.source[..offset + end].ends_with('\r') => "\r\n",
            _ => "\n",
        }
    }

    /// Range of an attribute including the `#` and the brackets.
    pub fn attribute_range(&self, attr: &Attribute) -> Range<usize> {
        self.range(attr.pound_token.spans[0], attr.bracket_token.span.close())
    }

    /// Source text of a token sequence, `None` when it is empty.
    pub fn tokens_text(&self, tokens: &TokenStream) -> Option<&'a str> {
        let mut iter = tokens.clone().into_iter();
        let first = iter.next()?;
        let last = iter.last().unwrap_or_else(|| first.clone());
        Some(self.slice(first.span(), last.span()))
    }
}

/// Replaces `range` of the source with `replacement`; an empty range inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl SourceEdit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }
}

/// The first token of a declaration after its outer attributes and doc comments.
///
/// This is where a new attribute goes: below the documentation, directly above the
/// declaration itself.
pub fn head_span(tokens: TokenStream) -> Option<Span> {
    let mut iter = tokens.into_iter().peekable();
    while let Some(tt) = iter.next() {
        match &tt {
            TokenTree::Punct(p) if p.as_char() == '#' => {
                if matches!(iter.peek(), Some(TokenTree::Punct(bang)) if bang.as_char() == '!') {
                    iter.next();
                }
                if matches!(iter.peek(), Some(TokenTree::Group(_))) {
                    iter.next();
                    continue;
                }
                return Some(tt.span());
            }
            _ => return Some(tt.span()),
        }
    }
    None
}

/// Applies non-overlapping edits, back to front so earlier offsets stay valid.
pub fn apply_edits(source: &str, mut edits: Vec<SourceEdit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut output = source.to_string();
    for edit in edits {
        output.replace_range(edit.range, &edit.replacement);
    }
    output
}
