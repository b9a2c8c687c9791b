//! Deterministic encoder from [`Document`] to bibliographic text

use crate::model::{Document, Item, Reference, StringMacro};

const FIELD_INDENT: &str = "  ";
const STRING_OPEN: &str = "@string{";

/// Layout options for [`encode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Column of the `=` sign; computed from the document when `None`
    pub align_column: Option<usize>,
    /// Field lines longer than this wrap onto continuation lines
    pub max_line_length: Option<usize>,
    /// Must match the flag the output will be decoded with
    pub collapse_newlines: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            align_column: None,
            max_line_length: None,
            collapse_newlines: true,
        }
    }
}

impl EncodeOptions {
    pub fn with_align_column(mut self, column: usize) -> Self {
        self.align_column = Some(column);
        self
    }

    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = Some(length);
        self
    }

    pub fn with_collapse_newlines(mut self, collapse: bool) -> Self {
        self.collapse_newlines = collapse;
        self
    }

    /// Wrapped lines only decode back to the same value when newlines collapse
    fn wrap_width(&self) -> Option<usize> {
        self.max_line_length.filter(|_| self.collapse_newlines)
    }
}

/// Alignment column that lines up every `=` in the document
pub fn default_alignment(document: &Document) -> usize {
    document
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Reference(r) => r.fields.keys().map(|name| char_len(name) + 3).max(),
            Item::StringMacro(s) => Some(char_len(&s.abbreviation) + 9),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Encode a document to text
///
/// Items are written in document order, separated by one blank line except
/// between consecutive string macros. The same document and options always
/// produce the same text.
pub fn encode(document: &Document, options: &EncodeOptions) -> String {
    let align = options
        .align_column
        .unwrap_or_else(|| default_alignment(document));
    let mut out = String::new();
    let mut previous: Option<&Item> = None;

    for item in &document.items {
        if let Some(prev) = previous {
            let both_macros =
                matches!(prev, Item::StringMacro(_)) && matches!(item, Item::StringMacro(_));
            if !both_macros {
                out.push('\n');
            }
        }
        if let Some(comment) = item.leading_comment() {
            out.push_str(comment);
            out.push('\n');
        }
        match item {
            Item::Reference(reference) => encode_reference(&mut out, reference, align, options),
            Item::StringMacro(string_macro) => encode_string_macro(&mut out, string_macro, align),
            Item::Comment(comment) => {
                out.push_str("@comment{");
                out.push_str(&comment.text);
                out.push_str("}\n");
            }
            Item::Preamble(preamble) => {
                out.push_str("@preamble{");
                out.push_str(&preamble.text);
                out.push_str("}\n");
            }
            Item::RawTrailing(text) => {
                out.push_str(text);
                out.push('\n');
            }
        }
        previous = Some(item);
    }

    tracing::debug!(item_count = document.items.len(), align, "encoded document");
    out
}

fn encode_reference(out: &mut String, reference: &Reference, align: usize, options: &EncodeOptions) {
    out.push('@');
    out.push_str(&reference.entry_kind);
    out.push('{');
    out.push_str(&reference.cite_key);
    out.push_str(",\n");

    for (name, value) in &reference.fields {
        let start = char_len(FIELD_INDENT) + char_len(name);
        let pad = padding(align, start);
        out.push_str(FIELD_INDENT);
        out.push_str(name);
        push_spaces(out, pad);
        out.push_str("= ");
        match options.wrap_width() {
            Some(width) => push_wrapped(out, value, start + pad + 2, align, width),
            None => out.push_str(value),
        }
        out.push_str(",\n");
    }
    out.push_str("}\n");
}

fn encode_string_macro(out: &mut String, string_macro: &StringMacro, align: usize) {
    let start = char_len(STRING_OPEN) + char_len(&string_macro.abbreviation);
    out.push_str(STRING_OPEN);
    out.push_str(&string_macro.abbreviation);
    push_spaces(out, padding(align, start));
    out.push_str("= ");
    out.push(string_macro.enclosure.open());
    out.push_str(&string_macro.expansion);
    out.push(string_macro.enclosure.close());
    out.push_str("}\n");
}

/// Greedy wrap of a field value; the trailing `,` counts toward the last line
fn push_wrapped(out: &mut String, value: &str, first_column: usize, indent: usize, width: usize) {
    let segments = break_segments(value);
    let last = segments.len().saturating_sub(1);
    let mut column = first_column;

    for (i, segment) in segments.iter().enumerate() {
        let mut len = char_len(segment);
        if i == last {
            len += 1;
        }
        if i > 0 {
            if column + 1 + len > width {
                out.push('\n');
                push_spaces(out, indent);
                column = indent;
            } else {
                out.push(' ');
                column += 1;
            }
        }
        out.push_str(segment);
        column += char_len(segment);
    }
}

/// Split at single spaces that have non-whitespace on both sides
///
/// Only such spaces fold back to the same text when the newline that
/// replaces them is collapsed again on decode.
fn break_segments(value: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = value.char_indices().collect();
    let mut segments = Vec::new();
    let mut start = 0;

    for window in chars.windows(3) {
        let [(_, before), (at, c), (_, after)] = [window[0], window[1], window[2]];
        let breakable = c == ' '
            && !before.is_whitespace()
            && before != '\\'
            && !after.is_whitespace();
        if breakable {
            segments.push(&value[start..at]);
            start = at + 1;
        }
    }
    segments.push(&value[start..]);
    segments
}

fn padding(align: usize, start: usize) -> usize {
    align.saturating_sub(start).max(1)
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
