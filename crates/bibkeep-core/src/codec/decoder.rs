//! Single-pass decoder from bibliographic text to [`Document`]
//!
//! The decoder never interprets field values: enclosures, nested braces,
//! escapes and concatenations are stored exactly as written so the encoder
//! can reproduce them.

use std::mem;

use crate::errors::{DecodeError, DecodeErrorReason};
use crate::model::{Comment, Document, Enclosure, Fields, Item, Preamble, Reference, StringMacro};

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Decode bibliographic text into a document with an empty path
///
/// With `collapse_newlines` set, every raw newline inside a value or item
/// body becomes a single space, absorbing the horizontal whitespace around it.
///
/// # Errors
///
/// Returns a [`DecodeError`] with the 1-based position where decoding failed.
pub fn decode(text: &str, collapse_newlines: bool) -> DecodeResult<Document> {
    let mut decoder = Decoder::new(collapse_newlines);
    for c in text.chars() {
        decoder.feed(c)?;
    }
    let items = decoder.finish()?;
    tracing::debug!(item_count = items.len(), "decoded document");
    Ok(Document::with_items("", items))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Free text between items
    Idle,
    /// After `@`, collecting the entry kind
    ReadingKind,
    /// Entry body before the first `,` or `=`
    ReadingKey,
    ReadingFieldKey,
    /// Value or body text at brace depth zero
    ReadingValue,
    /// Inside a quoted string; `depth` counts braces opened within it
    InQuotes { depth: usize },
    InBraces { depth: usize },
}

/// Items whose body is kept as one piece of text instead of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawBody {
    StringMacro,
    Comment,
    Preamble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Entry,
    Raw(RawBody),
}

impl BodyKind {
    fn from_kind(kind: &str) -> Self {
        match kind {
            "string" => BodyKind::Raw(RawBody::StringMacro),
            "comment" => BodyKind::Raw(RawBody::Comment),
            "preamble" => BodyKind::Raw(RawBody::Preamble),
            _ => BodyKind::Entry,
        }
    }

    fn honours_quotes(self) -> bool {
        self != BodyKind::Raw(RawBody::Comment)
    }
}

fn is_kind_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn trimmed_or_none(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

struct Decoder {
    collapse_newlines: bool,
    state: State,
    items: Vec<Item>,

    /// Free text since the last closed item
    pending: String,
    /// Kind token and everything scanned after `@`, restored on abandonment
    kind: String,
    kind_scan: String,
    kind_finished: bool,

    body_kind: BodyKind,
    entry_kind: String,
    leading_comment: Option<String>,
    cite_key: String,
    field_name: String,
    fields: Fields,
    buffer: String,

    escape_next: bool,
    newline_pending: bool,

    /// Position of the character being processed
    line: usize,
    column: usize,
    /// Position of the next character
    next_line: usize,
    next_column: usize,
}

impl Decoder {
    fn new(collapse_newlines: bool) -> Self {
        Self {
            collapse_newlines,
            state: State::Idle,
            items: Vec::new(),
            pending: String::new(),
            kind: String::new(),
            kind_scan: String::new(),
            kind_finished: false,
            body_kind: BodyKind::Entry,
            entry_kind: String::new(),
            leading_comment: None,
            cite_key: String::new(),
            field_name: String::new(),
            fields: Fields::new(),
            buffer: String::new(),
            escape_next: false,
            newline_pending: false,
            line: 1,
            column: 1,
            next_line: 1,
            next_column: 1,
        }
    }

    fn error(&self, reason: DecodeErrorReason) -> DecodeError {
        DecodeError {
            reason,
            line: self.line,
            column: self.column,
        }
    }

    fn feed(&mut self, c: char) -> DecodeResult<()> {
        self.line = self.next_line;
        self.column = self.next_column;
        if c == '\n' {
            self.next_line += 1;
            self.next_column = 1;
        } else {
            self.next_column += 1;
        }

        if self.escape_next {
            self.escape_next = false;
            self.buffer.push(c);
            return Ok(());
        }

        if self.collapse_newlines && self.in_value() && self.collapse(c) {
            return Ok(());
        }

        self.step(c)
    }

    fn in_value(&self) -> bool {
        matches!(
            self.state,
            State::ReadingValue | State::InQuotes { .. } | State::InBraces { .. }
        )
    }

    /// Newline folding; returns true when `c` was absorbed
    fn collapse(&mut self, c: char) -> bool {
        if c == '\n' {
            let kept = self.buffer.trim_end_matches([' ', '\t', '\r']).len();
            self.buffer.truncate(kept);
            self.newline_pending = true;
            return true;
        }
        if self.newline_pending {
            if matches!(c, ' ' | '\t' | '\r') {
                return true;
            }
            self.newline_pending = false;
            self.buffer.push(' ');
        }
        false
    }

    fn step(&mut self, c: char) -> DecodeResult<()> {
        match self.state {
            State::Idle => {
                self.idle(c);
                Ok(())
            }
            State::ReadingKind => {
                self.reading_kind(c);
                Ok(())
            }
            State::ReadingKey => self.reading_key(c),
            State::ReadingFieldKey => self.reading_field_key(c),
            State::ReadingValue => self.reading_value(c),
            State::InQuotes { depth } => self.in_quotes(c, depth),
            State::InBraces { depth } => {
                self.in_braces(c, depth);
                Ok(())
            }
        }
    }

    fn idle(&mut self, c: char) {
        if c == '@' {
            self.kind.clear();
            self.kind_scan.clear();
            self.kind_finished = false;
            self.state = State::ReadingKind;
        } else {
            self.pending.push(c);
        }
    }

    fn reading_kind(&mut self, c: char) {
        if c == '{' && !self.kind.is_empty() {
            self.open_body();
            return;
        }
        if c.is_whitespace() && !self.kind.is_empty() {
            self.kind_finished = true;
            self.kind_scan.push(c);
            return;
        }
        if !self.kind_finished && is_kind_char(c) {
            self.kind.push(c);
            self.kind_scan.push(c);
            return;
        }
        self.abandon_kind();
        self.idle(c);
    }

    /// Not an item after all: the `@` and what followed it are free text
    fn abandon_kind(&mut self) {
        self.pending.push('@');
        self.pending.push_str(&self.kind_scan);
        self.kind_scan.clear();
        self.kind.clear();
        self.state = State::Idle;
    }

    fn open_body(&mut self) {
        self.entry_kind = self.kind.to_ascii_lowercase();
        self.body_kind = BodyKind::from_kind(&self.entry_kind);
        self.leading_comment = trimmed_or_none(&self.pending);
        self.pending.clear();
        self.cite_key.clear();
        self.field_name.clear();
        self.fields.clear();
        self.buffer.clear();
        self.newline_pending = false;
        self.state = match self.body_kind {
            BodyKind::Entry => State::ReadingKey,
            BodyKind::Raw(_) => State::ReadingValue,
        };
    }

    fn reading_key(&mut self, c: char) -> DecodeResult<()> {
        match c {
            ',' => {
                self.cite_key = mem::take(&mut self.buffer).trim().to_string();
                self.state = State::ReadingFieldKey;
            }
            '=' => {
                // No cite key: the token is the first field name.
                self.cite_key.clear();
                self.start_value()?;
            }
            '}' => {
                self.cite_key = mem::take(&mut self.buffer).trim().to_string();
                self.close_entry();
            }
            _ => self.buffer.push(c),
        }
        Ok(())
    }

    fn reading_field_key(&mut self, c: char) -> DecodeResult<()> {
        match c {
            '=' => self.start_value()?,
            ',' | '}' => {
                let name = self.buffer.trim();
                if !name.is_empty() {
                    return Err(self.error(DecodeErrorReason::FieldWithoutValue {
                        cite_key: self.cite_key.clone(),
                        field: name.to_string(),
                    }));
                }
                self.buffer.clear();
                if c == '}' {
                    self.close_entry();
                }
            }
            _ => self.buffer.push(c),
        }
        Ok(())
    }

    fn start_value(&mut self) -> DecodeResult<()> {
        let name = mem::take(&mut self.buffer).trim().to_string();
        if name.is_empty() {
            return Err(self.error(DecodeErrorReason::EmptyFieldName {
                cite_key: self.cite_key.clone(),
            }));
        }
        self.field_name = name;
        self.newline_pending = false;
        self.state = State::ReadingValue;
        Ok(())
    }

    fn reading_value(&mut self, c: char) -> DecodeResult<()> {
        match c {
            '"' if self.body_kind.honours_quotes() => {
                self.buffer.push(c);
                self.state = State::InQuotes { depth: 0 };
            }
            '{' => {
                self.buffer.push(c);
                self.state = State::InBraces { depth: 1 };
            }
            ',' if self.body_kind == BodyKind::Entry => {
                self.finish_field()?;
                self.state = State::ReadingFieldKey;
            }
            '}' => match self.body_kind {
                BodyKind::Entry => {
                    self.finish_field()?;
                    self.close_entry();
                }
                BodyKind::Raw(raw) => self.close_body(raw)?,
            },
            _ => self.buffer.push(c),
        }
        Ok(())
    }

    fn in_quotes(&mut self, c: char, depth: usize) -> DecodeResult<()> {
        match c {
            '\\' => {
                self.buffer.push(c);
                self.escape_next = true;
            }
            '{' => {
                self.buffer.push(c);
                self.state = State::InQuotes { depth: depth + 1 };
            }
            '}' => {
                if depth == 0 {
                    return Err(self.error(DecodeErrorReason::UnmatchedClosingBrace));
                }
                self.buffer.push(c);
                self.state = State::InQuotes { depth: depth - 1 };
            }
            '"' if depth == 0 => {
                self.buffer.push(c);
                self.state = State::ReadingValue;
            }
            _ => self.buffer.push(c),
        }
        Ok(())
    }

    fn in_braces(&mut self, c: char, depth: usize) {
        self.buffer.push(c);
        match c {
            '{' => self.state = State::InBraces { depth: depth + 1 },
            '}' if depth == 1 => self.state = State::ReadingValue,
            '}' => self.state = State::InBraces { depth: depth - 1 },
            _ => {}
        }
    }

    fn finish_field(&mut self) -> DecodeResult<()> {
        let value = mem::take(&mut self.buffer).trim().to_string();
        let name = mem::take(&mut self.field_name);
        self.newline_pending = false;
        // Field names compare case-insensitively; the first spelling is kept.
        let existing = self
            .fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
            .map(|(_, existing)| existing == &value);
        match existing {
            Some(true) => Ok(()),
            Some(false) => Err(self.error(DecodeErrorReason::DuplicateField {
                cite_key: self.cite_key.clone(),
                field: name,
            })),
            None => {
                self.fields.insert(name, value);
                Ok(())
            }
        }
    }

    fn close_entry(&mut self) {
        let reference = Reference {
            entry_kind: mem::take(&mut self.entry_kind),
            cite_key: mem::take(&mut self.cite_key),
            fields: mem::take(&mut self.fields),
            leading_comment: self.leading_comment.take(),
        };
        self.items.push(Item::Reference(reference));
        self.state = State::Idle;
    }

    fn close_body(&mut self, raw: RawBody) -> DecodeResult<()> {
        let body = mem::take(&mut self.buffer);
        let leading_comment = self.leading_comment.take();
        self.newline_pending = false;
        let item = match raw {
            RawBody::Comment => Item::Comment(Comment {
                text: body,
                leading_comment,
            }),
            RawBody::Preamble => Item::Preamble(Preamble {
                text: body,
                leading_comment,
            }),
            RawBody::StringMacro => {
                let mut string_macro = self.parse_string_body(&body)?;
                string_macro.leading_comment = leading_comment;
                Item::StringMacro(string_macro)
            }
        };
        self.items.push(item);
        self.state = State::Idle;
        Ok(())
    }

    fn parse_string_body(&self, body: &str) -> DecodeResult<StringMacro> {
        let Some((abbreviation, rhs)) = body.split_once('=') else {
            return Err(self.error(DecodeErrorReason::MissingStringAssignment));
        };
        let abbreviation = abbreviation.trim();
        let rhs = rhs.trim();
        let last = rhs.len().saturating_sub(1);

        let enclosure = if rhs.starts_with('{') && closing_brace(rhs) == Some(last) {
            Some(Enclosure::Braces)
        } else if rhs.starts_with('"') && closing_quote(rhs) == Some(last) {
            Some(Enclosure::Quotes)
        } else {
            None
        };

        match enclosure {
            Some(enclosure) => Ok(StringMacro::new(abbreviation, &rhs[1..last], enclosure)),
            None => Err(self.error(DecodeErrorReason::InconsistentStringEnclosure {
                abbreviation: abbreviation.to_string(),
            })),
        }
    }

    fn finish(mut self) -> DecodeResult<Vec<Item>> {
        self.line = self.next_line;
        self.column = self.next_column;
        match self.state {
            State::Idle => {}
            State::ReadingKind => self.abandon_kind(),
            State::InQuotes { .. } => {
                return Err(self.error(DecodeErrorReason::UnterminatedQuote));
            }
            _ => return Err(self.error(DecodeErrorReason::UnterminatedBrace)),
        }
        if let Some(trailing) = trimmed_or_none(&self.pending) {
            self.items.push(Item::RawTrailing(trailing));
        }
        Ok(self.items)
    }
}

/// Byte index of the brace closing the one at index 0
fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the quote closing the one at index 0
fn closing_quote(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
