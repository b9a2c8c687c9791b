use indexmap::IndexMap;

/// Field name to raw field value, in source order
pub type Fields = IndexMap<String, String>;

/// A bibliographic entry such as `@article{key, ...}`
///
/// Field values are kept raw: enclosing braces or quotes, nested braces,
/// escapes and `#` concatenations are stored exactly as written.
#[derive(Debug, Clone, Eq)]
pub struct Reference {
    /// Lowercased entry type (`article`, `book`, ...)
    pub entry_kind: String,
    /// Citation key; empty when the entry was written without one
    pub cite_key: String,
    pub fields: Fields,
    /// Free text found between the previous item and this one
    pub leading_comment: Option<String>,
}

impl Reference {
    pub fn new(entry_kind: impl Into<String>, cite_key: impl Into<String>) -> Self {
        Self {
            entry_kind: entry_kind.into(),
            cite_key: cite_key.into(),
            fields: Fields::new(),
            leading_comment: None,
        }
    }

    /// Builder-style field insertion, mainly for tests and collaborators
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_leading_comment(mut self, comment: impl Into<String>) -> Self {
        self.leading_comment = Some(comment.into());
        self
    }

    /// Raw value of a field, enclosure included
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field, keeping its position if it already exists
    ///
    /// Returns the previous raw value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field, preserving the order of the remaining ones
    pub fn remove_field(&mut self, name: &str) -> Option<String> {
        self.fields.shift_remove(name)
    }
}

// Field order is part of the document: reordering fields is a content change.
impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.entry_kind == other.entry_kind
            && self.cite_key == other.cite_key
            && self.leading_comment == other.leading_comment
            && self.fields.len() == other.fields.len()
            && self.fields.iter().eq(other.fields.iter())
    }
}

/// Delimiters around a string macro expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enclosure {
    Braces,
    Quotes,
}

impl Enclosure {
    pub fn open(self) -> char {
        match self {
            Enclosure::Braces => '{',
            Enclosure::Quotes => '"',
        }
    }

    pub fn close(self) -> char {
        match self {
            Enclosure::Braces => '}',
            Enclosure::Quotes => '"',
        }
    }
}

/// `@string{abbrev = {expansion}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringMacro {
    pub abbreviation: String,
    /// Expansion without its enclosing delimiters
    pub expansion: String,
    pub enclosure: Enclosure,
    pub leading_comment: Option<String>,
}

impl StringMacro {
    pub fn new(
        abbreviation: impl Into<String>,
        expansion: impl Into<String>,
        enclosure: Enclosure,
    ) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            expansion: expansion.into(),
            enclosure,
            leading_comment: None,
        }
    }
}

/// `@comment{...}` with its body kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub leading_comment: Option<String>,
}

/// `@preamble{...}` with its body kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub text: String,
    pub leading_comment: Option<String>,
}

/// One top-level element of a bibliographic document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Reference(Reference),
    StringMacro(StringMacro),
    Comment(Comment),
    Preamble(Preamble),
    /// Text after the last closed item that belongs to no item
    RawTrailing(String),
}

impl Item {
    pub fn leading_comment(&self) -> Option<&str> {
        match self {
            Item::Reference(r) => r.leading_comment.as_deref(),
            Item::StringMacro(s) => s.leading_comment.as_deref(),
            Item::Comment(c) => c.leading_comment.as_deref(),
            Item::Preamble(p) => p.leading_comment.as_deref(),
            Item::RawTrailing(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Item::Reference(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Reference> for Item {
    fn from(reference: Reference) -> Self {
        Item::Reference(reference)
    }
}

impl From<StringMacro> for Item {
    fn from(string_macro: StringMacro) -> Self {
        Item::StringMacro(string_macro)
    }
}
