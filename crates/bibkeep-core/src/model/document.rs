use std::path::{Path, PathBuf};

use super::item::{Item, Reference, StringMacro};

/// An ordered sequence of items read from (or destined for) one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Source path; empty for documents decoded from bare text
    pub path: PathBuf,
    pub items: Vec<Item>,
}

/// Number of items of each variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub references: usize,
    pub string_macros: usize,
    pub comments: usize,
    pub preambles: usize,
    pub raw_trailing: usize,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(path: impl Into<PathBuf>, items: Vec<Item>) -> Self {
        Self {
            path: path.into(),
            items,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the source path, used to key history
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Structural equality of content, ignoring where the document lives
    pub fn same_content(&self, other: &Document) -> bool {
        self.items == other.items
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.items.push(item.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.items.iter().filter_map(Item::as_reference)
    }

    pub fn references_mut(&mut self) -> impl Iterator<Item = &mut Reference> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Reference(r) => Some(r),
            _ => None,
        })
    }

    pub fn string_macros(&self) -> impl Iterator<Item = &StringMacro> {
        self.items.iter().filter_map(|item| match item {
            Item::StringMacro(s) => Some(s),
            _ => None,
        })
    }

    /// First reference with the given citation key
    pub fn reference(&self, cite_key: &str) -> Option<&Reference> {
        self.references().find(|r| r.cite_key == cite_key)
    }

    pub fn reference_mut(&mut self, cite_key: &str) -> Option<&mut Reference> {
        self.references_mut().find(|r| r.cite_key == cite_key)
    }

    pub fn cite_keys(&self) -> Vec<&str> {
        self.references().map(|r| r.cite_key.as_str()).collect()
    }

    pub fn counts(&self) -> ItemCounts {
        let mut counts = ItemCounts::default();
        for item in &self.items {
            match item {
                Item::Reference(_) => counts.references += 1,
                Item::StringMacro(_) => counts.string_macros += 1,
                Item::Comment(_) => counts.comments += 1,
                Item::Preamble(_) => counts.preambles += 1,
                Item::RawTrailing(_) => counts.raw_trailing += 1,
            }
        }
        counts
    }
}
