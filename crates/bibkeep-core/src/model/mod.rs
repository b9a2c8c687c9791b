pub mod document;
pub mod item;

pub use document::{Document, ItemCounts};
pub use item::{Comment, Enclosure, Fields, Item, Preamble, Reference, StringMacro};
