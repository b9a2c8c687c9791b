//! bibkeep core: document model and text codec
//!
//! This crate provides the in-memory representation of a bibliographic
//! document and the codec that reads and writes it:
//! - `model`: documents, references, string macros, comments and preambles
//! - `codec`: a lossless decoder and a deterministic encoder
//! - `errors`: the structured error facility shared by every bibkeep crate
//! - `logging_facility`: tracing initialisation and lifecycle macros

pub mod codec;
pub mod errors;
pub mod logging_facility;
pub mod model;

// Field keys and event names used by the logging macros
pub use bibkeep_core_types::schema;

pub use codec::{decode, encode, EncodeOptions};
pub use errors::{DecodeError, DecodeErrorReason, ExError, ExErrorKind, HistoryStateError, Result};
pub use model::{Comment, Document, Enclosure, Item, Preamble, Reference, StringMacro};
