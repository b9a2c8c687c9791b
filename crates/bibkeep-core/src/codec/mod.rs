//! Text codec for bibliographic documents
//!
//! [`decode`] and [`encode`] satisfy the round-trip law: for any text that
//! decodes, `decode(encode(decode(text)))` equals `decode(text)` when both
//! decodes use the same `collapse_newlines` flag as the encoder.

pub mod decoder;
pub mod encoder;

pub use decoder::decode;
pub use encoder::{default_alignment, encode, EncodeOptions};
