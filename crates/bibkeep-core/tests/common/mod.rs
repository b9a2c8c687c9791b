use bibkeep_core::{decode, Document};

/// A small library exercising every item variant
#[allow(dead_code)]
pub const SAMPLE_LIBRARY: &str = r#"Library exported for the reading group

@string{jan = {January}}
@string{acm = "Association for Computing Machinery"}

@preamble{"\newcommand{\noopsort}[1]{}"}

Papers on type systems
@Article{milner78,
  author = {Robin Milner},
  title = {A Theory of Type Polymorphism in Programming},
  journal = {Journal of Computer and System Sciences},
  year = 1978,
  month = jan,
}

@comment{reviewed by "the group" on {Tuesday}}

@inproceedings{wadler89,
  author    = "Philip Wadler",
  title     = "Theorems for {free}!",
  publisher = acm # { Press},
}
see also the errata at errata@example.org
"#;

/// Decode with newline collapsing, panicking on error
#[allow(dead_code)]
pub fn decode_ok(text: &str) -> Document {
    decode(text, true).unwrap_or_else(|e| panic!("decode failed: {e}"))
}
