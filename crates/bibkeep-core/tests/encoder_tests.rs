mod common;

use bibkeep_core::codec::default_alignment;
use bibkeep_core::model::{Comment, Document, Enclosure, Item, Preamble, Reference, StringMacro};
use bibkeep_core::{decode, encode, EncodeOptions};
use common::{decode_ok, SAMPLE_LIBRARY};

fn sample_document() -> Document {
    let mut doc = Document::new("refs.bib");
    doc.push(StringMacro::new("jan", "January", Enclosure::Braces));
    doc.push(StringMacro::new("acm", "ACM", Enclosure::Quotes));
    doc.push(
        Reference::new("article", "k1")
            .with_field("title", "{Hello}")
            .with_field("author", "{A and B}")
            .with_leading_comment("Key papers"),
    );
    doc
}

#[test]
fn test_encode_reference_and_macros_layout() {
    let text = encode(&sample_document(), &EncodeOptions::default());

    // Default alignment: max(len("author") + 3, len("jan") + 9) = 12
    let expected = "\
@string{jan = {January}}
@string{acm = \"ACM\"}

Key papers
@article{k1,
  title     = {Hello},
  author    = {A and B},
}
";
    assert_eq!(text, expected);
}

#[test]
fn test_default_alignment() {
    assert_eq!(default_alignment(&sample_document()), 12);
    assert_eq!(default_alignment(&Document::default()), 0);

    let mut doc = Document::default();
    doc.push(StringMacro::new("longabbrev", "x", Enclosure::Braces));
    assert_eq!(default_alignment(&doc), 19);
}

#[test]
fn test_explicit_alignment_and_minimum_padding() {
    let mut doc = Document::default();
    doc.push(Reference::new("misc", "m").with_field("howpublished", "{web}"));

    let text = encode(&doc, &EncodeOptions::default().with_align_column(4));
    assert!(text.contains("  howpublished = {web},\n"));

    let text = encode(&doc, &EncodeOptions::default().with_align_column(20));
    assert!(text.contains("  howpublished      = {web},\n"));
}

#[test]
fn test_encode_comment_preamble_and_trailing() {
    let mut doc = Document::default();
    doc.push(Item::Preamble(Preamble {
        text: "\"\\def\\x{}\"".to_string(),
        leading_comment: None,
    }));
    doc.push(Item::Comment(Comment {
        text: " free {form} ".to_string(),
        leading_comment: Some("about".to_string()),
    }));
    doc.push(Item::RawTrailing("left over".to_string()));

    let text = encode(&doc, &EncodeOptions::default());
    assert_eq!(
        text,
        "@preamble{\"\\def\\x{}\"}\n\nabout\n@comment{ free {form} }\n\nleft over\n"
    );
}

#[test]
fn test_encode_is_deterministic() {
    let doc = decode_ok(SAMPLE_LIBRARY);
    let options = EncodeOptions::default().with_max_line_length(40);
    assert_eq!(encode(&doc, &options), encode(&doc, &options));
}

#[test]
fn test_long_values_wrap_at_alignment_column() {
    let mut doc = Document::default();
    doc.push(
        Reference::new("book", "b")
            .with_field("title", "{one two three four five six}"),
    );

    let options = EncodeOptions::default().with_max_line_length(24);
    let text = encode(&doc, &options);

    // Given align = 8, the value starts at column 10
    assert_eq!(
        text,
        "@book{b,\n  title = {one two three\n        four five six},\n}\n"
    );
    for line in text.lines() {
        assert!(line.chars().count() <= 24, "line too long: {line:?}");
    }

    // And the wrapped value decodes back to the same field
    let back = decode(&text, true).unwrap();
    assert_eq!(back.items, doc.items);
}

#[test]
fn test_no_wrapping_without_collapse() {
    let mut doc = Document::default();
    doc.push(Reference::new("book", "b").with_field("title", "{one two three four five six}"));

    let options = EncodeOptions::default()
        .with_max_line_length(10)
        .with_collapse_newlines(false);
    let text = encode(&doc, &options);
    assert!(text.contains("  title = {one two three four five six},\n"));
}

#[test]
fn test_sample_library_reencodes_to_equal_document() {
    let first = decode_ok(SAMPLE_LIBRARY);
    let text = encode(&first, &EncodeOptions::default());
    let second = decode_ok(&text);
    assert!(first.same_content(&second));
}

#[test]
fn test_multiline_values_round_trip_without_collapse() {
    let text = "@book{b,\n  abstract = {first line\n    second line},\n}\n";
    let first = decode(text, false).unwrap();
    let encoded = encode(&first, &EncodeOptions::default().with_collapse_newlines(false));
    let second = decode(&encoded, false).unwrap();
    assert_eq!(first, second);
}
