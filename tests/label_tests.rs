//! Text label extraction tests

mod common;

use common::*;
use gdsii_reader::gds::record_type::*;
use gdsii_reader::{
    parse_full, parse_label_columns, parse_labels, GdsError, ParseOptions, TextLabel,
};

fn labels(bytes: &[u8], pattern: Option<&str>) -> Vec<TextLabel> {
    parse_labels(bytes, pattern, &ParseOptions::default()).unwrap()
}

fn strings(labels: &[TextLabel]) -> Vec<&str> {
    labels.iter().map(|l| l.string.as_str()).collect()
}

fn named_labels(names: &[&str]) -> Vec<u8> {
    let mut builder = GdsBuilder::new().library("LIB").begin_structure("TOP");
    for (i, name) in names.iter().enumerate() {
        builder = builder.text(1, 0, (i as i32 * 100, 0), name);
    }
    builder.end_structure().end_library().build()
}

#[test]
fn test_end_to_end_single_label() {
    let bytes = GdsBuilder::new()
        .header()
        .begin_library()
        .units(0.001, 1e-9)
        .begin_structure("TOP")
        .no_data(TEXT)
        .i16s(LAYER, &[5])
        .points(&[(1000, 2000)])
        .i16s(TEXTTYPE, &[0])
        .ascii(STRING, "M1")
        .no_data(ENDEL)
        .end_structure()
        .end_library()
        .build();

    let result = labels(&bytes, Some(""));
    assert_eq!(
        result,
        vec![TextLabel {
            string: "M1".to_string(),
            x: 1.0,
            y: 2.0,
            layer: 5,
            text_type: 0,
        }]
    );
}

#[test]
fn test_identical_labels_are_deduplicated() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .text(5, 0, (1000, 2000), "VDD")
        .text(5, 0, (1000, 2000), "VDD")
        .end_structure()
        .end_library()
        .build();

    assert_eq!(labels(&bytes, None).len(), 1);
}

#[test]
fn test_labels_differing_in_one_field_are_kept() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .text(5, 0, (1000, 2000), "VDD")
        .text(6, 0, (1000, 2000), "VDD")
        .text(5, 1, (1000, 2000), "VDD")
        .text(5, 0, (1000, 2001), "VDD")
        .text(5, 0, (1000, 2000), "VSS")
        .end_structure()
        .end_library()
        .build();

    assert_eq!(labels(&bytes, None).len(), 5);
}

#[test]
fn test_empty_pattern_accepts_all() {
    let bytes = named_labels(&["ALPHA", "BETA", "ABC", "GAMMA_A"]);
    assert_eq!(labels(&bytes, Some("")).len(), 4);
    assert_eq!(labels(&bytes, None).len(), 4);
}

#[test]
fn test_single_char_pattern_matches_first_character() {
    let bytes = named_labels(&["ALPHA", "BETA", "ABC", "GAMMA_A"]);
    assert_eq!(strings(&labels(&bytes, Some("A"))), vec!["ALPHA", "ABC"]);
}

#[test]
fn test_longer_pattern_is_regex_search() {
    let bytes = named_labels(&["ALPHA", "BETA", "ABC", "GAMMA_A"]);
    assert_eq!(strings(&labels(&bytes, Some("ET"))), vec!["BETA"]);
    assert_eq!(strings(&labels(&bytes, Some("^G.*A$"))), vec!["GAMMA_A"]);
    assert_eq!(
        strings(&labels(&bytes, Some("^A(LPHA|BC)$"))),
        vec!["ALPHA", "ABC"]
    );
}

#[test]
fn test_invalid_pattern_is_reported() {
    let bytes = named_labels(&["ALPHA"]);
    let result = parse_labels(&bytes[..], Some("(("), &ParseOptions::default());
    assert!(matches!(result, Err(GdsError::InvalidPattern(_))));
}

#[test]
fn test_labels_from_all_structures() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("A")
        .text(1, 0, (0, 0), "IN")
        .end_structure()
        .begin_structure("B")
        .boundary(2, &SQUARE_CCW)
        .text(1, 0, (0, 0), "OUT")
        .end_structure()
        .end_library()
        .build();

    assert_eq!(strings(&labels(&bytes, None)), vec!["IN", "OUT"]);
}

#[test]
fn test_string_outside_text_is_ignored() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .ascii(STRING, "STRAY")
        .text(1, 0, (0, 0), "REAL")
        .end_structure()
        .end_library()
        .build();

    assert_eq!(strings(&labels(&bytes, None)), vec!["REAL"]);
}

#[test]
fn test_second_string_in_text_is_ignored() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .no_data(TEXT)
        .i16s(LAYER, &[1])
        .points(&[(0, 0)])
        .ascii(STRING, "FIRST")
        .ascii(STRING, "SECOND")
        .no_data(ENDEL)
        .end_structure()
        .end_library()
        .build();

    assert_eq!(strings(&labels(&bytes, None)), vec!["FIRST"]);
}

#[test]
fn test_attributes_reset_between_texts() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .text(7, 3, (500, 500), "FIRST")
        .no_data(TEXT)
        .ascii(STRING, "BARE")
        .no_data(ENDEL)
        .end_structure()
        .end_library()
        .build();

    let result = labels(&bytes, None);
    assert_eq!(result[1].string, "BARE");
    assert_eq!((result[1].layer, result[1].text_type), (0, 0));
    assert_eq!((result[1].x, result[1].y), (0.0, 0.0));
}

#[test]
fn test_stream_may_end_after_structures_close() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .text(1, 0, (0, 0), "PAD")
        .end_structure()
        .build();

    assert_eq!(strings(&labels(&bytes, None)), vec!["PAD"]);
    assert!(matches!(
        parse_full(&bytes[..], &ParseOptions::default()),
        Err(GdsError::TruncatedStream { .. })
    ));
}

#[test]
fn test_stream_ending_inside_structure_is_truncated() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .text(1, 0, (0, 0), "PAD")
        .build();

    let result = parse_labels(&bytes[..], None, &ParseOptions::default());
    assert!(matches!(result, Err(GdsError::TruncatedStream { .. })), "{result:?}");
}

#[test]
fn test_empty_stream_is_truncated() {
    let result = parse_labels(std::io::empty(), None, &ParseOptions::default());
    assert!(matches!(result, Err(GdsError::TruncatedStream { offset: 0, .. })), "{result:?}");
}

#[test]
fn test_stream_with_only_header_is_truncated() {
    let bytes = GdsBuilder::new().header().build();
    let result = parse_labels(&bytes[..], None, &ParseOptions::default());
    assert!(matches!(result, Err(GdsError::TruncatedStream { offset: 6, .. })), "{result:?}");
}

#[test]
fn test_malformed_record_yields_no_labels() {
    let bytes = GdsBuilder::new()
        .library("LIB")
        .begin_structure("TOP")
        .text(1, 0, (0, 0), "PAD")
        .record(ENDSTR, NO_DATA, &[0, 0])
        .end_library()
        .build();

    let result = parse_labels(&bytes[..], None, &ParseOptions::default());
    assert!(matches!(result, Err(GdsError::Protocol { .. })), "{result:?}");
}

#[test]
fn test_columns_have_equal_length() {
    let bytes = named_labels(&["A1", "A2", "B1"]);
    let columns = parse_label_columns(&bytes[..], Some("A"), &ParseOptions::default()).unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns.strings(), &["A1".to_string(), "A2".to_string()]);
    assert_eq!(columns.xs(), &[0.0, 0.1]);
    assert_eq!(columns.ys().len(), 2);
    assert_eq!(columns.layers(), &[1, 1]);
    assert_eq!(columns.text_types(), &[0, 0]);
}
