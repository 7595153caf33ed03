//! Integration tests covering encode/decode round trips through the matrix
//! representation for both symbologies.
//!
//! These exercise the full codeword pipeline: encodation, error correction,
//! symbol layout, and the matching decode path.

use matrixcode::{datamatrix, pdf417};

fn datamatrix_roundtrip(text: &str) {
    let matrix = datamatrix::encode(text, datamatrix::EncodingMode::Auto)
        .expect("encoding should succeed");
    let decoded = datamatrix::decode(&matrix).expect("decoding should succeed");
    assert_eq!(decoded, text);
}

fn pdf417_roundtrip(text: &str, options: &pdf417::EncodeOptions) {
    let matrix = pdf417::encode(text, options).expect("encoding should succeed");
    let decoded = pdf417::decode(&matrix).expect("decoding should succeed");
    assert_eq!(decoded, text);
}

#[test]
fn datamatrix_digits() {
    datamatrix_roundtrip("0123456789");
    datamatrix_roundtrip("1");
    datamatrix_roundtrip("123");
}

#[test]
fn datamatrix_ascii_text() {
    datamatrix_roundtrip("Hello, World!");
    datamatrix_roundtrip("A1B2C3 with spaces and UPPER lower");
}

#[test]
fn datamatrix_latin1() {
    datamatrix_roundtrip("café crème à volonté");
}

#[test]
fn datamatrix_utf8_base256() {
    // Characters outside Latin-1 force Base256 with UTF-8 payload.
    datamatrix_roundtrip("日本語テキスト");
    datamatrix_roundtrip("mixed ascii и кириллица");
}

#[test]
fn datamatrix_long_base256_payload() {
    // More than 249 bytes exercises the two-byte Base256 length header.
    let payload: String = "κόσμος ".repeat(40);
    datamatrix_roundtrip(&payload);
}

#[test]
fn datamatrix_multi_block_symbol() {
    // Long enough to require an interleaved multi-block symbol.
    let payload = "The quick brown fox jumps over the lazy dog. ".repeat(12);
    datamatrix_roundtrip(&payload);
}

#[test]
fn datamatrix_bytes_roundtrip() {
    let data: Vec<u8> = (0..=255).collect();
    let matrix = datamatrix::encode_bytes(&data).expect("encoding should succeed");
    let decoded = datamatrix::decode(&matrix).expect("decoding should succeed");
    let expected: String = data.iter().map(|&b| b as char).collect();
    assert_eq!(decoded, expected);
}

#[test]
fn datamatrix_capacity_error() {
    let data = vec![0u8; 2000];
    match datamatrix::encode_bytes(&data) {
        Err(matrixcode::EncodeError::CapacityExceeded { available, .. }) => {
            assert_eq!(available, 1558);
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
}

#[test]
fn pdf417_text() {
    let options = pdf417::EncodeOptions::default();
    pdf417_roundtrip("PDF417 Symbology Test", &options);
    pdf417_roundtrip("lowercase text only", &options);
    pdf417_roundtrip("Punctuation: (parens), [brackets], {braces}!", &options);
}

#[test]
fn pdf417_numeric() {
    let options = pdf417::EncodeOptions {
        compaction: pdf417::Compaction::Numeric,
        ..pdf417::EncodeOptions::default()
    };
    pdf417_roundtrip("01234567890123456789012345678901234567890123456789", &options);
    pdf417_roundtrip("000001", &options);
}

#[test]
fn pdf417_byte_lengths() {
    let options = pdf417::EncodeOptions {
        compaction: pdf417::Compaction::Byte,
        ..pdf417::EncodeOptions::default()
    };
    for len in [1usize, 5, 6, 7, 12, 100] {
        let text: String = ('a'..='z').cycle().take(len).collect();
        pdf417_roundtrip(&text, &options);
    }
}

#[test]
fn pdf417_auto_mixed_content() {
    let options = pdf417::EncodeOptions::default();
    pdf417_roundtrip("Order 12345678901234567890 from ACME corp", &options);
    pdf417_roundtrip("ref=9983312270014 qty=17", &options);
}

#[test]
fn pdf417_explicit_error_correction_levels() {
    for level in 0..=6 {
        let options = pdf417::EncodeOptions {
            error_correction_level: Some(level),
            ..pdf417::EncodeOptions::default()
        };
        pdf417_roundtrip("error correction sweep", &options);
    }
}

#[test]
fn pdf417_compact_symbol() {
    let options = pdf417::EncodeOptions {
        compact: true,
        ..pdf417::EncodeOptions::default()
    };
    pdf417_roundtrip("compact layout", &options);
    pdf417_roundtrip("1234567890123456", &options);
}

#[test]
fn pdf417_unicode_bytes() {
    let options = pdf417::EncodeOptions::default();
    pdf417_roundtrip("žluťoučký kůň", &options);
}

#[test]
fn pdf417_fixed_columns() {
    let options = pdf417::EncodeOptions {
        min_columns: 5,
        max_columns: 5,
        ..pdf417::EncodeOptions::default()
    };
    let matrix = pdf417::encode("five column symbol", &options).expect("encoding should succeed");
    assert_eq!(matrix.width(), 17 * 5 + 69);
    let decoded = pdf417::decode(&matrix).expect("decoding should succeed");
    assert_eq!(decoded, "five column symbol");
}

#[test]
fn pdf417_invalid_options_rejected() {
    let options = pdf417::EncodeOptions {
        error_correction_level: Some(9),
        ..pdf417::EncodeOptions::default()
    };
    assert!(pdf417::encode("x", &options).is_err());

    let options = pdf417::EncodeOptions {
        min_columns: 0,
        ..pdf417::EncodeOptions::default()
    };
    assert!(pdf417::encode("x", &options).is_err());
}

#[test]
fn empty_input_rejected() {
    assert!(datamatrix::encode("", datamatrix::EncodingMode::Auto).is_err());
    assert!(pdf417::encode("", &pdf417::EncodeOptions::default()).is_err());
}
