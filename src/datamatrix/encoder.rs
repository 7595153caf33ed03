//! High-level Data Matrix encoding: encodation, padding, block
//! interleaving and symbol assembly.

use crate::error::EncodeError;
use crate::models::BitMatrix;

use super::placement::place_codewords;
use super::reed_solomon::{compute_divisor, compute_remainder};
use super::symbols::SymbolInfo;

/// Pad codeword, also ends the message in ASCII encodation
pub(crate) const PAD: u8 = 129;
/// Latch from ASCII to Base 256 encodation
pub(crate) const BASE256_LATCH: u8 = 231;
/// Upper shift: next codeword carries a byte in 128..=255
pub(crate) const UPPER_SHIFT: u8 = 235;

/// Encodation scheme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingMode {
    /// Pick ASCII for Latin-1 text, Base 256 otherwise
    #[default]
    Auto,
    /// ASCII encodation: digit pairs, ASCII, upper-shifted Latin-1
    Ascii,
    /// Base 256 encodation of the UTF-8 bytes
    Base256,
}

/// Encode text into a Data Matrix symbol.
pub fn encode(text: &str, mode: EncodingMode) -> Result<BitMatrix, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::Empty);
    }
    let codewords = match mode {
        EncodingMode::Ascii => {
            let bytes = latin1_bytes(text).ok_or(EncodeError::UnsupportedContent)?;
            encode_ascii(&bytes)
        }
        EncodingMode::Base256 => encode_base256(text.as_bytes()),
        EncodingMode::Auto => match latin1_bytes(text) {
            Some(bytes) => encode_ascii(&bytes),
            None => encode_base256(text.as_bytes()),
        },
    };
    build(codewords)
}

/// Encode raw bytes into a Data Matrix symbol using Base 256.
pub fn encode_bytes(data: &[u8]) -> Result<BitMatrix, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::Empty);
    }
    build(encode_base256(data))
}

fn build(mut codewords: Vec<u8>) -> Result<BitMatrix, EncodeError> {
    let symbol = SymbolInfo::for_data(codewords.len()).ok_or(EncodeError::CapacityExceeded {
        needed: codewords.len(),
        available: SymbolInfo::all().last().map_or(0, |s| s.data_codewords),
    })?;
    pad_codewords(&mut codewords, symbol.data_codewords);
    let stream = add_error_correction(&codewords, symbol);
    Ok(build_symbol(&stream, symbol))
}

/// Text as Latin-1 bytes, or `None` when a char falls outside 0..=255
fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(c as u32).ok())
        .collect()
}

/// ASCII encodation: digit pairs pack into one codeword, plain ASCII
/// maps to value + 1, high Latin-1 bytes use the upper shift.
fn encode_ascii(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if b.is_ascii_digit() && i + 1 < data.len() && data[i + 1].is_ascii_digit() {
            let pair = (b - b'0') * 10 + (data[i + 1] - b'0');
            out.push(130 + pair);
            i += 2;
        } else if b <= 127 {
            out.push(b + 1);
            i += 1;
        } else {
            out.push(UPPER_SHIFT);
            out.push(b - 127);
            i += 1;
        }
    }
    out
}

/// Base 256 encodation: latch, length descriptor, raw bytes, then the
/// 255-state randomization over everything after the latch.
fn encode_base256(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 3);
    out.push(BASE256_LATCH);
    if data.len() <= 249 {
        out.push(data.len() as u8);
    } else {
        out.push((data.len() / 250 + 249) as u8);
        out.push((data.len() % 250) as u8);
    }
    out.extend_from_slice(data);
    for idx in 1..out.len() {
        out[idx] = randomize_255(out[idx], idx + 1);
    }
    out
}

/// Fill remaining data capacity: one plain pad, then 253-state
/// randomized pads keyed on the 1-based stream position.
fn pad_codewords(codewords: &mut Vec<u8>, data_capacity: usize) {
    if codewords.len() < data_capacity {
        codewords.push(PAD);
    }
    while codewords.len() < data_capacity {
        let position = codewords.len() + 1;
        codewords.push(randomize_253(position));
    }
}

pub(crate) fn randomize_255(value: u8, position: usize) -> u8 {
    let pseudo = ((149 * position) % 255) + 1;
    let mut temp = value as usize + pseudo;
    if temp > 255 {
        temp -= 256;
    }
    temp as u8
}

pub(crate) fn unrandomize_255(value: u8, position: usize) -> u8 {
    let pseudo = ((149 * position) % 255) + 1;
    let temp = value as isize - pseudo as isize;
    if temp < 0 { (temp + 256) as u8 } else { temp as u8 }
}

fn randomize_253(position: usize) -> u8 {
    let pseudo = ((149 * position) % 253) + 1;
    let mut temp = PAD as usize + pseudo;
    if temp > 254 {
        temp -= 254;
    }
    temp as u8
}

/// Split the data stream into contiguous Reed-Solomon blocks, then
/// emit data and parity round-robin interleaved across the blocks.
pub(crate) fn add_error_correction(data: &[u8], symbol: &SymbolInfo) -> Vec<u8> {
    debug_assert_eq!(data.len(), symbol.data_codewords);
    let mut blocks: Vec<&[u8]> = Vec::with_capacity(symbol.block_count());
    let mut offset = 0;
    for &size in symbol.block_sizes {
        blocks.push(&data[offset..offset + size]);
        offset += size;
    }

    let mut out = Vec::with_capacity(symbol.total_codewords());
    let max_len = symbol.block_sizes.iter().copied().max().unwrap_or(0);
    for i in 0..max_len {
        for block in &blocks {
            if i < block.len() {
                out.push(block[i]);
            }
        }
    }

    let divisor = compute_divisor(symbol.ecc_block_size);
    let parity: Vec<Vec<u8>> = blocks
        .iter()
        .map(|block| compute_remainder(block, &divisor))
        .collect();
    for i in 0..symbol.ecc_block_size {
        for block_parity in &parity {
            out.push(block_parity[i]);
        }
    }
    out
}

/// Place the codeword stream and wrap each data region in its finder
/// border: solid left and bottom edges, alternating top and right.
fn build_symbol(stream: &[u8], symbol: &SymbolInfo) -> BitMatrix {
    let region = place_codewords(stream, symbol.data_region_rows(), symbol.data_region_cols());
    let mut matrix = BitMatrix::new(symbol.cols, symbol.rows);

    let region_total_rows = symbol.rows / symbol.region_rows;
    let region_total_cols = symbol.cols / symbol.region_cols;
    let rdr = symbol.region_data_rows();
    let rdc = symbol.region_data_cols();

    for region_row in 0..symbol.region_rows {
        for region_col in 0..symbol.region_cols {
            let start_row = region_row * region_total_rows;
            let start_col = region_col * region_total_cols;

            for x in 0..region_total_cols {
                matrix.set(start_col + x, start_row, x % 2 == 0);
                matrix.set(start_col + x, start_row + region_total_rows - 1, true);
            }
            for y in 1..region_total_rows - 1 {
                matrix.set(start_col, start_row + y, true);
                matrix.set(start_col + region_total_cols - 1, start_row + y, y % 2 == 0);
            }

            for y in 0..rdr {
                for x in 0..rdc {
                    let bit = region.get(region_col * rdc + x, region_row * rdr + y);
                    matrix.set(start_col + 1 + x, start_row + 1 + y, bit);
                }
            }
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_encodation_codewords() {
        // 'A' -> 66, 'B' -> 67, "12" packs to 130 + 12
        assert_eq!(encode_ascii(b"AB12"), vec![66, 67, 142]);
        // Lone trailing digit stays a plain ASCII codeword
        assert_eq!(encode_ascii(b"1"), vec![b'1' + 1]);
        assert_eq!(encode_ascii(b"123"), vec![142, b'3' + 1]);
    }

    #[test]
    fn test_ascii_upper_shift() {
        // 0xE9 is 'e' acute in Latin-1
        assert_eq!(encode_ascii(&[0xE9]), vec![UPPER_SHIFT, 0xE9 - 127]);
    }

    #[test]
    fn test_base256_header_short_and_long() {
        let short = encode_base256(&[0u8; 10]);
        assert_eq!(short[0], BASE256_LATCH);
        assert_eq!(unrandomize_255(short[1], 2), 10);
        assert_eq!(short.len(), 12);

        let long = encode_base256(&[0u8; 300]);
        assert_eq!(long[0], BASE256_LATCH);
        let hi = unrandomize_255(long[1], 2) as usize;
        let lo = unrandomize_255(long[2], 3) as usize;
        assert_eq!((hi - 249) * 250 + lo, 300);
        assert_eq!(long.len(), 303);
    }

    #[test]
    fn test_randomize_255_reversible_everywhere() {
        for position in 1..=2000 {
            for value in 0..=255u8 {
                let r = randomize_255(value, position);
                assert_eq!(unrandomize_255(r, position), value);
            }
        }
    }

    #[test]
    fn test_pad_sequence() {
        let mut cw = vec![66u8];
        pad_codewords(&mut cw, 5);
        assert_eq!(cw.len(), 5);
        assert_eq!(cw[1], PAD);
        // Later pads are randomized and position-dependent
        assert_eq!(cw[2], randomize_253(3));
        assert_ne!(cw[2], cw[3]);
    }

    #[test]
    fn test_interleave_round_robin() {
        // 52x52 symbol: two blocks of 102 data codewords, 42 parity each
        let symbol = SymbolInfo::for_size(52, 52).unwrap();
        let data: Vec<u8> = (0..symbol.data_codewords).map(|i| (i % 251) as u8).collect();
        let stream = add_error_correction(&data, symbol);
        assert_eq!(stream.len(), symbol.total_codewords());
        // First two output codewords come from the heads of both blocks
        assert_eq!(stream[0], data[0]);
        assert_eq!(stream[1], data[102]);
        assert_eq!(stream[2], data[1]);
    }

    #[test]
    fn test_symbol_borders() {
        let matrix = encode("TEST", EncodingMode::Auto).unwrap();
        assert_eq!((matrix.width(), matrix.height()), (12, 12));
        for y in 0..12 {
            assert!(matrix.get(0, y), "left edge solid");
            assert!(matrix.get(y, 11), "bottom edge solid");
        }
        for x in 0..12 {
            assert_eq!(matrix.get(x, 0), x % 2 == 0, "top edge alternates");
        }
        for y in 1..11 {
            assert_eq!(matrix.get(11, y), y % 2 == 0, "right edge alternates");
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            encode("", EncodingMode::Auto),
            Err(EncodeError::Empty)
        ));
        assert!(matches!(encode_bytes(&[]), Err(EncodeError::Empty)));
    }

    #[test]
    fn test_non_latin1_rejected_in_ascii_mode() {
        assert!(matches!(
            encode("\u{4e16}\u{754c}", EncodingMode::Ascii),
            Err(EncodeError::UnsupportedContent)
        ));
    }

    #[test]
    fn test_capacity_exceeded() {
        let data = vec![0u8; 2000];
        match encode_bytes(&data) {
            Err(EncodeError::CapacityExceeded { needed, available }) => {
                assert!(needed > available);
                assert_eq!(available, 1558);
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
    }
}
