//! Data Matrix decoding: border stripping, de-interleaving, error
//! correction and ASCII/Base 256 decodation, plus the pixel-buffer
//! entry point with polarity and rotation search.

use log::debug;

use crate::models::BitMatrix;
use crate::pixels::{
    PixelFormat, estimate_module_size, find_bounding_box, sample_grid, threshold,
    trim_module_border,
};

use super::encoder::{BASE256_LATCH, PAD, UPPER_SHIFT, unrandomize_255};
use super::placement::read_codewords;
use super::reed_solomon::ReedSolomonDecoder;
use super::symbols::SymbolInfo;

/// Decode a module matrix. The matrix must be exactly one symbol with
/// borders included, dark modules true. Returns `None` when the size
/// is unknown, error correction fails, or the content is malformed.
pub fn decode(matrix: &BitMatrix) -> Option<String> {
    let symbol = SymbolInfo::for_size(matrix.height(), matrix.width())?;
    let region = extract_data_region(matrix, symbol);
    let stream = read_codewords(&region, symbol.total_codewords());
    let data = correct_errors(&stream, symbol)?;
    decode_ascii(&data)
}

/// Decode the first symbol found in a 32-bit pixel buffer.
///
/// Tries both polarities, estimates the module size from run lengths,
/// and retries across all four rotations and with a trimmed module
/// border before giving up.
pub fn decode_pixels(
    pixels: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
) -> Option<String> {
    let map = threshold(pixels, width, height, stride, format)?;
    for invert in [false, true] {
        let Some(bbox) = find_bounding_box(&map, invert) else {
            continue;
        };
        if bbox.width() < 8 || bbox.height() < 8 {
            continue;
        }
        let Some(estimate) = estimate_module_size(&map, &bbox, invert) else {
            continue;
        };
        // The run-length estimate can be off by one on noisy edges
        for module in [estimate, estimate.saturating_sub(1), estimate + 1] {
            if module == 0 {
                continue;
            }
            let cols = (bbox.width() as f32 / module as f32).round() as usize;
            let rows = (bbox.height() as f32 / module as f32).round() as usize;
            debug!(
                "datamatrix candidate: box {}x{} module {} grid {}x{} invert {}",
                bbox.width(),
                bbox.height(),
                module,
                cols,
                rows,
                invert
            );
            if rows < 10 || cols < 10 || rows > 144 || cols > 144 {
                continue;
            }
            let grid = sample_grid(&map, &bbox, cols, rows, module, invert);
            if let Some(text) = decode_any_rotation(&grid) {
                return Some(text);
            }
            if let Some(trimmed) = trim_module_border(&grid) {
                if let Some(text) = decode_any_rotation(&trimmed) {
                    return Some(text);
                }
            }
        }
    }
    None
}

fn decode_any_rotation(grid: &BitMatrix) -> Option<String> {
    decode(grid)
        .or_else(|| decode(&grid.rotate90()))
        .or_else(|| decode(&grid.rotate180()))
        .or_else(|| decode(&grid.rotate270()))
}

/// Strip the finder borders of every region and reassemble the
/// contiguous data module grid.
fn extract_data_region(matrix: &BitMatrix, symbol: &SymbolInfo) -> BitMatrix {
    let rdr = symbol.region_data_rows();
    let rdc = symbol.region_data_cols();
    let region_total_rows = symbol.rows / symbol.region_rows;
    let region_total_cols = symbol.cols / symbol.region_cols;

    let mut region = BitMatrix::new(symbol.data_region_cols(), symbol.data_region_rows());
    for region_row in 0..symbol.region_rows {
        for region_col in 0..symbol.region_cols {
            let start_row = region_row * region_total_rows;
            let start_col = region_col * region_total_cols;
            for y in 0..rdr {
                for x in 0..rdc {
                    let bit = matrix.get(start_col + 1 + x, start_row + 1 + y);
                    region.set(region_col * rdc + x, region_row * rdr + y, bit);
                }
            }
        }
    }
    region
}

/// De-interleave the codeword stream back into Reed-Solomon blocks,
/// correct each block, and return the contiguous data codewords.
fn correct_errors(stream: &[u8], symbol: &SymbolInfo) -> Option<Vec<u8>> {
    if stream.len() != symbol.total_codewords() {
        return None;
    }
    let block_count = symbol.block_count();
    let mut blocks: Vec<Vec<u8>> = symbol
        .block_sizes
        .iter()
        .map(|&size| Vec::with_capacity(size + symbol.ecc_block_size))
        .collect();

    let max_len = symbol.block_sizes.iter().copied().max().unwrap_or(0);
    let mut cursor = 0;
    for i in 0..max_len {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < symbol.block_sizes[b] {
                block.push(stream[cursor]);
                cursor += 1;
            }
        }
    }
    for _ in 0..symbol.ecc_block_size {
        for block in blocks.iter_mut() {
            block.push(stream[cursor]);
            cursor += 1;
        }
    }
    debug_assert_eq!(cursor, stream.len());

    let rs = ReedSolomonDecoder::new(symbol.ecc_block_size);
    let mut data = Vec::with_capacity(symbol.data_codewords);
    for (b, block) in blocks.iter_mut().enumerate() {
        if let Err(reason) = rs.decode(block) {
            debug!("block {b}/{block_count} failed error correction: {reason}");
            return None;
        }
        data.extend_from_slice(&block[..symbol.block_sizes[b]]);
    }
    Some(data)
}

/// ASCII decodation: digit pairs, plain ASCII, upper shift and the
/// embedded Base 256 stream. Unknown latches end the message.
fn decode_ascii(data: &[u8]) -> Option<String> {
    let mut out = String::new();
    let mut index = 0;
    while index < data.len() {
        let cw = data[index];
        match cw {
            PAD => break,
            1..=128 => {
                out.push((cw - 1) as char);
                index += 1;
            }
            130..=229 => {
                let pair = cw - 130;
                out.push((b'0' + pair / 10) as char);
                out.push((b'0' + pair % 10) as char);
                index += 1;
            }
            BASE256_LATCH => {
                index += 1;
                let bytes = read_base256(data, &mut index)?;
                out.push_str(&bytes_to_string(bytes));
            }
            UPPER_SHIFT => {
                index += 1;
                let b = *data.get(index)?;
                out.push((b.wrapping_add(127)) as char);
                index += 1;
            }
            // C40, Text, X12 and EDIFACT latches are not produced here
            _ => break,
        }
    }
    Some(out)
}

/// Read a Base 256 field starting at the length descriptor, undoing
/// the 255-state randomization keyed on the 1-based stream position.
fn read_base256(data: &[u8], index: &mut usize) -> Option<Vec<u8>> {
    let mut length = unrandomize_255(*data.get(*index)?, *index + 1) as usize;
    *index += 1;
    if length == 0 {
        return Some(Vec::new());
    }
    if length >= 250 {
        let low = unrandomize_255(*data.get(*index)?, *index + 1) as usize;
        length = (length - 249) * 250 + low;
        *index += 1;
    }
    let mut bytes = Vec::with_capacity(length);
    for _ in 0..length {
        bytes.push(unrandomize_255(*data.get(*index)?, *index + 1));
        *index += 1;
    }
    Some(bytes)
}

/// Strict UTF-8 when it parses, Latin-1 otherwise
fn bytes_to_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamatrix::encoder::{EncodingMode, encode, encode_bytes};

    #[test]
    fn test_matrix_round_trip_ascii() {
        let matrix = encode("HELLO 123456", EncodingMode::Auto).unwrap();
        assert_eq!(decode(&matrix).as_deref(), Some("HELLO 123456"));
    }

    #[test]
    fn test_matrix_round_trip_latin1() {
        let text = "caf\u{e9} \u{fc}ber";
        let matrix = encode(text, EncodingMode::Auto).unwrap();
        assert_eq!(decode(&matrix).as_deref(), Some(text));
    }

    #[test]
    fn test_matrix_round_trip_base256() {
        let text = "\u{4e16}\u{754c} utf-8";
        let matrix = encode(text, EncodingMode::Auto).unwrap();
        assert_eq!(decode(&matrix).as_deref(), Some(text));
    }

    #[test]
    fn test_round_trip_survives_rotation() {
        let matrix = encode("ROTATED", EncodingMode::Auto).unwrap();
        assert_eq!(
            decode_any_rotation(&matrix.rotate90()).as_deref(),
            Some("ROTATED")
        );
        assert_eq!(
            decode_any_rotation(&matrix.rotate270()).as_deref(),
            Some("ROTATED")
        );
    }

    #[test]
    fn test_round_trip_survives_module_damage() {
        let matrix = encode("DAMAGE TOLERANT", EncodingMode::Auto).unwrap();
        let mut damaged = matrix.clone();
        // Flip two interior modules, well within correction capacity
        damaged.toggle(5, 5);
        damaged.toggle(9, 7);
        assert_eq!(decode(&damaged).as_deref(), Some("DAMAGE TOLERANT"));
    }

    #[test]
    fn test_unknown_size_rejected() {
        let matrix = BitMatrix::new(11, 11);
        assert!(decode(&matrix).is_none());
    }

    #[test]
    fn test_garbage_matrix_rejected() {
        let mut matrix = BitMatrix::new(12, 12);
        for y in 0..12 {
            for x in 0..12 {
                matrix.set(x, y, (x * 7 + y * 3) % 5 < 2);
            }
        }
        // Must not panic, whatever the outcome
        let _ = decode(&matrix);
    }

    #[test]
    fn test_multi_block_round_trip() {
        // 300 bytes forces a multi-region, multi-block symbol
        let data: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
        let matrix = encode_bytes(&data).unwrap();
        let text = decode(&matrix).unwrap();
        let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
        assert_eq!(bytes, data);
    }
}
