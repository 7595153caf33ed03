//! PDF417 decoding: bar pattern matching, error correction level
//! probing, and the text/byte/numeric bitstream parser, plus the
//! pixel-buffer entry point with candidate geometry enumeration.

use std::collections::HashSet;

use log::debug;

use crate::models::BitMatrix;
use crate::pixels::{
    BoundingBox, PixelFormat, estimate_module_size, find_bounding_box, sample_grid, threshold,
    trim_module_border,
};

use super::encoder::{COLUMN_WIDTH, COMPACT_OVERHEAD_MODULES, FULL_OVERHEAD_MODULES};
use super::modulus::correct_errors;
use super::numeric::codewords_to_digits;
use super::tables::{
    LATCH_BYTE, LATCH_BYTE_FULL, LATCH_NUMERIC, LATCH_TEXT, MIXED_CHARS, PUNCT_CHARS, SHIFT_BYTE,
    codeword_tables,
};

const MIN_SYMBOL_ROWS: usize = 3;
const MAX_SYMBOL_ROWS: usize = 90;
const MAX_DATA_COLUMNS: usize = 30;

/// Decode a module matrix holding exactly one symbol, dark modules
/// true, codeword row 0 at the bottom.
pub fn decode(matrix: &BitMatrix) -> Option<String> {
    decode_with_layout(matrix, false).or_else(|| decode_with_layout(matrix, true))
}

fn decode_with_layout(matrix: &BitMatrix, compact: bool) -> Option<String> {
    let overhead = if compact {
        COMPACT_OVERHEAD_MODULES
    } else {
        FULL_OVERHEAD_MODULES
    };
    let width = matrix.width();
    let rows = matrix.height();
    if !(MIN_SYMBOL_ROWS..=MAX_SYMBOL_ROWS).contains(&rows) {
        return None;
    }
    if width <= overhead || (width - overhead) % COLUMN_WIDTH != 0 {
        return None;
    }
    let cols = (width - overhead) / COLUMN_WIDTH;
    if cols > MAX_DATA_COLUMNS {
        return None;
    }

    let tables = codeword_tables();
    let mut codewords = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let y = rows - 1 - row;
        let cluster = row % 3;
        let mut x = COLUMN_WIDTH; // start pattern
        // Left row indicator must be a valid symbol character
        tables.codeword(cluster, read_bits(matrix, x, y, COLUMN_WIDTH))?;
        x += COLUMN_WIDTH;
        for _ in 0..cols {
            let pattern = read_bits(matrix, x, y, COLUMN_WIDTH);
            codewords.push(tables.codeword(cluster, pattern)?);
            x += COLUMN_WIDTH;
        }
        if !compact {
            tables.codeword(cluster, read_bits(matrix, x, y, COLUMN_WIDTH))?;
        }
    }

    let data = correct_and_strip(&codewords)?;
    Some(parse_codewords(&data))
}

fn read_bits(matrix: &BitMatrix, x: usize, y: usize, count: usize) -> u32 {
    let mut pattern = 0u32;
    for i in 0..count {
        pattern = (pattern << 1) | matrix.get(x + i, y) as u32;
    }
    pattern
}

/// Probe error correction levels from weakest to strongest, accepting
/// the first whose corrected stream has a consistent length
/// descriptor; fall back to the uncorrected descriptor.
fn correct_and_strip(codewords: &[u16]) -> Option<Vec<u16>> {
    let total = codewords.len();
    for level in 0..=8u8 {
        let ecc = 1usize << (level + 1);
        if total <= ecc {
            break;
        }
        let mut attempt = codewords.to_vec();
        if correct_errors(&mut attempt, ecc).is_ok() && attempt[0] as usize == total - ecc {
            debug!("pdf417 corrected at level {level}");
            return strip_descriptor(&attempt, ecc);
        }
    }

    let descriptor = codewords[0] as usize;
    if descriptor > 0 && descriptor < total {
        let ecc = total - descriptor;
        if (2..=512).contains(&ecc) && ecc.is_power_of_two() {
            let mut attempt = codewords.to_vec();
            if correct_errors(&mut attempt, ecc).is_ok() {
                return strip_descriptor(&attempt, ecc);
            }
        }
    }
    None
}

fn strip_descriptor(corrected: &[u16], ecc: usize) -> Option<Vec<u16>> {
    let total = corrected.len();
    let descriptor = corrected[0] as usize;
    if descriptor == 0 || descriptor > total || descriptor > total - ecc {
        return None;
    }
    Some(corrected[1..descriptor].to_vec())
}

// ---- bitstream parsing ---------------------------------------------------

/// Expand data codewords (pads included) into text. Pads are text
/// latches and fall out naturally.
fn parse_codewords(codewords: &[u16]) -> String {
    let mut out = String::new();
    let mut index = 0;
    while index < codewords.len() {
        match codewords[index] {
            LATCH_TEXT => index = decode_text(codewords, index + 1, &mut out),
            latch @ (LATCH_BYTE | LATCH_BYTE_FULL) => {
                index = decode_byte(codewords, index + 1, latch, &mut out)
            }
            LATCH_NUMERIC => index = decode_numeric(codewords, index + 1, &mut out),
            cw if cw < 900 => index = decode_text(codewords, index, &mut out),
            // Reserved latches: skip
            _ => index += 1,
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextState {
    Alpha,
    Lower,
    Mixed,
    Punct,
    AlphaShift,
    PunctShift,
}

/// Text compaction: each codeword carries two symbol values run
/// through the submode state machine. The byte shift 913 interleaves
/// single raw bytes without leaving text mode.
fn decode_text(codewords: &[u16], mut index: usize, out: &mut String) -> usize {
    let mut state = TextState::Alpha;
    let mut prior = TextState::Alpha;

    while index < codewords.len() {
        let cw = codewords[index];
        if cw >= 900 {
            if cw == SHIFT_BYTE {
                if let Some(&byte) = codewords.get(index + 1) {
                    out.push((byte as u8) as char);
                    index += 2;
                    continue;
                }
            }
            break;
        }
        index += 1;
        for value in [(cw / 30) as u8, (cw % 30) as u8] {
            apply_text_value(value, &mut state, &mut prior, out);
        }
    }
    index
}

fn apply_text_value(value: u8, state: &mut TextState, prior: &mut TextState, out: &mut String) {
    match *state {
        TextState::Alpha => match value {
            0..=25 => out.push((b'A' + value) as char),
            26 => out.push(' '),
            27 => *state = TextState::Lower,
            28 => *state = TextState::Mixed,
            _ => {
                *prior = TextState::Alpha;
                *state = TextState::PunctShift;
            }
        },
        TextState::Lower => match value {
            0..=25 => out.push((b'a' + value) as char),
            26 => out.push(' '),
            27 => {
                *prior = TextState::Lower;
                *state = TextState::AlphaShift;
            }
            28 => *state = TextState::Mixed,
            _ => {
                *prior = TextState::Lower;
                *state = TextState::PunctShift;
            }
        },
        TextState::Mixed => match value {
            0..=24 => out.push(MIXED_CHARS[value as usize] as char),
            25 => *state = TextState::Punct,
            26 => out.push(' '),
            27 => *state = TextState::Lower,
            28 => *state = TextState::Alpha,
            _ => {
                *prior = TextState::Mixed;
                *state = TextState::PunctShift;
            }
        },
        TextState::Punct => match value {
            0..=28 => out.push(PUNCT_CHARS[value as usize] as char),
            _ => *state = TextState::Alpha,
        },
        TextState::AlphaShift => {
            *state = *prior;
            match value {
                0..=25 => out.push((b'A' + value) as char),
                26 => out.push(' '),
                _ => {}
            }
        }
        TextState::PunctShift => {
            *state = *prior;
            match value {
                0..=28 => out.push(PUNCT_CHARS[value as usize] as char),
                _ => *state = TextState::Alpha,
            }
        }
    }
}

/// Byte compaction: groups of five codewords expand to six bytes; a
/// trailing group under the 901 latch is carried one byte per
/// codeword.
fn decode_byte(codewords: &[u16], mut index: usize, latch: u16, out: &mut String) -> usize {
    let mut bytes = Vec::new();
    loop {
        let mut group = [0u16; 5];
        let mut count = 0;
        while count < 5 && index < codewords.len() && codewords[index] < 900 {
            group[count] = codewords[index];
            count += 1;
            index += 1;
        }
        if count == 0 {
            break;
        }
        let next_is_data = codewords.get(index).is_some_and(|&cw| cw < 900);
        if count == 5 && (latch == LATCH_BYTE_FULL || next_is_data) {
            let mut value = group.iter().fold(0u64, |acc, &cw| acc * 900 + cw as u64);
            let mut six = [0u8; 6];
            for slot in (0..6).rev() {
                six[slot] = (value % 256) as u8;
                value /= 256;
            }
            bytes.extend_from_slice(&six);
        } else {
            for &cw in &group[..count] {
                bytes.push(cw as u8);
            }
        }
    }
    out.push_str(&bytes_to_string(bytes));
    index
}

/// Numeric compaction: every 15 codewords (or the trailing group)
/// decode as one base-900 integer with a leading 1 marker.
fn decode_numeric(codewords: &[u16], mut index: usize, out: &mut String) -> usize {
    let mut group = Vec::with_capacity(15);
    while index < codewords.len() && codewords[index] < 900 {
        group.push(codewords[index]);
        index += 1;
        if group.len() == 15 {
            match codewords_to_digits(&group) {
                Some(digits) => out.push_str(&digits),
                None => return index,
            }
            group.clear();
        }
    }
    if !group.is_empty() {
        if let Some(digits) = codewords_to_digits(&group) {
            out.push_str(&digits);
        }
    }
    index
}

fn bytes_to_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

// ---- pixel decoding ------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Candidate {
    module_size: usize,
    width_modules: usize,
    height_modules: usize,
}

/// Decode the first symbol found in a 32-bit pixel buffer.
///
/// Enumerates plausible module sizes from the bounding box and every
/// legal column count, samples each geometry, and tries all four
/// rotations with and without a trimmed module border.
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
        if bbox.width() < 3 || bbox.height() < 3 {
            continue;
        }
        for candidate in build_candidates(&map, &bbox, invert) {
            debug!(
                "pdf417 candidate: module {} grid {}x{} invert {}",
                candidate.module_size, candidate.width_modules, candidate.height_modules, invert
            );
            let grid = sample_grid(
                &map,
                &bbox,
                candidate.width_modules,
                candidate.height_modules,
                candidate.module_size,
                invert,
            );
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

fn build_candidates(map: &BitMatrix, bbox: &BoundingBox, invert: bool) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    if let Some(module_size) = estimate_module_size(map, bbox, invert) {
        push_candidate(&mut candidates, &mut seen, bbox, module_size);
    }
    for overhead in [FULL_OVERHEAD_MODULES, COMPACT_OVERHEAD_MODULES] {
        for cols in 1..=MAX_DATA_COLUMNS {
            let layout_modules = COLUMN_WIDTH * cols + overhead;
            // The symbol may be rotated, so try fitting the layout
            // along either axis of the bounding box.
            for extent in [bbox.width(), bbox.height()] {
                let module_size = (extent as f32 / layout_modules as f32).round() as usize;
                if module_size == 0 {
                    continue;
                }
                push_candidate(&mut candidates, &mut seen, bbox, module_size);
            }
        }
    }
    candidates
}

fn push_candidate(
    candidates: &mut Vec<Candidate>,
    seen: &mut HashSet<Candidate>,
    bbox: &BoundingBox,
    module_size: usize,
) {
    let width_modules = (bbox.width() as f32 / module_size as f32).round() as usize;
    let height_modules = (bbox.height() as f32 / module_size as f32).round() as usize;
    let candidate = Candidate {
        module_size,
        width_modules,
        height_modules,
    };
    let landscape = (MIN_SYMBOL_ROWS..=MAX_SYMBOL_ROWS).contains(&height_modules)
        && layout_width_valid(width_modules);
    let portrait = (MIN_SYMBOL_ROWS..=MAX_SYMBOL_ROWS).contains(&width_modules)
        && layout_width_valid(height_modules);
    if !landscape && !portrait {
        return;
    }
    let width_error = (width_modules * module_size).abs_diff(bbox.width());
    let height_error = (height_modules * module_size).abs_diff(bbox.height());
    if width_error > 2 * module_size || height_error > 2 * module_size {
        return;
    }
    if seen.insert(candidate) {
        candidates.push(candidate);
    }
}

/// Whether a width in modules matches some legal column count, in
/// either the full or the compact layout.
fn layout_width_valid(width_modules: usize) -> bool {
    for overhead in [FULL_OVERHEAD_MODULES, COMPACT_OVERHEAD_MODULES] {
        if width_modules > overhead && (width_modules - overhead) % COLUMN_WIDTH == 0 {
            let cols = (width_modules - overhead) / COLUMN_WIDTH;
            if (1..=MAX_DATA_COLUMNS).contains(&cols) {
                return true;
            }
        }
    }
    false
}
