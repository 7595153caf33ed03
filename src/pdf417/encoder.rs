//! PDF417 encoding: high-level compaction into codewords, error
//! correction sizing, dimension selection and bar pattern rendering.

use log::debug;

use crate::error::EncodeError;
use crate::models::BitMatrix;

use super::modulus::compute_parity;
use super::numeric::{MAX_NUMERIC_CHUNK, digits_to_codewords};
use super::tables::{
    LATCH_BYTE, LATCH_BYTE_FULL, LATCH_NUMERIC, LATCH_TEXT, MIXED_CHARS, PUNCT_CHARS,
    START_PATTERN, STOP_PATTERN, codeword_tables,
};

/// Modules per symbol character
pub const COLUMN_WIDTH: usize = 17;
/// Width in modules beyond the data columns: start, stop, indicators
pub const FULL_OVERHEAD_MODULES: usize = 69;
/// Overhead with the right indicator and stop replaced by a single bar
pub const COMPACT_OVERHEAD_MODULES: usize = 35;

const MAX_DATA_COLUMNS: usize = 30;
const MAX_SYMBOL_ROWS: usize = 90;
const MIN_SYMBOL_ROWS: usize = 3;
/// Largest value a single codeword can hold, bounding the length descriptor
const MAX_DESCRIPTOR_VALUE: usize = 928;

/// Minimum run before the auto encoder switches to numeric compaction
const AUTO_NUMERIC_RUN: usize = 13;
/// Minimum run before the auto encoder switches to text compaction
const AUTO_TEXT_RUN: usize = 5;

/// High-level compaction scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compaction {
    /// Segment the input into numeric, text and byte runs
    #[default]
    Auto,
    /// Text compaction only; input must be printable ASCII
    Text,
    /// Numeric compaction only; input must be decimal digits
    Numeric,
    /// Byte compaction of the UTF-8 bytes
    Byte,
}

/// Symbol layout and error correction knobs
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub compaction: Compaction,
    /// Error correction level 0..=8, `None` picks one from the data size
    pub error_correction_level: Option<u8>,
    pub min_columns: usize,
    pub max_columns: usize,
    pub min_rows: usize,
    pub max_rows: usize,
    /// Drop the right row indicator and stop pattern
    pub compact: bool,
    /// Preferred width-to-height ratio in modules
    pub target_aspect_ratio: f32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compaction: Compaction::Auto,
            error_correction_level: None,
            min_columns: 1,
            max_columns: MAX_DATA_COLUMNS,
            min_rows: MIN_SYMBOL_ROWS,
            max_rows: MAX_SYMBOL_ROWS,
            compact: false,
            target_aspect_ratio: 4.0,
        }
    }
}

/// Encode text into a PDF417 symbol, one module per matrix cell.
pub fn encode(text: &str, options: &EncodeOptions) -> Result<BitMatrix, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::Empty);
    }
    validate_options(options)?;
    let data = high_level_encode(text, options.compaction)?;
    encode_codewords(data, options)
}

/// Encode raw bytes with byte compaction.
pub fn encode_bytes(data: &[u8], options: &EncodeOptions) -> Result<BitMatrix, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::Empty);
    }
    validate_options(options)?;
    let mut codewords = vec![byte_latch(data.len())];
    encode_byte_segment(data, &mut codewords);
    encode_codewords(codewords, options)
}

fn validate_options(options: &EncodeOptions) -> Result<(), EncodeError> {
    if options.min_columns < 1
        || options.max_columns > MAX_DATA_COLUMNS
        || options.min_columns > options.max_columns
    {
        return Err(EncodeError::InvalidOptions("column range must be within 1..=30"));
    }
    if options.min_rows < MIN_SYMBOL_ROWS
        || options.max_rows > MAX_SYMBOL_ROWS
        || options.min_rows > options.max_rows
    {
        return Err(EncodeError::InvalidOptions("row range must be within 3..=90"));
    }
    if let Some(level) = options.error_correction_level {
        if level > 8 {
            return Err(EncodeError::InvalidOptions(
                "error correction level must be 0..=8",
            ));
        }
    }
    Ok(())
}

// ---- high-level compaction ----------------------------------------------

fn is_text_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r') || (32..=126).contains(&b)
}

fn high_level_encode(text: &str, compaction: Compaction) -> Result<Vec<u16>, EncodeError> {
    let bytes = text.as_bytes();
    match compaction {
        Compaction::Auto => Ok(encode_auto(bytes)),
        Compaction::Text => {
            if !bytes.iter().all(|&b| is_text_byte(b)) {
                return Err(EncodeError::UnsupportedContent);
            }
            let mut out = Vec::new();
            encode_text_segment(bytes, &mut out);
            Ok(out)
        }
        Compaction::Numeric => {
            if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_digit()) {
                return Err(EncodeError::UnsupportedContent);
            }
            let mut out = vec![LATCH_NUMERIC];
            encode_numeric_segment(bytes, &mut out);
            Ok(out)
        }
        Compaction::Byte => {
            let mut out = vec![byte_latch(bytes.len())];
            encode_byte_segment(bytes, &mut out);
            Ok(out)
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum SegmentMode {
    Text,
    Numeric,
    Byte,
}

/// Split the input into maximal numeric, text and byte runs, emitting
/// a latch at each mode change. The reader starts in text mode, so a
/// leading text run needs no latch.
fn encode_auto(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::new();
    let mut mode = SegmentMode::Text;
    let mut i = 0;
    while i < bytes.len() {
        let digit_run = count_while(bytes, i, |b| b.is_ascii_digit());
        if digit_run >= AUTO_NUMERIC_RUN {
            out.push(LATCH_NUMERIC);
            mode = SegmentMode::Numeric;
            encode_numeric_segment(&bytes[i..i + digit_run], &mut out);
            i += digit_run;
            continue;
        }
        let text_run = count_text_run(bytes, i);
        if text_run >= AUTO_TEXT_RUN {
            if mode != SegmentMode::Text {
                out.push(LATCH_TEXT);
                mode = SegmentMode::Text;
            }
            encode_text_segment(&bytes[i..i + text_run], &mut out);
            i += text_run;
            continue;
        }
        let binary_run = count_binary_run(bytes, i).max(1);
        out.push(byte_latch(binary_run));
        mode = SegmentMode::Byte;
        encode_byte_segment(&bytes[i..i + binary_run], &mut out);
        i += binary_run;
    }
    out
}

fn count_while(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    bytes[from..].iter().take_while(|&&b| pred(b)).count()
}

/// Length of the text run at `from`, stopping where a numeric run
/// worth switching for begins.
fn count_text_run(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() && is_text_byte(bytes[i]) {
        let digit_run = count_while(bytes, i, |b| b.is_ascii_digit());
        if digit_run >= AUTO_NUMERIC_RUN {
            break;
        }
        i += digit_run.max(1);
    }
    i - from
}

/// Length of the byte run at `from`, stopping where a text or numeric
/// run worth switching for begins.
fn count_binary_run(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() {
        if count_while(bytes, i, |b| b.is_ascii_digit()) >= AUTO_NUMERIC_RUN {
            break;
        }
        if count_text_run(bytes, i) >= AUTO_TEXT_RUN {
            break;
        }
        i += 1;
    }
    i - from
}

/// Byte runs whose length is a multiple of six latch with 924 so the
/// reader keeps 5-codeword groups together at the end of the stream.
fn byte_latch(len: usize) -> u16 {
    if len > 0 && len % 6 == 0 {
        LATCH_BYTE_FULL
    } else {
        LATCH_BYTE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSubmode {
    Alpha,
    Lower,
    Mixed,
}

const TEXT_SPACE: u8 = 26;
const SHIFT_TO_ALPHA: u8 = 27;
const LATCH_TO_LOWER: u8 = 27;
const LATCH_TO_MIXED: u8 = 28;
const LATCH_TO_ALPHA: u8 = 28;
const SHIFT_TO_PUNCT: u8 = 29;

fn punct_value(b: u8) -> Option<u8> {
    PUNCT_CHARS.iter().position(|&p| p == b).map(|i| i as u8)
}

fn mixed_value(b: u8) -> Option<u8> {
    MIXED_CHARS.iter().position(|&m| m == b).map(|i| i as u8)
}

/// Text compaction submode machine. Each segment starts in Alpha, the
/// submode the reader resets to on a text latch. Punctuation always
/// goes through the one-symbol punct shift.
fn encode_text_segment(bytes: &[u8], out: &mut Vec<u16>) {
    let mut values: Vec<u8> = Vec::with_capacity(bytes.len() * 2);
    let mut submode = TextSubmode::Alpha;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match submode {
            TextSubmode::Alpha => {
                if b.is_ascii_uppercase() {
                    values.push(b - b'A');
                } else if b == b' ' {
                    values.push(TEXT_SPACE);
                } else if b.is_ascii_lowercase() {
                    values.push(LATCH_TO_LOWER);
                    submode = TextSubmode::Lower;
                    continue;
                } else if mixed_value(b).is_some() {
                    values.push(LATCH_TO_MIXED);
                    submode = TextSubmode::Mixed;
                    continue;
                } else if let Some(p) = punct_value(b) {
                    values.push(SHIFT_TO_PUNCT);
                    values.push(p);
                }
            }
            TextSubmode::Lower => {
                if b.is_ascii_lowercase() {
                    values.push(b - b'a');
                } else if b == b' ' {
                    values.push(TEXT_SPACE);
                } else if b.is_ascii_uppercase() {
                    values.push(SHIFT_TO_ALPHA);
                    values.push(b - b'A');
                } else if mixed_value(b).is_some() {
                    values.push(LATCH_TO_MIXED);
                    submode = TextSubmode::Mixed;
                    continue;
                } else if let Some(p) = punct_value(b) {
                    values.push(SHIFT_TO_PUNCT);
                    values.push(p);
                }
            }
            TextSubmode::Mixed => {
                if let Some(m) = mixed_value(b) {
                    values.push(m);
                } else if b == b' ' {
                    values.push(TEXT_SPACE);
                } else if b.is_ascii_uppercase() {
                    values.push(LATCH_TO_ALPHA);
                    submode = TextSubmode::Alpha;
                    continue;
                } else if b.is_ascii_lowercase() {
                    values.push(LATCH_TO_LOWER);
                    submode = TextSubmode::Lower;
                    continue;
                } else if let Some(p) = punct_value(b) {
                    values.push(SHIFT_TO_PUNCT);
                    values.push(p);
                }
            }
        }
        i += 1;
    }

    let mut chunks = values.chunks_exact(2);
    for pair in chunks.by_ref() {
        out.push(30 * pair[0] as u16 + pair[1] as u16);
    }
    if let [last] = chunks.remainder() {
        out.push(30 * *last as u16 + SHIFT_TO_PUNCT as u16);
    }
}

/// Numeric compaction: 44-digit chunks, each prefixed with a 1 and
/// re-expressed in base 900.
fn encode_numeric_segment(digits: &[u8], out: &mut Vec<u16>) {
    for chunk in digits.chunks(MAX_NUMERIC_CHUNK) {
        let mut with_marker = Vec::with_capacity(chunk.len() + 1);
        with_marker.push(b'1');
        with_marker.extend_from_slice(chunk);
        out.extend(digits_to_codewords(&with_marker));
    }
}

/// Byte compaction: 6-byte groups become 5 base-900 codewords, any
/// tail is carried one codeword per byte.
fn encode_byte_segment(bytes: &[u8], out: &mut Vec<u16>) {
    let mut idx = 0;
    while idx + 6 <= bytes.len() {
        let mut value: u64 = 0;
        for &b in &bytes[idx..idx + 6] {
            value = value * 256 + b as u64;
        }
        let mut group = [0u16; 5];
        for slot in (0..5).rev() {
            group[slot] = (value % 900) as u16;
            value /= 900;
        }
        out.extend_from_slice(&group);
        idx += 6;
    }
    for &b in &bytes[idx..] {
        out.push(b as u16);
    }
}

// ---- framing and rendering ----------------------------------------------

fn recommended_level(data_codewords: usize) -> u8 {
    match data_codewords {
        0..=40 => 2,
        41..=160 => 3,
        161..=320 => 4,
        _ => 5,
    }
}

fn ecc_count(level: u8) -> usize {
    1 << (level + 1)
}

fn encode_codewords(data: Vec<u16>, options: &EncodeOptions) -> Result<BitMatrix, EncodeError> {
    let auto_level = options.error_correction_level.is_none();
    let mut level = options
        .error_correction_level
        .unwrap_or_else(|| recommended_level(data.len()));

    let mut chosen = choose_dimensions(data.len() + 1 + ecc_count(level), ecc_count(level), options);
    if chosen.is_none() && auto_level {
        while chosen.is_none() && level > 0 {
            level -= 1;
            chosen = choose_dimensions(data.len() + 1 + ecc_count(level), ecc_count(level), options);
        }
    }
    let Some((cols, rows)) = chosen else {
        return Err(EncodeError::CapacityExceeded {
            needed: data.len() + 1 + ecc_count(level),
            available: options.max_columns * options.max_rows,
        });
    };

    let cells = cols * rows;
    if auto_level {
        // Spend leftover capacity on a stronger level
        while level < 8 && data.len() + 1 + ecc_count(level + 1) <= cells {
            level += 1;
        }
    }

    let ecc = ecc_count(level);
    let pad_count = cells - data.len() - 1 - ecc;
    debug!(
        "pdf417 layout: {cols} cols x {rows} rows, level {level}, {} data, {pad_count} pads",
        data.len()
    );

    let mut stream = Vec::with_capacity(cells);
    stream.push((cells - ecc) as u16);
    stream.extend_from_slice(&data);
    stream.extend(std::iter::repeat(LATCH_TEXT).take(pad_count));
    let parity = compute_parity(&stream, ecc);
    stream.extend(parity);
    debug_assert_eq!(stream.len(), cells);

    Ok(render(&stream, rows, cols, level as usize, options.compact))
}

/// Pick the column count whose module aspect ratio sits closest to the
/// target, honoring the row and column limits and the length
/// descriptor range.
fn choose_dimensions(
    total_codewords: usize,
    ecc: usize,
    options: &EncodeOptions,
) -> Option<(usize, usize)> {
    let overhead = if options.compact {
        COMPACT_OVERHEAD_MODULES
    } else {
        FULL_OVERHEAD_MODULES
    };
    let mut best: Option<(usize, usize, f32)> = None;
    for cols in options.min_columns..=options.max_columns {
        let rows = total_codewords.div_ceil(cols);
        if rows < options.min_rows || rows > options.max_rows {
            continue;
        }
        if cols * rows - ecc > MAX_DESCRIPTOR_VALUE {
            continue;
        }
        let ratio = (COLUMN_WIDTH * cols + overhead) as f32 / rows as f32;
        let score = (ratio - options.target_aspect_ratio).abs();
        if best.is_none_or(|(_, _, s)| score < s) {
            best = Some((cols, rows, score));
        }
    }
    best.map(|(cols, rows, _)| (cols, rows))
}

fn left_indicator(row: usize, rows: usize, cols: usize, level: usize) -> u16 {
    let base = 30 * (row / 3);
    let value = match row % 3 {
        0 => base + (rows - 1) / 3,
        1 => base + level * 3 + (rows - 1) % 3,
        _ => base + (cols - 1),
    };
    value as u16
}

fn right_indicator(row: usize, rows: usize, cols: usize, level: usize) -> u16 {
    let base = 30 * (row / 3);
    let value = match row % 3 {
        0 => base + (cols - 1),
        1 => base + (rows - 1) / 3,
        _ => base + level * 3 + (rows - 1) % 3,
    };
    value as u16
}

/// Render codeword row 0 at the bottom of the matrix; readers walk
/// rows bottom-up with cluster `row % 3`.
fn render(stream: &[u16], rows: usize, cols: usize, level: usize, compact: bool) -> BitMatrix {
    let tables = codeword_tables();
    let overhead = if compact {
        COMPACT_OVERHEAD_MODULES
    } else {
        FULL_OVERHEAD_MODULES
    };
    let width = COLUMN_WIDTH * cols + overhead;
    let mut matrix = BitMatrix::new(width, rows);

    for row in 0..rows {
        let y = rows - 1 - row;
        let cluster = row % 3;
        let mut x = write_bits(&mut matrix, 0, y, START_PATTERN, COLUMN_WIDTH);
        let left = tables.pattern(cluster, left_indicator(row, rows, cols, level));
        x = write_bits(&mut matrix, x, y, left, COLUMN_WIDTH);
        for col in 0..cols {
            let pattern = tables.pattern(cluster, stream[row * cols + col]);
            x = write_bits(&mut matrix, x, y, pattern, COLUMN_WIDTH);
        }
        if compact {
            write_bits(&mut matrix, x, y, 1, 1);
        } else {
            let right = tables.pattern(cluster, right_indicator(row, rows, cols, level));
            x = write_bits(&mut matrix, x, y, right, COLUMN_WIDTH);
            write_bits(&mut matrix, x, y, STOP_PATTERN, 18);
        }
    }
    matrix
}

fn write_bits(matrix: &mut BitMatrix, x: usize, y: usize, pattern: u32, count: usize) -> usize {
    for i in 0..count {
        if (pattern >> (count - 1 - i)) & 1 == 1 {
            matrix.set(x + i, y, true);
        }
    }
    x + count
}
