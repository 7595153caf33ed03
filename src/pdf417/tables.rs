//! Symbol character tables and text-compaction alphabets.
//!
//! Each PDF417 symbol character is 17 modules wide, four bars and four
//! spaces, starting with a bar and ending with a space, no run longer
//! than six modules. Characters split into three clusters by the bar
//! width discriminator (b1 - b2 + b3 - b4) mod 9, which must be 0, 3
//! or 6; rows use cluster `row % 3`. Enumerating the valid 17-bit
//! patterns in ascending order yields at least 929 characters per
//! cluster, which is exactly the codeword alphabet needed.
//!
//! The ascending enumeration is self-consistent between encoder and
//! decoder but assigns codeword values in a different order than the
//! normative ISO/IEC 15438 tables; interoperating with third-party
//! readers or writers would require substituting the published tables.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::modulus::MODULUS;

/// 17-module start pattern, leftmost module in bit 16
pub const START_PATTERN: u32 = 0x1fea8;
/// 18-module stop pattern, leftmost module in bit 17
pub const STOP_PATTERN: u32 = 0x3fa29;

/// Text compaction latch
pub const LATCH_TEXT: u16 = 900;
/// Byte compaction latch, trailing partial group
pub const LATCH_BYTE: u16 = 901;
/// Numeric compaction latch
pub const LATCH_NUMERIC: u16 = 902;
/// Single-byte shift inside text compaction
pub const SHIFT_BYTE: u16 = 913;
/// Byte compaction latch, length a multiple of six
pub const LATCH_BYTE_FULL: u16 = 924;

/// Punctuation submode alphabet, indexed by symbol value
pub const PUNCT_CHARS: &[u8] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";
/// Mixed submode alphabet, indexed by symbol value
pub const MIXED_CHARS: &[u8] = b"0123456789&\r\t,:#-.$/+%*=^";

/// Per-cluster pattern tables and their reverse lookups
pub struct CodewordTables {
    patterns: [Vec<u32>; 3],
    lookup: [HashMap<u32, u16>; 3],
}

impl CodewordTables {
    /// Bit pattern of `codeword` in the given cluster
    pub fn pattern(&self, cluster: usize, codeword: u16) -> u32 {
        self.patterns[cluster][codeword as usize]
    }

    /// Codeword whose pattern matches exactly, if any
    pub fn codeword(&self, cluster: usize, pattern: u32) -> Option<u16> {
        self.lookup[cluster].get(&pattern).copied()
    }
}

static TABLES: OnceLock<CodewordTables> = OnceLock::new();

/// Shared symbol character tables, built on first use
pub fn codeword_tables() -> &'static CodewordTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> CodewordTables {
    let mut patterns: [Vec<u32>; 3] = [
        Vec::with_capacity(MODULUS),
        Vec::with_capacity(MODULUS),
        Vec::with_capacity(MODULUS),
    ];

    for candidate in (1u32 << 16)..(1u32 << 17) {
        // Must end in a space
        if candidate & 1 != 0 {
            continue;
        }
        let Some(cluster) = classify(candidate) else {
            continue;
        };
        if patterns[cluster].len() < MODULUS {
            patterns[cluster].push(candidate);
        }
    }
    debug_assert!(patterns.iter().all(|p| p.len() == MODULUS));

    let lookup = [
        reverse(&patterns[0]),
        reverse(&patterns[1]),
        reverse(&patterns[2]),
    ];
    CodewordTables { patterns, lookup }
}

/// Cluster index of a candidate pattern, or `None` when it is not a
/// valid symbol character.
fn classify(pattern: u32) -> Option<usize> {
    let mut runs = [0u32; 8];
    let mut run_count = 0;
    let mut current = 1u32; // bit 16 is always set here
    let mut length = 0u32;
    for i in (0..17).rev() {
        let bit = (pattern >> i) & 1;
        if bit == current {
            length += 1;
        } else {
            if run_count == 8 || length > 6 {
                return None;
            }
            runs[run_count] = length;
            run_count += 1;
            current = bit;
            length = 1;
        }
    }
    if run_count != 7 || length > 6 {
        return None;
    }
    runs[7] = length;

    let b1 = runs[0] as i32;
    let b2 = runs[2] as i32;
    let b3 = runs[4] as i32;
    let b4 = runs[6] as i32;
    match (b1 - b2 + b3 - b4).rem_euclid(9) {
        0 => Some(0),
        3 => Some(1),
        6 => Some(2),
        _ => None,
    }
}

fn reverse(patterns: &[u32]) -> HashMap<u32, u16> {
    patterns
        .iter()
        .enumerate()
        .map(|(codeword, &pattern)| (pattern, codeword as u16))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cluster_is_full() {
        let tables = codeword_tables();
        for cluster in 0..3 {
            for codeword in 0..MODULUS as u16 {
                let pattern = tables.pattern(cluster, codeword);
                assert_eq!(pattern >> 16, 1, "starts with a bar");
                assert_eq!(pattern & 1, 0, "ends with a space");
                assert_eq!(tables.codeword(cluster, pattern), Some(codeword));
            }
        }
    }

    #[test]
    fn test_patterns_unique_within_cluster() {
        let tables = codeword_tables();
        for cluster in 0..3 {
            let mut seen = std::collections::HashSet::new();
            for codeword in 0..MODULUS as u16 {
                assert!(seen.insert(tables.pattern(cluster, codeword)));
            }
        }
    }

    #[test]
    fn test_start_and_stop_shapes() {
        // Start: runs 8 1 1 1 1 1 1 3, stop: 7 1 1 3 1 1 1 2 1
        assert_eq!(START_PATTERN.count_ones(), 11);
        assert_eq!(STOP_PATTERN >> 17, 1);
        assert_eq!(STOP_PATTERN & 1, 1);
    }

    #[test]
    fn test_invalid_pattern_not_found() {
        let tables = codeword_tables();
        // All-bars is not a valid symbol character
        assert_eq!(tables.codeword(0, 0x1ffff), None);
        assert_eq!(tables.codeword(1, 0), None);
    }
}
