//! Numeric compaction arithmetic.
//!
//! Digit chunks are prefixed with a leading 1 and treated as one large
//! integer, re-expressed in base 900. Chunks hold at most 44 digits, so
//! a 45-digit value always fits in exactly 15 codewords.

/// Largest digit chunk a single codeword group can carry
pub const MAX_NUMERIC_CHUNK: usize = 44;
/// Codewords produced by a full 44-digit chunk
pub const FULL_CHUNK_CODEWORDS: usize = 15;

/// Convert ASCII digits (with the leading 1 already prepended) into
/// base-900 codewords, most significant first.
pub fn digits_to_codewords(digits: &[u8]) -> Vec<u16> {
    let mut number: Vec<u8> = digits.iter().map(|&d| d - b'0').collect();
    let mut codewords = Vec::new();
    while !number.is_empty() {
        let mut remainder: u32 = 0;
        let mut quotient = Vec::with_capacity(number.len());
        for &digit in &number {
            let current = remainder * 10 + digit as u32;
            quotient.push((current / 900) as u8);
            remainder = current % 900;
        }
        codewords.push(remainder as u16);
        let first_nonzero = quotient.iter().position(|&d| d != 0);
        number = match first_nonzero {
            Some(n) => quotient.split_off(n),
            None => Vec::new(),
        };
    }
    codewords.reverse();
    codewords
}

/// Expand a codeword group back into its decimal digits and strip the
/// leading 1 marker. Returns `None` when the marker is missing.
pub fn codewords_to_digits(codewords: &[u16]) -> Option<String> {
    // Accumulate value * 900 + codeword in a little-endian digit vector
    let mut digits: Vec<u8> = vec![0];
    for &codeword in codewords {
        let mut carry = codeword as u32;
        for digit in digits.iter_mut() {
            let current = *digit as u32 * 900 + carry;
            *digit = (current % 10) as u8;
            carry = current / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    if digits.last() != Some(&1) {
        return None;
    }
    digits.pop();
    if digits.is_empty() {
        return Some(String::new());
    }
    Some(
        digits
            .iter()
            .rev()
            .map(|&d| (b'0' + d) as char)
            .collect(),
    )
}
