//! Encode-side error type
//!
//! Encoding signals invalid input and capacity overflow via `Result`;
//! decoding never errors, it reports failure as `Option::None` so retry
//! loops (rotations, candidates, polarities) stay cheap.

use thiserror::Error;

/// Errors reported by the encode entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Input text or byte slice was empty
    #[error("input is empty")]
    Empty,

    /// Data does not fit in the largest supported symbol
    #[error("data exceeds symbol capacity ({needed} codewords, {available} available)")]
    CapacityExceeded {
        /// Codewords required by the input
        needed: usize,
        /// Capacity of the largest symbol
        available: usize,
    },

    /// Input contains characters the requested mode cannot represent
    #[error("input not representable in the requested encodation mode")]
    UnsupportedContent,

    /// Caller-supplied options are out of range or contradictory
    #[error("invalid encode options: {0}")]
    InvalidOptions(&'static str),
}
