//! Data Matrix (ECC200) encoder and decoder
//!
//! - ASCII and Base 256 encodation with automatic selection
//! - Reed-Solomon error correction over GF(256), interleaved blocks
//! - Standard codeword placement with corner patterns and wrapping
//! - Finder border and timing pattern assembly for all 24 square sizes
//! - Matrix and pixel-buffer decoding with rotation search

pub mod galois;
pub mod placement;
pub mod reed_solomon;
pub mod symbols;

mod decoder;
mod encoder;

pub use decoder::{decode, decode_pixels};
pub use encoder::{EncodingMode, encode, encode_bytes};
