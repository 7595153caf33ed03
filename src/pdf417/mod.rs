//! PDF417 encoder and decoder
//!
//! - Text, numeric and byte compaction with automatic segmentation
//! - Reed-Solomon error correction over GF(929), levels 0 through 8
//! - Generated symbol character tables for all three cluster sets
//! - Full and compact (truncated) symbol layouts
//! - Matrix and pixel-buffer decoding with candidate geometry search

pub mod modulus;
pub mod numeric;
pub mod tables;

mod decoder;
mod encoder;

pub use decoder::{decode, decode_pixels};
pub use encoder::{Compaction, EncodeOptions, encode, encode_bytes};
