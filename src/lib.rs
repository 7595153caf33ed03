//! matrixcode - 2D matrix barcode encoding and decoding
//!
//! A pure Rust library for Data Matrix (ECC200) and PDF417 symbols:
//! encoding text or bytes into module matrices and reading them back
//! from matrices or raw pixel buffers.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Data Matrix (ECC200) encoding and decoding
pub mod datamatrix;
/// Error types for the encode entry points
pub mod error;
/// Core data structures (BitMatrix)
pub mod models;
/// PDF417 encoding and decoding
pub mod pdf417;
/// Pixel localization and sampling shared by both symbologies
pub mod pixels;

pub use error::EncodeError;
pub use models::BitMatrix;
pub use pixels::PixelFormat;
