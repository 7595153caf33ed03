//! Pixel localizer and sampler
//!
//! Shared by both symbologies: luminance thresholding, dual-polarity
//! bounding-box search with noise trimming, run-length module-size
//! estimation, and module-center grid sampling.

pub mod luma;
pub mod region;
pub mod sample;

pub use luma::{PixelFormat, threshold};
pub use region::{BoundingBox, estimate_module_size, find_bounding_box};
pub use sample::{sample_grid, trim_module_border};
