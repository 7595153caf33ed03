/// Luminance thresholding for 32-bit pixel buffers
/// Y = (77*R + 150*G + 29*B) >> 8, dark when Y < 128
use rayon::prelude::*;

use crate::models::BitMatrix;

/// Coefficients for luminance conversion: Y = (77*R + 150*G + 29*B) >> 8
const COEF_R: i32 = 77;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;

/// Global luminance cutoff below which a pixel counts as dark
const DARK_THRESHOLD: i32 = 128;

/// Minimum row count before row-parallel processing pays off
const PARALLEL_ROW_THRESHOLD: usize = 64;

/// Channel layout of a 4-bytes-per-pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Red, green, blue, alpha byte order
    Rgba32,
    /// Blue, green, red, alpha byte order
    Bgra32,
}

impl PixelFormat {
    /// Byte offsets of the (red, green, blue) channels within a pixel
    fn channel_offsets(self) -> (usize, usize, usize) {
        match self {
            PixelFormat::Rgba32 => (0, 1, 2),
            PixelFormat::Bgra32 => (2, 1, 0),
        }
    }
}

/// Convert a 32-bit pixel buffer into a dark-pixel bitmap.
///
/// `stride` is the distance in bytes between the starts of consecutive
/// rows. Returns `None` when the buffer is too small for the declared
/// dimensions, never panics on malformed input.
pub fn threshold(
    pixels: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
) -> Option<BitMatrix> {
    if width == 0 || height == 0 || stride < width * 4 {
        return None;
    }
    let last_row_end = (height - 1).checked_mul(stride)?.checked_add(width * 4)?;
    if pixels.len() < last_row_end {
        return None;
    }

    let (ro, go, bo) = format.channel_offsets();
    let mut dark = vec![0u8; width * height];

    let classify_row = |y: usize, row: &mut [u8]| {
        let row_start = y * stride;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 4;
            let r = pixels[idx + ro] as i32;
            let g = pixels[idx + go] as i32;
            let b = pixels[idx + bo] as i32;
            let lum = (COEF_R * r + COEF_G * g + COEF_B * b) >> 8;
            *out = (lum < DARK_THRESHOLD) as u8;
        }
    };

    if height >= PARALLEL_ROW_THRESHOLD {
        // Process rows in parallel
        dark.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| classify_row(y, row));
    } else {
        for (y, row) in dark.chunks_mut(width).enumerate() {
            classify_row(y, row);
        }
    }

    let mut map = BitMatrix::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if dark[y * width + x] != 0 {
                map.set(x, y, true);
            }
        }
    }
    Some(map)
}
