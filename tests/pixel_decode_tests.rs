//! Integration tests for the pixel decoding pipeline: rendered symbols are
//! converted back to raw RGBA/BGRA buffers and decoded through the full
//! localizer, grid sampler, and codeword path.

use matrixcode::models::BitMatrix;
use matrixcode::pixels::PixelFormat;
use matrixcode::{datamatrix, pdf417};

const MODULE_SIZE: usize = 4;
const QUIET_ZONE: usize = 8;

/// Render a module matrix into an RGBA pixel buffer with a quiet zone.
fn render(matrix: &BitMatrix, invert: bool) -> (Vec<u8>, usize, usize) {
    render_scaled(matrix, invert, MODULE_SIZE, QUIET_ZONE)
}

fn render_scaled(
    matrix: &BitMatrix,
    invert: bool,
    module_size: usize,
    quiet_zone: usize,
) -> (Vec<u8>, usize, usize) {
    let width = (matrix.width() + 2 * quiet_zone) * module_size;
    let height = (matrix.height() + 2 * quiet_zone) * module_size;
    let (dark, light) = if invert { (255u8, 0u8) } else { (0u8, 255u8) };
    let mut pixels = vec![0u8; width * height * 4];

    for y in 0..height {
        for x in 0..width {
            let mx = (x / module_size).wrapping_sub(quiet_zone);
            let my = (y / module_size).wrapping_sub(quiet_zone);
            let value = if matrix.get(mx, my) { dark } else { light };
            let offset = (y * width + x) * 4;
            pixels[offset] = value;
            pixels[offset + 1] = value;
            pixels[offset + 2] = value;
            pixels[offset + 3] = 255;
        }
    }

    (pixels, width, height)
}

fn datamatrix_pixel_roundtrip(text: &str) {
    let matrix = datamatrix::encode(text, datamatrix::EncodingMode::Auto)
        .expect("encoding should succeed");
    let (pixels, width, height) = render(&matrix, false);
    let decoded = datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("pixel decoding should succeed");
    assert_eq!(decoded, text);
}

fn pdf417_pixel_roundtrip(text: &str) {
    let matrix =
        pdf417::encode(text, &pdf417::EncodeOptions::default()).expect("encoding should succeed");
    let (pixels, width, height) = render(&matrix, false);
    let decoded = pdf417::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("pixel decoding should succeed");
    assert_eq!(decoded, text);
}

#[test]
fn datamatrix_clean_render() {
    datamatrix_pixel_roundtrip("Pixel pipeline check 123");
    datamatrix_pixel_roundtrip("9876543210");
}

#[test]
fn pdf417_clean_render() {
    pdf417_pixel_roundtrip("Pixel pipeline check 123");
    pdf417_pixel_roundtrip("12345678901234567890");
}

#[test]
fn module_sizes_and_quiet_zones() {
    let text = "scale sweep 42";
    let dm = datamatrix::encode(text, datamatrix::EncodingMode::Auto)
        .expect("encoding should succeed");
    let pdf = pdf417::encode(text, &pdf417::EncodeOptions::default())
        .expect("encoding should succeed");
    for (module_size, quiet_zone) in [(2usize, 2usize), (3, 4), (6, 1)] {
        let (pixels, width, height) = render_scaled(&dm, false, module_size, quiet_zone);
        let decoded =
            datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
                .unwrap_or_else(|| panic!("dm at scale {module_size} quiet {quiet_zone}"));
        assert_eq!(decoded, text);

        let (pixels, width, height) = render_scaled(&pdf, false, module_size, quiet_zone);
        let decoded =
            pdf417::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
                .unwrap_or_else(|| panic!("pdf417 at scale {module_size} quiet {quiet_zone}"));
        assert_eq!(decoded, text);
    }
}

#[test]
fn datamatrix_inverted_polarity() {
    let matrix = datamatrix::encode("light on dark", datamatrix::EncodingMode::Auto)
        .expect("encoding should succeed");
    let (pixels, width, height) = render(&matrix, true);
    let decoded = datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("inverted symbol should decode");
    assert_eq!(decoded, "light on dark");
}

#[test]
fn pdf417_inverted_polarity() {
    let matrix = pdf417::encode("light on dark", &pdf417::EncodeOptions::default())
        .expect("encoding should succeed");
    let (pixels, width, height) = render(&matrix, true);
    let decoded = pdf417::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("inverted symbol should decode");
    assert_eq!(decoded, "light on dark");
}

#[test]
fn datamatrix_rotated_renders() {
    let text = "rotation sweep";
    let matrix =
        datamatrix::encode(text, datamatrix::EncodingMode::Auto).expect("encoding should succeed");
    for rotated in [matrix.rotate90(), matrix.rotate180(), matrix.rotate270()] {
        let (pixels, width, height) = render(&rotated, false);
        let decoded =
            datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
                .expect("rotated symbol should decode");
        assert_eq!(decoded, text);
    }
}

#[test]
fn pdf417_rotated_renders() {
    let text = "rotation sweep";
    let matrix =
        pdf417::encode(text, &pdf417::EncodeOptions::default()).expect("encoding should succeed");
    for rotated in [matrix.rotate90(), matrix.rotate180(), matrix.rotate270()] {
        let (pixels, width, height) = render(&rotated, false);
        let decoded =
            pdf417::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
                .expect("rotated symbol should decode");
        assert_eq!(decoded, text);
    }
}

#[test]
fn bgra_channel_order() {
    let text = "channel order";
    let matrix =
        datamatrix::encode(text, datamatrix::EncodingMode::Auto).expect("encoding should succeed");
    let (mut pixels, width, height) = render(&matrix, false);
    // Swap R and B so the buffer is BGRA.
    for chunk in pixels.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
    let decoded = datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Bgra32)
        .expect("BGRA buffer should decode");
    assert_eq!(decoded, text);
}

#[test]
fn sparse_noise_outside_symbol() {
    let text = "noise tolerance";
    let matrix =
        datamatrix::encode(text, datamatrix::EncodingMode::Auto).expect("encoding should succeed");
    let (mut pixels, width, height) = render(&matrix, false);
    // Isolated dark dots in the quiet zone corners, below the trim threshold.
    for (x, y) in [(1, 1), (width - 2, 2), (2, height - 2)] {
        let offset = (y * width + x) * 4;
        pixels[offset] = 0;
        pixels[offset + 1] = 0;
        pixels[offset + 2] = 0;
    }
    let decoded = datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("isolated noise should be trimmed");
    assert_eq!(decoded, text);
}

/// Overwrite the outer three pixel rows and columns with a dense field
/// of single-pixel dark dots covering roughly half the frame area.
fn add_noise_frame(pixels: &mut [u8], width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            let frame = x < 3 || x >= width - 3 || y < 3 || y >= height - 3;
            if frame && (x + y) % 2 == 0 && (x * 5 + y * 3) % 7 != 0 {
                let offset = (y * width + x) * 4;
                pixels[offset] = 0;
                pixels[offset + 1] = 0;
                pixels[offset + 2] = 0;
            }
        }
    }
}

#[test]
fn dense_noise_frame_outside_quiet_zone() {
    let text = "noise frame tolerance";

    let matrix = datamatrix::encode(text, datamatrix::EncodingMode::Auto)
        .expect("encoding should succeed");
    let (mut pixels, width, height) = render_scaled(&matrix, false, 4, 2);
    add_noise_frame(&mut pixels, width, height);
    let decoded = datamatrix::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("noise frame should be trimmed");
    assert_eq!(decoded, text);

    let matrix =
        pdf417::encode(text, &pdf417::EncodeOptions::default()).expect("encoding should succeed");
    let (mut pixels, width, height) = render_scaled(&matrix, false, 4, 2);
    add_noise_frame(&mut pixels, width, height);
    let decoded = pdf417::decode_pixels(&pixels, width, height, width * 4, PixelFormat::Rgba32)
        .expect("noise frame should be trimmed");
    assert_eq!(decoded, text);
}

#[test]
fn malformed_buffers_do_not_panic() {
    // Too-short buffer, zero dimensions, stride smaller than the row width.
    assert_eq!(
        datamatrix::decode_pixels(&[0u8; 8], 100, 100, 400, PixelFormat::Rgba32),
        None
    );
    assert_eq!(
        pdf417::decode_pixels(&[], 0, 0, 0, PixelFormat::Rgba32),
        None
    );
    let pixels = vec![255u8; 64 * 64 * 4];
    assert_eq!(
        datamatrix::decode_pixels(&pixels, 64, 64, 16, PixelFormat::Rgba32),
        None
    );
}

#[test]
fn blank_image_yields_nothing() {
    let pixels = vec![255u8; 128 * 128 * 4];
    assert_eq!(
        datamatrix::decode_pixels(&pixels, 128, 128, 128 * 4, PixelFormat::Rgba32),
        None
    );
    assert_eq!(
        pdf417::decode_pixels(&pixels, 128, 128, 128 * 4, PixelFormat::Rgba32),
        None
    );
}
