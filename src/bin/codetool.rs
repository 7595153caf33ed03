//! Command-line encoder and decoder for Data Matrix and PDF417 symbols.
//!
//! Usage:
//!   codetool encode <datamatrix|pdf417> <text> <output.png>
//!   codetool decode <datamatrix|pdf417> <input.png>

use std::env;
use std::process::ExitCode;

use image::{Rgba, RgbaImage};
use matrixcode::datamatrix;
use matrixcode::models::BitMatrix;
use matrixcode::pdf417;
use matrixcode::pixels::PixelFormat;

const MODULE_SIZE: u32 = 4;
const QUIET_ZONE: u32 = 4;

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["encode", symbology, text, output] => run_encode(symbology, text, output),
        ["decode", symbology, input] => run_decode(symbology, input),
        _ => {
            eprintln!("usage: codetool encode <datamatrix|pdf417> <text> <output.png>");
            eprintln!("       codetool decode <datamatrix|pdf417> <input.png>");
            ExitCode::from(2)
        }
    }
}

fn run_encode(symbology: &str, text: &str, output: &str) -> ExitCode {
    let matrix = match symbology {
        "datamatrix" => datamatrix::encode(text, datamatrix::EncodingMode::Auto),
        "pdf417" => pdf417::encode(text, &pdf417::EncodeOptions::default()),
        other => {
            eprintln!("unknown symbology: {other}");
            return ExitCode::from(2);
        }
    };

    let matrix = match matrix {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("encoding failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let img = render(&matrix);
    match img.save(output) {
        Ok(()) => {
            println!(
                "wrote {output}: {}x{} modules at scale {MODULE_SIZE}",
                matrix.width(),
                matrix.height()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to write {output}: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_decode(symbology: &str, input: &str) -> ExitCode {
    let img = match image::open(input) {
        Ok(img) => img.to_rgba8(),
        Err(err) => {
            eprintln!("failed to open {input}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let (width, height) = img.dimensions();
    let stride = width as usize * 4;
    let pixels = img.into_raw();

    let decoded = match symbology {
        "datamatrix" => datamatrix::decode_pixels(
            &pixels,
            width as usize,
            height as usize,
            stride,
            PixelFormat::Rgba32,
        ),
        "pdf417" => pdf417::decode_pixels(
            &pixels,
            width as usize,
            height as usize,
            stride,
            PixelFormat::Rgba32,
        ),
        other => {
            eprintln!("unknown symbology: {other}");
            return ExitCode::from(2);
        }
    };

    match decoded {
        Some(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("no symbol found in {input}");
            ExitCode::FAILURE
        }
    }
}

fn render(matrix: &BitMatrix) -> RgbaImage {
    let width = (matrix.width() as u32 + 2 * QUIET_ZONE) * MODULE_SIZE;
    let height = (matrix.height() as u32 + 2 * QUIET_ZONE) * MODULE_SIZE;
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    for y in 0..matrix.height() {
        for x in 0..matrix.width() {
            if !matrix.get(x, y) {
                continue;
            }
            let px = (x as u32 + QUIET_ZONE) * MODULE_SIZE;
            let py = (y as u32 + QUIET_ZONE) * MODULE_SIZE;
            for dy in 0..MODULE_SIZE {
                for dx in 0..MODULE_SIZE {
                    img.put_pixel(px + dx, py + dy, Rgba([0, 0, 0, 255]));
                }
            }
        }
    }

    img
}
