//! ECC200 codeword placement
//!
//! The "Utah" diagonal traversal maps each codeword onto 8 interior modules,
//! with four table-driven corner shapes where the staircase runs off-grid.
//! Placement and extraction share the same traversal, so
//! `read_codewords(place_codewords(cw)) == cw` for every geometry.

use crate::models::BitMatrix;

/// Module coordinates (row, col) for every codeword of a `rows` x `cols`
/// data region, in traversal order. Bit 0 of a codeword is its most
/// significant bit and maps to the first coordinate.
fn codeword_positions(rows: usize, cols: usize) -> Vec<[(usize, usize); 8]> {
    let rr = rows as i32;
    let cc = cols as i32;
    let mut assigned = vec![false; rows * cols];
    let mut positions: Vec<[(usize, usize); 8]> = Vec::new();

    let mut emit = |assigned: &mut [bool], coords: [(i32, i32); 8]| {
        let mut out = [(0usize, 0usize); 8];
        for (k, &(row, col)) in coords.iter().enumerate() {
            let mut row = row;
            let mut col = col;
            if row < 0 {
                row += rr;
                col += 4 - ((rr + 4) % 8);
            }
            if col < 0 {
                col += cc;
                row += 4 - ((cc + 4) % 8);
            }
            let idx = row as usize * cols + col as usize;
            debug_assert!(!assigned[idx], "module visited twice at ({row},{col})");
            assigned[idx] = true;
            out[k] = (row as usize, col as usize);
        }
        positions.push(out);
    };

    let mut row: i32 = 4;
    let mut col: i32 = 0;

    loop {
        if row == rr && col == 0 {
            emit(
                &mut assigned,
                [
                    (rr - 1, 0),
                    (rr - 1, 1),
                    (rr - 1, 2),
                    (0, cc - 2),
                    (0, cc - 1),
                    (1, cc - 1),
                    (2, cc - 1),
                    (3, cc - 1),
                ],
            );
        }
        if row == rr - 2 && col == 0 && cc % 4 != 0 {
            emit(
                &mut assigned,
                [
                    (rr - 3, 0),
                    (rr - 2, 0),
                    (rr - 1, 0),
                    (0, cc - 4),
                    (0, cc - 3),
                    (0, cc - 2),
                    (0, cc - 1),
                    (1, cc - 1),
                ],
            );
        }
        if row == rr - 2 && col == 0 && cc % 8 == 4 {
            emit(
                &mut assigned,
                [
                    (rr - 3, 0),
                    (rr - 2, 0),
                    (rr - 1, 0),
                    (0, cc - 2),
                    (0, cc - 1),
                    (1, cc - 1),
                    (2, cc - 1),
                    (3, cc - 1),
                ],
            );
        }
        if row == rr + 4 && col == 2 && cc % 8 == 0 {
            emit(
                &mut assigned,
                [
                    (rr - 1, 0),
                    (rr - 1, cc - 1),
                    (0, cc - 3),
                    (0, cc - 2),
                    (0, cc - 1),
                    (1, cc - 3),
                    (1, cc - 2),
                    (1, cc - 1),
                ],
            );
        }

        // Sweep up and to the right
        loop {
            if row < rr
                && col >= 0
                && !assigned[row as usize * cols + col as usize]
            {
                emit(
                    &mut assigned,
                    [
                        (row - 2, col - 2),
                        (row - 2, col - 1),
                        (row - 1, col - 2),
                        (row - 1, col - 1),
                        (row - 1, col),
                        (row, col - 2),
                        (row, col - 1),
                        (row, col),
                    ],
                );
            }
            row -= 2;
            col += 2;
            if !(row >= 0 && col < cc) {
                break;
            }
        }
        row += 1;
        col += 3;

        // Sweep down and to the left
        loop {
            if row >= 0
                && col < cc
                && !assigned[row as usize * cols + col as usize]
            {
                emit(
                    &mut assigned,
                    [
                        (row - 2, col - 2),
                        (row - 2, col - 1),
                        (row - 1, col - 2),
                        (row - 1, col - 1),
                        (row - 1, col),
                        (row, col - 2),
                        (row, col - 1),
                        (row, col),
                    ],
                );
            }
            row += 2;
            col -= 2;
            if !(row < rr && col >= 0) {
                break;
            }
        }
        row += 3;
        col += 1;

        if !(row < rr || col < cc) {
            break;
        }
    }

    positions
}

/// Place codewords into a data region grid of the given size.
/// `codewords` must exactly fill the grid's codeword capacity.
pub fn place_codewords(codewords: &[u8], rows: usize, cols: usize) -> BitMatrix {
    let positions = codeword_positions(rows, cols);
    debug_assert_eq!(codewords.len(), positions.len());

    let mut matrix = BitMatrix::new(cols, rows);
    for (cw, modules) in codewords.iter().zip(&positions) {
        for (bit, &(row, col)) in modules.iter().enumerate() {
            if cw & (0x80 >> bit) != 0 {
                matrix.set(col, row, true);
            }
        }
    }

    // Bottom-right 2x2 filler when the interior is not a multiple of 8
    if 8 * positions.len() + 4 == rows * cols {
        matrix.set(cols - 1, rows - 1, true);
        matrix.set(cols - 2, rows - 2, true);
    }

    matrix
}

/// Read codewords back out of a data region grid
pub fn read_codewords(modules: &BitMatrix, codeword_count: usize) -> Vec<u8> {
    let rows = modules.height();
    let cols = modules.width();
    let positions = codeword_positions(rows, cols);

    let mut codewords = Vec::with_capacity(codeword_count);
    for modules_of_cw in positions.iter().take(codeword_count) {
        let mut cw = 0u8;
        for (bit, &(row, col)) in modules_of_cw.iter().enumerate() {
            if modules.get(col, row) {
                cw |= 0x80 >> bit;
            }
        }
        codewords.push(cw);
    }
    codewords
}

/// Codeword capacity of a data region grid
pub fn codeword_capacity(rows: usize, cols: usize) -> usize {
    rows * cols / 8
}
