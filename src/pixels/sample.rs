/// Module-grid sampling and border cleanup
use crate::models::BitMatrix;

use super::region::BoundingBox;

/// Sample a `cols` x `rows` module grid out of the dark map.
///
/// The grid is centered in the bounding box and each module is read at
/// its pixel center, clamped to the image so off-by-one boxes never
/// read out of bounds.
pub fn sample_grid(
    map: &BitMatrix,
    bbox: &BoundingBox,
    cols: usize,
    rows: usize,
    module_size: usize,
    invert: bool,
) -> BitMatrix {
    let mut grid = BitMatrix::new(cols, rows);
    if cols == 0 || rows == 0 || module_size == 0 {
        return grid;
    }

    let total_w = (cols * module_size) as isize;
    let total_h = (rows * module_size) as isize;
    let offset_x = bbox.left as isize + (bbox.width() as isize - total_w) / 2;
    let offset_y = bbox.top as isize + (bbox.height() as isize - total_h) / 2;
    let half = (module_size / 2) as isize;

    for row in 0..rows {
        let py = offset_y + (row * module_size) as isize + half;
        let py = py.clamp(0, map.height() as isize - 1) as usize;
        for col in 0..cols {
            let px = offset_x + (col * module_size) as isize + half;
            let px = px.clamp(0, map.width() as isize - 1) as usize;
            if map.get(px, py) != invert {
                grid.set(col, row, true);
            }
        }
    }
    grid
}

/// Drop sparse edge rows and columns from a sampled module grid.
///
/// A misjudged module size or box can leave a rim of mostly-light
/// modules around the real symbol. Returns the trimmed grid, or `None`
/// when nothing was trimmed or everything would be.
pub fn trim_module_border(grid: &BitMatrix) -> Option<BitMatrix> {
    if grid.width() == 0 || grid.height() == 0 {
        return None;
    }
    let row_threshold = (grid.width() / 40).max(1);
    let col_threshold = (grid.height() / 40).max(1);

    let count_row = |y: usize, left: usize, right: usize| -> usize {
        (left..=right).filter(|&x| grid.get(x, y)).count()
    };
    let count_col = |x: usize, top: usize, bottom: usize| -> usize {
        (top..=bottom).filter(|&y| grid.get(x, y)).count()
    };

    let mut left = 0usize;
    let mut top = 0usize;
    let mut right = grid.width() - 1;
    let mut bottom = grid.height() - 1;

    while top < bottom && count_row(top, left, right) <= row_threshold {
        top += 1;
    }
    while bottom > top && count_row(bottom, left, right) <= row_threshold {
        bottom -= 1;
    }
    while left < right && count_col(left, top, bottom) <= col_threshold {
        left += 1;
    }
    while right > left && count_col(right, top, bottom) <= col_threshold {
        right -= 1;
    }

    if left == 0 && top == 0 && right == grid.width() - 1 && bottom == grid.height() - 1 {
        return None;
    }
    if right <= left || bottom <= top {
        return None;
    }

    let mut trimmed = BitMatrix::new(right - left + 1, bottom - top + 1);
    for y in top..=bottom {
        for x in left..=right {
            if grid.get(x, y) {
                trimmed.set(x - left, y - top, true);
            }
        }
    }
    Some(trimmed)
}
