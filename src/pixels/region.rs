/// Bounding-box localization and module-size estimation on a dark map
use crate::models::BitMatrix;

/// Inclusive pixel rectangle around a candidate symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl BoundingBox {
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }
}

#[inline]
fn dark_at(map: &BitMatrix, x: usize, y: usize, invert: bool) -> bool {
    map.get(x, y) != invert
}

fn count_dark_row(map: &BitMatrix, y: usize, left: usize, right: usize, invert: bool) -> usize {
    (left..=right).filter(|&x| dark_at(map, x, y, invert)).count()
}

fn count_dark_col(map: &BitMatrix, x: usize, top: usize, bottom: usize, invert: bool) -> usize {
    (top..=bottom).filter(|&y| dark_at(map, x, y, invert)).count()
}

fn min_dark_run_row(map: &BitMatrix, y: usize, left: usize, right: usize, invert: bool) -> usize {
    min_dark_run((left..=right).map(|x| dark_at(map, x, y, invert)))
}

fn min_dark_run_col(map: &BitMatrix, x: usize, top: usize, bottom: usize, invert: bool) -> usize {
    min_dark_run((top..=bottom).map(|y| dark_at(map, x, y, invert)))
}

/// Shortest dark run along a scan line, or `usize::MAX` when the line
/// holds no dark pixel at all.
fn min_dark_run(colors: impl Iterator<Item = bool>) -> usize {
    let mut shortest = usize::MAX;
    let mut run = 0usize;
    for dark in colors {
        if dark {
            run += 1;
        } else if run > 0 {
            shortest = shortest.min(run);
            run = 0;
        }
    }
    if run > 0 {
        shortest = shortest.min(run);
    }
    shortest
}

/// Shortest same-color run across the central halves of the two box
/// midlines. Runs touching a segment end are ignored since they may be
/// cut short. `None` when neither segment has a complete run.
fn interior_run_estimate(map: &BitMatrix, bbox: &BoundingBox, invert: bool) -> Option<usize> {
    let (w, h) = (bbox.width(), bbox.height());
    let y = bbox.top + h / 2;
    let x = bbox.left + w / 2;
    let row = min_inner_run(
        (bbox.left + w / 4..=bbox.right - w / 4).map(|x| dark_at(map, x, y, invert)),
    );
    let col = min_inner_run(
        (bbox.top + h / 4..=bbox.bottom - h / 4).map(|y| dark_at(map, x, y, invert)),
    );
    let shortest = row.min(col);
    (shortest != usize::MAX).then_some(shortest)
}

fn min_inner_run(mut colors: impl Iterator<Item = bool>) -> usize {
    let mut shortest = usize::MAX;
    let Some(mut current) = colors.next() else {
        return shortest;
    };
    let mut run = 1usize;
    let mut interior = false;
    for color in colors {
        if color == current {
            run += 1;
            continue;
        }
        if interior {
            shortest = shortest.min(run);
        }
        interior = true;
        current = color;
        run = 1;
    }
    shortest
}

/// Locate the extent of dark pixels, then shave off sparse edge rows
/// and columns so isolated noise outside the symbol does not stretch
/// the box. Falls back to the raw extent when trimming leaves less
/// than a 3x3 area.
pub fn find_bounding_box(map: &BitMatrix, invert: bool) -> Option<BoundingBox> {
    let mut found = false;
    let (mut left, mut top) = (usize::MAX, usize::MAX);
    let (mut right, mut bottom) = (0usize, 0usize);
    for y in 0..map.height() {
        for x in 0..map.width() {
            if dark_at(map, x, y, invert) {
                found = true;
                left = left.min(x);
                right = right.max(x);
                top = top.min(y);
                bottom = bottom.max(y);
            }
        }
    }
    if !found {
        return None;
    }
    let raw = BoundingBox {
        left,
        top,
        right,
        bottom,
    };
    match trim_bounding_box(map, raw, invert) {
        Some(trimmed) if trimmed.width() >= 3 && trimmed.height() >= 3 => Some(trimmed),
        _ => Some(raw),
    }
}

fn trim_bounding_box(map: &BitMatrix, bbox: BoundingBox, invert: bool) -> Option<BoundingBox> {
    let row_threshold = (bbox.width() / 40).max(2);
    let col_threshold = (bbox.height() / 40).max(2);
    // Edge rows made of single-pixel dark runs are noise, however
    // dense, once the box interior shows runs at module scale.
    let run_cut = match interior_run_estimate(map, &bbox, invert) {
        Some(run) if run >= 3 => 2,
        _ => 0,
    };
    let BoundingBox {
        mut left,
        mut top,
        mut right,
        mut bottom,
    } = bbox;

    let strip_row = |y: usize, left: usize, right: usize| {
        count_dark_row(map, y, left, right, invert) <= row_threshold
            || min_dark_run_row(map, y, left, right, invert) < run_cut
    };
    let strip_col = |x: usize, top: usize, bottom: usize| {
        count_dark_col(map, x, top, bottom, invert) <= col_threshold
            || min_dark_run_col(map, x, top, bottom, invert) < run_cut
    };

    while top < bottom && strip_row(top, left, right) {
        top += 1;
    }
    while bottom > top && strip_row(bottom, left, right) {
        bottom -= 1;
    }
    while left < right && strip_col(left, top, bottom) {
        left += 1;
    }
    while right > left && strip_col(right, top, bottom) {
        right -= 1;
    }

    if right > left && bottom > top {
        Some(BoundingBox {
            left,
            top,
            right,
            bottom,
        })
    } else {
        None
    }
}

/// Estimate the module size in pixels as the shortest same-color run
/// along the box edges and midlines. Timing edges and start patterns
/// contain single-module runs, so the minimum converges on the true
/// module size for clean renders.
pub fn estimate_module_size(map: &BitMatrix, bbox: &BoundingBox, invert: bool) -> Option<usize> {
    if bbox.width() < 2 || bbox.height() < 2 {
        return None;
    }

    let mut min_run = usize::MAX;

    let mut scan_row = |y: usize| {
        let mut run = 1usize;
        for x in bbox.left + 1..=bbox.right {
            if dark_at(map, x, y, invert) == dark_at(map, x - 1, y, invert) {
                run += 1;
            } else {
                min_run = min_run.min(run);
                run = 1;
            }
        }
        min_run = min_run.min(run);
    };
    scan_row(bbox.top);
    scan_row(bbox.bottom);
    scan_row(bbox.top + bbox.height() / 2);

    let mut scan_col = |x: usize| {
        let mut run = 1usize;
        for y in bbox.top + 1..=bbox.bottom {
            if dark_at(map, x, y, invert) == dark_at(map, x, y - 1, invert) {
                run += 1;
            } else {
                min_run = min_run.min(run);
                run = 1;
            }
        }
        min_run = min_run.min(run);
    };
    scan_col(bbox.left);
    scan_col(bbox.right);
    scan_col(bbox.left + bbox.width() / 2);

    if min_run == usize::MAX || min_run == 0 {
        None
    } else {
        Some(min_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_rect(w: usize, h: usize, b: BoundingBox) -> BitMatrix {
        let mut m = BitMatrix::new(w, h);
        for y in b.top..=b.bottom {
            for x in b.left..=b.right {
                m.set(x, y, true);
            }
        }
        m
    }

    #[test]
    fn test_bounding_box_of_solid_rect() {
        let rect = BoundingBox {
            left: 3,
            top: 4,
            right: 12,
            bottom: 11,
        };
        let m = map_with_rect(20, 20, rect);
        assert_eq!(find_bounding_box(&m, false), Some(rect));
    }

    #[test]
    fn test_bounding_box_none_when_blank() {
        let m = BitMatrix::new(10, 10);
        assert!(find_bounding_box(&m, false).is_none());
        // Inverted polarity sees the blank map as all dark
        let b = find_bounding_box(&m, true).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                left: 0,
                top: 0,
                right: 9,
                bottom: 9
            }
        );
    }

    #[test]
    fn test_trim_ignores_isolated_noise() {
        let rect = BoundingBox {
            left: 10,
            top: 10,
            right: 40,
            bottom: 40,
        };
        let mut m = map_with_rect(60, 60, rect);
        // Scatter isolated specks well outside the symbol
        m.set(2, 3, true);
        m.set(55, 5, true);
        m.set(4, 57, true);
        assert_eq!(find_bounding_box(&m, false), Some(rect));
    }

    #[test]
    fn test_trim_discards_dense_noise_frame() {
        // A 4px-module checker block separated by blank rows from a
        // dense frame of single-pixel noise along the map border
        let mut m = BitMatrix::new(60, 60);
        for y in 12..=43 {
            for x in 12..=43 {
                if (((x - 12) / 4) + ((y - 12) / 4)) % 2 == 0 {
                    m.set(x, y, true);
                }
            }
        }
        for y in 0..60 {
            for x in 0..60 {
                let frame = x < 3 || x >= 57 || y < 3 || y >= 57;
                if frame && (x + y) % 2 == 0 && (x * 5 + y * 3) % 7 != 0 {
                    m.set(x, y, true);
                }
            }
        }
        assert_eq!(
            find_bounding_box(&m, false),
            Some(BoundingBox {
                left: 12,
                top: 12,
                right: 43,
                bottom: 43
            })
        );
    }

    #[test]
    fn test_module_size_from_alternating_edge() {
        // Checkerboard of 3x3 pixel modules
        let mut m = BitMatrix::new(30, 30);
        for y in 0..30 {
            for x in 0..30 {
                if ((x / 3) + (y / 3)) % 2 == 0 {
                    m.set(x, y, true);
                }
            }
        }
        let bbox = BoundingBox {
            left: 0,
            top: 0,
            right: 29,
            bottom: 29,
        };
        assert_eq!(estimate_module_size(&m, &bbox, false), Some(3));
    }
}
