/// Compact bit matrix for storing module states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create a new bit matrix with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height + 7) / 8;
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        (self.data[byte_index] >> bit_index) & 1 == 1
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Toggle bit at (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        self.data[byte_index] ^= 1 << bit_index;
    }

    /// Clear all bits to 0
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Get raw data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Rotate 90 degrees clockwise
    pub fn rotate90(&self) -> BitMatrix {
        let mut out = BitMatrix::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(self.height - 1 - y, x, true);
                }
            }
        }
        out
    }

    /// Rotate 180 degrees
    pub fn rotate180(&self) -> BitMatrix {
        let mut out = BitMatrix::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(self.width - 1 - x, self.height - 1 - y, true);
                }
            }
        }
        out
    }

    /// Rotate 270 degrees clockwise (90 counter-clockwise)
    pub fn rotate270(&self) -> BitMatrix {
        let mut out = BitMatrix::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(y, self.width - 1 - x, true);
                }
            }
        }
        out
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_matrix() {
        let mut matrix = BitMatrix::new(8, 8);
        assert_eq!(matrix.width(), 8);
        assert_eq!(matrix.height(), 8);

        matrix.set(3, 4, true);
        assert!(matrix.get(3, 4));
        assert!(!matrix.get(3, 3));

        matrix.toggle(3, 4);
        assert!(!matrix.get(3, 4));

        matrix.clear();
        assert!(!matrix.get(3, 4));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut matrix = BitMatrix::new(8, 8);
        matrix.set(10, 10, true); // Should not panic
        assert!(!matrix.get(10, 10));
    }

    #[test]
    fn test_rotations() {
        // 3x2 matrix with a single mark at (2, 0)
        let mut matrix = BitMatrix::new(3, 2);
        matrix.set(2, 0, true);

        let r90 = matrix.rotate90();
        assert_eq!(r90.width(), 2);
        assert_eq!(r90.height(), 3);
        assert!(r90.get(1, 2));

        let r180 = matrix.rotate180();
        assert_eq!(r180.width(), 3);
        assert!(r180.get(0, 1));

        let r270 = matrix.rotate270();
        assert_eq!(r270.width(), 2);
        assert!(r270.get(0, 0));
    }

    #[test]
    fn test_four_quarter_turns_identity() {
        let mut matrix = BitMatrix::new(5, 7);
        matrix.set(0, 0, true);
        matrix.set(4, 6, true);
        matrix.set(2, 3, true);

        let back = matrix.rotate90().rotate90().rotate90().rotate90();
        assert_eq!(back, matrix);
        assert_eq!(matrix.rotate90().rotate270(), matrix);
        assert_eq!(matrix.rotate180().rotate180(), matrix);
    }
}
