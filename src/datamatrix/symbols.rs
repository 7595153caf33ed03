//! ECC200 symbol geometry table
//!
//! All 24 square symbol sizes from ISO/IEC 16022, ascending by capacity.
//! Large symbols subdivide into data regions, each wrapped in its own
//! finder border; block sizes describe the Reed-Solomon interleaving.

/// Geometry and block layout for one symbol size
#[derive(Debug, Clone, Copy)]
pub struct SymbolInfo {
    pub rows: usize,
    pub cols: usize,
    pub data_codewords: usize,
    pub ecc_codewords: usize,
    pub region_rows: usize,
    pub region_cols: usize,
    pub block_sizes: &'static [usize],
    pub ecc_block_size: usize,
}

static SYMBOLS: [SymbolInfo; 24] = [
    sym(10, 3, 5, 1, &[3], 5),
    sym(12, 5, 7, 1, &[5], 7),
    sym(14, 8, 10, 1, &[8], 10),
    sym(16, 12, 12, 1, &[12], 12),
    sym(18, 18, 14, 1, &[18], 14),
    sym(20, 22, 18, 1, &[22], 18),
    sym(22, 30, 20, 1, &[30], 20),
    sym(24, 36, 24, 1, &[36], 24),
    sym(26, 44, 28, 1, &[44], 28),
    sym(32, 62, 36, 2, &[62], 36),
    sym(36, 86, 42, 2, &[86], 42),
    sym(40, 114, 48, 2, &[114], 48),
    sym(44, 144, 56, 2, &[144], 56),
    sym(48, 174, 68, 2, &[174], 68),
    sym(52, 204, 84, 2, &[102, 102], 42),
    sym(64, 280, 112, 4, &[140, 140], 56),
    sym(72, 368, 144, 4, &[92, 92, 92, 92], 36),
    sym(80, 456, 192, 4, &[114, 114, 114, 114], 48),
    sym(88, 576, 224, 4, &[144, 144, 144, 144], 56),
    sym(96, 696, 272, 4, &[174, 174, 174, 174], 68),
    sym(104, 816, 336, 4, &[136, 136, 136, 136, 136, 136], 56),
    sym(120, 1050, 408, 6, &[175, 175, 175, 175, 175, 175], 68),
    sym(132, 1304, 496, 6, &[163, 163, 163, 163, 163, 163, 163, 163], 62),
    sym(
        144,
        1558,
        620,
        6,
        &[156, 156, 156, 156, 156, 156, 156, 156, 155, 155],
        62,
    ),
];

const fn sym(
    size: usize,
    data: usize,
    ecc: usize,
    regions: usize,
    block_sizes: &'static [usize],
    ecc_block: usize,
) -> SymbolInfo {
    SymbolInfo {
        rows: size,
        cols: size,
        data_codewords: data,
        ecc_codewords: ecc,
        region_rows: regions,
        region_cols: regions,
        block_sizes,
        ecc_block_size: ecc_block,
    }
}

impl SymbolInfo {
    /// Smallest symbol that fits `data_len` data codewords
    pub fn for_data(data_len: usize) -> Option<&'static SymbolInfo> {
        SYMBOLS.iter().find(|s| s.data_codewords >= data_len)
    }

    /// Exact-size lookup for decode
    pub fn for_size(rows: usize, cols: usize) -> Option<&'static SymbolInfo> {
        SYMBOLS.iter().find(|s| s.rows == rows && s.cols == cols)
    }

    pub fn all() -> &'static [SymbolInfo] {
        &SYMBOLS
    }

    pub fn block_count(&self) -> usize {
        self.block_sizes.len()
    }

    pub fn total_codewords(&self) -> usize {
        self.data_codewords + self.ecc_codewords
    }

    /// Data rows of a single region (region height minus the two border rows)
    pub fn region_data_rows(&self) -> usize {
        self.rows / self.region_rows - 2
    }

    pub fn region_data_cols(&self) -> usize {
        self.cols / self.region_cols - 2
    }

    /// Height of the assembled data region grid (all regions, borders stripped)
    pub fn data_region_rows(&self) -> usize {
        self.region_data_rows() * self.region_rows
    }

    pub fn data_region_cols(&self) -> usize {
        self.region_data_cols() * self.region_cols
    }
}
