//! Dequantization tables and coefficient scan order
//!
//! The capture header carries the luma and chroma quantizer tables in
//! raster order. Coefficients in the bitstream are serialized in zig-zag
//! scan order, so the tables are reordered once per frame to match: entry
//! `i` of a [`QuantTables`] table is the quantizer for the `i`-th scanned
//! coefficient.

use crate::format::FrameHeader;

/// Zig-zag scan order: maps scan position to raster position within an
/// 8x8 block. This is also the inverse zig-zag permutation handed to the
/// entropy layer.
#[rustfmt::skip]
pub const ZIGZAG_SCAN: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Per-frame dequantization tables, reordered to zig-zag scan order
#[derive(Debug, Clone)]
pub struct QuantTables {
    /// Luminance quantizers, scan order
    pub luma: [i32; 64],
    /// Chrominance quantizers, scan order
    pub chroma: [i32; 64],
}

impl QuantTables {
    /// Reorder the header's raster-order tables into scan order
    pub fn new(header: &FrameHeader) -> Self {
        let mut luma = [0i32; 64];
        let mut chroma = [0i32; 64];
        for (i, &raster) in ZIGZAG_SCAN.iter().enumerate() {
            luma[i] = header.luma_quant[raster] as i32;
            chroma[i] = header.chroma_quant[raster] as i32;
        }
        QuantTables { luma, chroma }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ScanMode;
    use crate::util::Rational;

    #[test]
    fn test_zigzag_is_a_permutation() {
        let mut seen = [false; 64];
        for &raster in &ZIGZAG_SCAN {
            assert!(!seen[raster]);
            seen[raster] = true;
        }
        // The scan walks anti-diagonals: first entries cover the low
        // frequencies, the last entry is the highest.
        assert_eq!(ZIGZAG_SCAN[0], 0);
        assert_eq!(ZIGZAG_SCAN[1], 1);
        assert_eq!(ZIGZAG_SCAN[2], 8);
        assert_eq!(ZIGZAG_SCAN[63], 63);
    }

    #[test]
    fn test_reorder_follows_scan() {
        let mut luma_quant = [0u16; 64];
        let mut chroma_quant = [0u16; 64];
        for i in 0..64 {
            luma_quant[i] = i as u16;
            chroma_quant[i] = 100 + i as u16;
        }
        let header = FrameHeader {
            width: 1920,
            height: 1080,
            scan_mode: ScanMode::Interlaced,
            luma_quant,
            chroma_quant,
            display_aspect: Rational::new(16, 9),
        };

        let tables = QuantTables::new(&header);
        for i in 0..64 {
            assert_eq!(tables.luma[i], ZIGZAG_SCAN[i] as i32);
            assert_eq!(tables.chroma[i], 100 + ZIGZAG_SCAN[i] as i32);
        }
    }
}
