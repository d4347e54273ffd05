//! Macroblock reconstruction and pixel placement
//!
//! A decoded macroblock is 8 blocks of dequantized coefficients in the
//! order Y0 Y1 Y2 Y3 Cb0 Cb1 Cr0 Cr1. After the inverse transform the
//! samples are written to the destination raster under one of three
//! placement regimes:
//!
//! - **Standard**: 16x16, luma blocks at (0,0) (0,8) (8,0) (8,8), chroma
//!   stacked at (0,0) and (0,8)
//! - **Field**: interlaced macroblocks whose halves belong to different
//!   fields; luma at (0,0) (0,1) (8,0) (8,1) with the row stride doubled,
//!   so Y0/Y1 split the even and odd lines of the left half
//! - **Boundary**: the 32x8 bottom strip; blocks sit side by side with
//!   luma x-offsets 0, 16, 8, 24 (spatial order Y0 Y2 Y1 Y3) and chroma
//!   x-offsets 0, 16
//!
//! Packed 4:2:2 output is written directly at the final destination
//! addresses: UYVY byte order, luma at byte step 2, chroma at byte step 4.
//! The XRGB path reconstructs the macroblock into a 32x8 UYVY intermediate
//! (row stride 64, the Boundary layout) and converts each 4-byte group to
//! two BGRA pixels.

use super::convert::uyvy_group_to_bgra;
use super::idct::idct_8x8;
use super::raster::RasterBuf;
use super::vlc::MacroBlockCoeffs;
use super::{OutputFormat, BLOCKS_PER_MACROBLOCK, BLOCK_COEFFS};

/// Placement regime of one macroblock, mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// 16x16, progressive placement
    Standard,
    /// 16x16 interlaced macroblock with the field flag set
    Field,
    /// 32x8 bottom-strip macroblock
    Boundary,
}

/// Where one 8x8 DCT block's samples go: a byte offset, a row stride, and
/// a per-sample step. Recomputed per macroblock since the destination
/// moves.
#[derive(Debug, Clone, Copy)]
pub struct DctBlockInfo {
    pub dest_offset: usize,
    pub row_stride: usize,
    pub sample_step: usize,
}

/// Destination views for the 8 blocks of one macroblock in a packed 4:2:2
/// raster with row stride `stride`, macroblock top-left at byte `base`.
///
/// Luma lands on the Y bytes (offset 1 within a UYVY group, step 2);
/// chroma lands on the Cb/Cr bytes (offsets 0 and 2, step 4).
pub fn block_infos(regime: Regime, base: usize, stride: usize) -> [DctBlockInfo; 8] {
    let luma = |dest_offset, row_stride| DctBlockInfo {
        dest_offset,
        row_stride,
        sample_step: 2,
    };
    let chroma = |dest_offset, row_stride| DctBlockInfo {
        dest_offset,
        row_stride,
        sample_step: 4,
    };

    match regime {
        Regime::Standard => [
            luma(base + 1, stride),
            luma(base + 8 * stride + 1, stride),
            luma(base + 17, stride),
            luma(base + 8 * stride + 17, stride),
            chroma(base, stride),
            chroma(base + 8 * stride, stride),
            chroma(base + 2, stride),
            chroma(base + 8 * stride + 2, stride),
        ],
        Regime::Field => [
            luma(base + 1, 2 * stride),
            luma(base + stride + 1, 2 * stride),
            luma(base + 17, 2 * stride),
            luma(base + stride + 17, 2 * stride),
            chroma(base, 2 * stride),
            chroma(base + stride, 2 * stride),
            chroma(base + 2, 2 * stride),
            chroma(base + stride + 2, 2 * stride),
        ],
        // Luma x-offsets 0, 16, 8, 24 pixels (2 bytes per pixel), chroma
        // x-offsets 0 and 16 pixels
        Regime::Boundary => [
            luma(base + 1, stride),
            luma(base + 33, stride),
            luma(base + 17, stride),
            luma(base + 49, stride),
            chroma(base, stride),
            chroma(base + 32, stride),
            chroma(base + 2, stride),
            chroma(base + 34, stride),
        ],
    }
}

/// Inverse-transform one block and place its samples through `put`
fn idct_and_place<F: FnMut(usize, u8)>(coeffs: &[i32], info: &DctBlockInfo, mut put: F) {
    let mut block = [0i32; BLOCK_COEFFS];
    block.copy_from_slice(coeffs);
    idct_8x8(&mut block);

    for row in 0..8 {
        let line = info.dest_offset + row * info.row_stride;
        for col in 0..8 {
            let sample = (block[row * 8 + col] + 128).clamp(0, 255) as u8;
            put(line + col * info.sample_step, sample);
        }
    }
}

/// Place one macroblock into a packed 4:2:2 (UYVY) raster
fn place_yuv422(
    coeffs: &MacroBlockCoeffs,
    regime: Regime,
    base: usize,
    stride: usize,
    raster: &RasterBuf<'_>,
) {
    let infos = block_infos(regime, base, stride);
    for (block, info) in infos.iter().enumerate() {
        idct_and_place(
            &coeffs[block * BLOCK_COEFFS..(block + 1) * BLOCK_COEFFS],
            info,
            |offset, sample| raster.write(offset, sample),
        );
    }
}

/// Intermediate UYVY image of one macroblock flattened to 32x8
const FLAT_STRIDE: usize = 64;

/// Place one macroblock into a packed BGRA raster.
///
/// The blocks are first reconstructed into the 32x8 UYVY flatten, then
/// every (Cb Y0 Cr Y1) group converts to two BGRA pixels whose destination
/// follows the regime: group `g` of flatten row `r` belongs to quadrant
/// `g / 4`, which is the destination 8x8 block the samples came from.
fn place_xrgb(
    coeffs: &MacroBlockCoeffs,
    regime: Regime,
    base: usize,
    stride: usize,
    raster: &RasterBuf<'_>,
) {
    let mut flat = [0u8; FLAT_STRIDE * 8];
    let infos = block_infos(Regime::Boundary, 0, FLAT_STRIDE);
    for (block, info) in infos.iter().enumerate() {
        idct_and_place(
            &coeffs[block * BLOCK_COEFFS..(block + 1) * BLOCK_COEFFS],
            info,
            |offset, sample| flat[offset] = sample,
        );
    }

    for row in 0..8 {
        for group in 0..16 {
            let quad = group / 4;
            let (x, y) = match regime {
                Regime::Standard => ((quad % 2) * 8 + (2 * group) % 8, row + (quad / 2) * 8),
                Regime::Field => ((quad % 2) * 8 + (2 * group) % 8, 2 * row + quad / 2),
                Regime::Boundary => (2 * group, row),
            };

            let src = row * FLAT_STRIDE + group * 4;
            let pixels = uyvy_group_to_bgra([
                flat[src],
                flat[src + 1],
                flat[src + 2],
                flat[src + 3],
            ]);
            let dest = base + y * stride + x * 4;
            for (i, &byte) in pixels.iter().enumerate() {
                raster.write(dest + i, byte);
            }
        }
    }
}

/// Place one decoded macroblock with top-left pixel (x, y)
pub fn place_macroblock(
    format: OutputFormat,
    coeffs: &MacroBlockCoeffs,
    regime: Regime,
    x: usize,
    y: usize,
    stride: usize,
    raster: &RasterBuf<'_>,
) {
    let base = y * stride + x * format.bytes_per_pixel();
    match format {
        OutputFormat::PackedYuv422 => place_yuv422(coeffs, regime, base, stride, raster),
        OutputFormat::Xrgb => place_xrgb(coeffs, regime, base, stride, raster),
    }
}
