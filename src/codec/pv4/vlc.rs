//! Macroblock coefficient entropy coding
//!
//! One macroblock codes 8 DCT blocks in the order Y0 Y1 Y2 Y3 Cb0 Cb1 Cr0
//! Cr1, preceded on interlaced frames by a single field-mode flag bit. Each
//! block is a signed-ExpGolomb DC level followed by run/level coded AC
//! levels: an unsigned ExpGolomb code of 0 ends the block, a code of `n`
//! skips `n - 1` zero coefficients before the next signed non-zero level.
//!
//! Decoding dequantizes levels by the zig-zag-ordered frame tables and
//! scatters them through the inverse zig-zag into raster order. Coefficients
//! not present in the stream are left zero.

use super::bitstream::{BitReader, BitWriter};
use super::quant::{QuantTables, ZIGZAG_SCAN};
use super::{BLOCKS_PER_MACROBLOCK, BLOCK_COEFFS};
use crate::error::{Error, Result};

/// Coefficient scratch for one macroblock: 8 blocks of 64, raster order
pub type MacroBlockCoeffs = [i32; BLOCKS_PER_MACROBLOCK * BLOCK_COEFFS];

/// Dequantize one level. Syntactically valid codes can carry levels up to
/// 2^31, so the multiply widens to i64 and saturates instead of wrapping.
#[inline]
fn dequant(level: i32, quant: i32) -> i32 {
    (level as i64 * quant as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Decode one 8x8 block of dequantized coefficients into `out` (raster
/// order). `quant` is the zig-zag-ordered table for this block's plane.
fn decode_block(br: &mut BitReader<'_>, quant: &[i32; 64], out: &mut [i32]) -> Result<()> {
    out[..BLOCK_COEFFS].fill(0);

    let dc = br.read_signed_exp_golomb()?;
    out[0] = dequant(dc, quant[0]);

    let mut pos = 0usize;
    loop {
        let run_code = br.read_exp_golomb()? as usize;
        if run_code == 0 {
            return Ok(());
        }

        pos += run_code;
        if pos >= BLOCK_COEFFS {
            return Err(Error::invalid_input(format!(
                "Coefficient run past end of block (position {})",
                pos
            )));
        }

        let level = br.read_signed_exp_golomb()?;
        if level == 0 {
            return Err(Error::invalid_input("Zero AC level"));
        }
        out[ZIGZAG_SCAN[pos]] = dequant(level, quant[pos]);
    }
}

/// Decode one macroblock's 8 blocks of dequantized coefficients.
///
/// Advances the cursor past exactly one macroblock. On interlaced frames a
/// field-mode flag bit is consumed first and returned; progressive frames
/// always return `false`.
pub fn decode_macroblock(
    br: &mut BitReader<'_>,
    quant: &QuantTables,
    interlaced: bool,
    coeffs: &mut MacroBlockCoeffs,
) -> Result<bool> {
    let field_mode = if interlaced { br.read_bit()? } else { false };

    for block in 0..BLOCKS_PER_MACROBLOCK {
        let table = if block < 4 { &quant.luma } else { &quant.chroma };
        decode_block(
            br,
            table,
            &mut coeffs[block * BLOCK_COEFFS..(block + 1) * BLOCK_COEFFS],
        )?;
    }
    Ok(field_mode)
}

/// Encode one 8x8 block of quantized levels given in zig-zag scan order
pub fn encode_block(bw: &mut BitWriter, levels: &[i32; 64]) {
    bw.write_signed_exp_golomb(levels[0]);

    let mut last_pos = 0usize;
    for pos in 1..BLOCK_COEFFS {
        if levels[pos] != 0 {
            bw.write_exp_golomb((pos - last_pos) as u32);
            bw.write_signed_exp_golomb(levels[pos]);
            last_pos = pos;
        }
    }
    bw.write_exp_golomb(0);
}

/// Encode one macroblock: 8 blocks of quantized levels in scan order.
///
/// `field_mode` must be `Some` exactly when the frame is interlaced.
pub fn encode_macroblock(
    bw: &mut BitWriter,
    field_mode: Option<bool>,
    blocks: &[[i32; 64]; BLOCKS_PER_MACROBLOCK],
) {
    if let Some(flag) = field_mode {
        bw.write_bit(flag);
    }
    for levels in blocks {
        encode_block(bw, levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FrameHeader, ScanMode};
    use crate::util::Rational;

    fn quant_tables(luma: u16, chroma: u16) -> QuantTables {
        let header = FrameHeader {
            width: 1920,
            height: 1080,
            scan_mode: ScanMode::Interlaced,
            luma_quant: [luma; 64],
            chroma_quant: [chroma; 64],
            display_aspect: Rational::new(16, 9),
        };
        QuantTables::new(&header)
    }

    #[test]
    fn test_dc_only_macroblock_round_trip() {
        let quant = quant_tables(8, 16);
        let mut blocks = [[0i32; 64]; BLOCKS_PER_MACROBLOCK];
        for (i, block) in blocks.iter_mut().enumerate() {
            block[0] = 10 + i as i32;
        }

        let mut bw = BitWriter::new();
        encode_macroblock(&mut bw, Some(true), &blocks);
        let bytes = bw.into_bytes();

        let mut br = BitReader::new(&bytes);
        let mut coeffs = [0i32; 512];
        let field = decode_macroblock(&mut br, &quant, true, &mut coeffs).unwrap();
        assert!(field);

        for block in 0..BLOCKS_PER_MACROBLOCK {
            let q = if block < 4 { 8 } else { 16 };
            let base = block * 64;
            assert_eq!(coeffs[base], (10 + block as i32) * q);
            assert!(coeffs[base + 1..base + 64].iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn test_ac_levels_land_at_inverse_zigzag_positions() {
        let quant = quant_tables(2, 2);
        let mut levels = [[0i32; 64]; BLOCKS_PER_MACROBLOCK];
        // Scan positions 1 and 2 are raster 1 and 8
        levels[0][1] = 5;
        levels[0][2] = -3;
        levels[0][63] = 1;

        let mut bw = BitWriter::new();
        encode_macroblock(&mut bw, None, &levels);
        let bytes = bw.into_bytes();

        let mut br = BitReader::new(&bytes);
        let mut coeffs = [0i32; 512];
        let field = decode_macroblock(&mut br, &quant, false, &mut coeffs).unwrap();
        assert!(!field);

        assert_eq!(coeffs[1], 10);
        assert_eq!(coeffs[8], -6);
        assert_eq!(coeffs[63], 2);
        let nonzero = coeffs.iter().filter(|&&c| c != 0).count();
        assert_eq!(nonzero, 3);
    }

    #[test]
    fn test_scratch_is_cleared_between_macroblocks() {
        let quant = quant_tables(1, 1);
        let mut dense = [[0i32; 64]; BLOCKS_PER_MACROBLOCK];
        dense[3][17] = 9;
        let sparse = [[0i32; 64]; BLOCKS_PER_MACROBLOCK];

        let mut bw = BitWriter::new();
        encode_macroblock(&mut bw, None, &dense);
        encode_macroblock(&mut bw, None, &sparse);
        let bytes = bw.into_bytes();

        let mut br = BitReader::new(&bytes);
        let mut coeffs = [1i32; 512];
        decode_macroblock(&mut br, &quant, false, &mut coeffs).unwrap();
        assert_eq!(coeffs[3 * 64 + ZIGZAG_SCAN[17]], 9);
        decode_macroblock(&mut br, &quant, false, &mut coeffs).unwrap();
        assert!(coeffs.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        let quant = quant_tables(8, 8);
        let mut bw = BitWriter::new();
        encode_macroblock(&mut bw, None, &[[0i32; 64]; 8]);
        let mut bytes = bw.into_bytes();
        bytes.truncate(bytes.len() / 2);

        let mut br = BitReader::new(&bytes);
        let mut coeffs = [0i32; 512];
        assert!(decode_macroblock(&mut br, &quant, false, &mut coeffs).is_err());
    }

    #[test]
    fn test_huge_levels_saturate_instead_of_wrapping() {
        let quant = quant_tables(8, 8);
        // DC level 2^28 times quantizer 8 exceeds i32
        let mut bw = BitWriter::new();
        bw.write_signed_exp_golomb(1 << 28);
        bw.write_exp_golomb(0);
        let bytes = bw.into_bytes();

        let mut br = BitReader::new(&bytes);
        let mut out = [0i32; 64];
        decode_block(&mut br, &quant.luma, &mut out).unwrap();
        assert_eq!(out[0], i32::MAX);

        let mut bw = BitWriter::new();
        bw.write_signed_exp_golomb(-(1 << 28));
        bw.write_exp_golomb(0);
        let bytes = bw.into_bytes();
        let mut br = BitReader::new(&bytes);
        decode_block(&mut br, &quant.luma, &mut out).unwrap();
        assert_eq!(out[0], i32::MIN);
    }

    #[test]
    fn test_run_past_block_end_is_an_error() {
        let quant = quant_tables(8, 8);
        let mut bw = BitWriter::new();
        // DC 0, then a run code of 64 which lands outside the block
        bw.write_signed_exp_golomb(0);
        bw.write_exp_golomb(64);
        bw.write_signed_exp_golomb(1);
        let bytes = bw.into_bytes();

        let mut br = BitReader::new(&bytes);
        let mut out = [0i32; 64];
        assert!(matches!(
            decode_block(&mut br, &quant.luma, &mut out),
            Err(Error::InvalidInput(_))
        ));
    }
}
