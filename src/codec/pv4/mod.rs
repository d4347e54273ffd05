//! Earthsoft PV4 intra-frame video codec
//!
//! PV4 is the capture format of the Earthsoft PV4 board. Video is coded
//! frame by frame with a DV-style (SMPTE 370M) macroblock structure: 16x16
//! macroblocks of 4 luma + 2x2 chroma 8x8 DCT blocks, 4:2:2 chroma
//! subsampling, and a frame partitioned into 2 (progressive) or 4
//! (interlaced) independently coded video blocks. Frames whose height is
//! not a multiple of 16 carry one bottom row of half-height 32x8
//! macroblocks.
//!
//! The decoder produces either packed 4:2:2 (UYVY byte order) or packed
//! 32-bit BGRA, writing straight into a caller-owned raster.

pub mod arrangement;
pub mod bitstream;
pub mod convert;
pub mod decoder;
pub mod idct;
pub mod macroblock;
pub mod quant;
pub mod raster;
pub mod vlc;

pub use arrangement::VideoBlockArrangement;
pub use decoder::Pv4Decoder;

/// Width and height of a regular macroblock in pixels
pub const MACROBLOCK_SIZE: u32 = 16;

/// Number of 8x8 DCT blocks per macroblock (4 luma, 2 Cb, 2 Cr)
pub const BLOCKS_PER_MACROBLOCK: usize = 8;

/// Coefficients per DCT block
pub const BLOCK_COEFFS: usize = 64;

/// Output pixel format of a frame decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Packed 4:2:2, UYVY byte order (Cb Y Cr Y), 2 bytes per pixel
    PackedYuv422,
    /// Packed 32-bit color, B G R 0xFF byte order, 4 bytes per pixel
    Xrgb,
}

impl OutputFormat {
    /// Bytes per output pixel
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            OutputFormat::PackedYuv422 => 2,
            OutputFormat::Xrgb => 4,
        }
    }
}
