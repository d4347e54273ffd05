//! Frame headers and the frame source abstraction
//!
//! The container/demux layer is a collaborator of this crate: something else
//! locates a frame's video payload inside the capture file and hands the
//! decoder a [`FrameHeader`] plus one compressed byte segment per video
//! block. [`FrameSource`] is that contract; [`MemoryFrameSource`] is the
//! in-memory implementation used by tools and tests.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::util::Rational;

/// Frame scanning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Whole frame scanned top to bottom; 2 video blocks
    Progressive,
    /// Two interleaved fields; 4 video blocks, per-macroblock field flag
    Interlaced,
}

impl ScanMode {
    /// Number of independent video blocks a frame of this mode is split into
    #[inline]
    pub fn video_block_count(self) -> usize {
        match self {
            ScanMode::Progressive => 2,
            ScanMode::Interlaced => 4,
        }
    }
}

/// Per-frame decoding parameters supplied by the container layer
///
/// Quantizer tables are stored in raster order as found in the capture
/// header; the decoder reorders them once per frame (see `codec::pv4::quant`).
#[derive(Debug, Clone)]
pub struct FrameHeader {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Scanning mode
    pub scan_mode: ScanMode,
    /// Luminance quantizer table, raster order
    pub luma_quant: [u16; 64],
    /// Chrominance quantizer table, raster order
    pub chroma_quant: [u16; 64],
    /// Display aspect ratio of the frame
    pub display_aspect: Rational,
}

/// Serialized size of a frame header in bytes
pub const FRAME_HEADER_SIZE: usize = 4 + 4 + 1 + 4 + 4 + 64 * 2 + 64 * 2;

impl FrameHeader {
    /// Parse a serialized frame header (big-endian, as stored by the capture
    /// container): width u32, height u32, scan mode u8, aspect numerator
    /// u32, aspect denominator u32, 64 luma quantizers u16, 64 chroma
    /// quantizers u16.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FRAME_HEADER_SIZE {
            return Err(Error::invalid_input(format!(
                "Frame header truncated: {} of {} bytes",
                data.len(),
                FRAME_HEADER_SIZE
            )));
        }

        let mut rdr = Cursor::new(data);
        let width = rdr.read_u32::<BigEndian>()?;
        let height = rdr.read_u32::<BigEndian>()?;
        let scan_mode = match rdr.read_u8()? {
            0 => ScanMode::Progressive,
            1 => ScanMode::Interlaced,
            other => {
                return Err(Error::invalid_input(format!(
                    "Unknown scan mode {}",
                    other
                )))
            }
        };
        let aspect_num = rdr.read_u32::<BigEndian>()? as i64;
        let aspect_den = rdr.read_u32::<BigEndian>()? as i64;
        if aspect_den == 0 {
            return Err(Error::invalid_input("Zero aspect ratio denominator"));
        }

        let mut luma_quant = [0u16; 64];
        rdr.read_u16_into::<BigEndian>(&mut luma_quant)?;
        let mut chroma_quant = [0u16; 64];
        rdr.read_u16_into::<BigEndian>(&mut chroma_quant)?;

        let header = FrameHeader {
            width,
            height,
            scan_mode,
            luma_quant,
            chroma_quant,
            display_aspect: Rational::new(aspect_num, aspect_den),
        };
        header.validate()?;
        Ok(header)
    }

    /// Validate that the dimensions are compatible with macroblock tiling.
    ///
    /// Width must hold whole 16x16 macroblocks; height must hold whole
    /// 8-line block rows. A height that is not a multiple of 16 produces a
    /// bottom strip of 32x8 macroblocks, which additionally needs
    /// `width % 32 == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::geometry("Zero frame dimension"));
        }
        if self.width % 16 != 0 {
            return Err(Error::geometry(format!(
                "Width {} is not a multiple of 16",
                self.width
            )));
        }
        if self.height % 8 != 0 {
            return Err(Error::geometry(format!(
                "Height {} is not a multiple of 8",
                self.height
            )));
        }
        if self.height % 16 != 0 && self.width % 32 != 0 {
            return Err(Error::geometry(format!(
                "Height {} needs a 32x8 bottom strip but width {} is not a \
                 multiple of 32",
                self.height, self.width
            )));
        }
        Ok(())
    }
}

/// Source of frame headers and per-video-block compressed payloads
///
/// Implemented by the container/demux layer. The decoder calls
/// `frame_header` once per decoded frame and `video_block_payload` once per
/// video block; both may be called from the thread invoking the decode, and
/// payload fetches for one frame may come from worker threads.
pub trait FrameSource: Send + Sync {
    /// Decoding parameters for the given frame
    fn frame_header(&self, frame_index: usize) -> Result<FrameHeader>;

    /// The exact compressed segment for one video block of one frame
    fn video_block_payload(&self, frame_index: usize, video_block: usize) -> Result<Vec<u8>>;
}

/// In-memory frame source over pre-loaded frames
///
/// Each frame is a header plus one payload buffer per video block.
pub struct MemoryFrameSource {
    frames: Vec<(FrameHeader, Vec<Vec<u8>>)>,
}

impl MemoryFrameSource {
    /// Create an empty source
    pub fn new() -> Self {
        MemoryFrameSource { frames: Vec::new() }
    }

    /// Append a frame; `payloads` must hold one buffer per video block
    pub fn push_frame(&mut self, header: FrameHeader, payloads: Vec<Vec<u8>>) -> Result<()> {
        header.validate()?;
        if payloads.len() != header.scan_mode.video_block_count() {
            return Err(Error::invalid_input(format!(
                "Expected {} video block payloads, got {}",
                header.scan_mode.video_block_count(),
                payloads.len()
            )));
        }
        self.frames.push((header, payloads));
        Ok(())
    }

    /// Number of frames held
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Default for MemoryFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MemoryFrameSource {
    fn frame_header(&self, frame_index: usize) -> Result<FrameHeader> {
        self.frames
            .get(frame_index)
            .map(|(header, _)| header.clone())
            .ok_or_else(|| Error::source(format!("No frame {}", frame_index)))
    }

    fn video_block_payload(&self, frame_index: usize, video_block: usize) -> Result<Vec<u8>> {
        let (_, payloads) = self
            .frames
            .get(frame_index)
            .ok_or_else(|| Error::source(format!("No frame {}", frame_index)))?;
        payloads
            .get(video_block)
            .cloned()
            .ok_or_else(|| {
                Error::source(format!(
                    "No payload for video block {} of frame {}",
                    video_block, frame_index
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_header(width: u32, height: u32, scan_mode: ScanMode) -> FrameHeader {
        FrameHeader {
            width,
            height,
            scan_mode,
            luma_quant: [8; 64],
            chroma_quant: [8; 64],
            display_aspect: Rational::new(16, 9),
        }
    }

    #[test]
    fn test_header_parse_round_trip() {
        let mut data = Vec::new();
        data.extend_from_slice(&1920u32.to_be_bytes());
        data.extend_from_slice(&1080u32.to_be_bytes());
        data.push(1);
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(&9u32.to_be_bytes());
        for i in 0..64u16 {
            data.extend_from_slice(&(8 + i).to_be_bytes());
        }
        for i in 0..64u16 {
            data.extend_from_slice(&(16 + i).to_be_bytes());
        }

        let header = FrameHeader::parse(&data).unwrap();
        assert_eq!(header.width, 1920);
        assert_eq!(header.height, 1080);
        assert_eq!(header.scan_mode, ScanMode::Interlaced);
        assert_eq!(header.display_aspect, Rational::new(16, 9));
        assert_eq!(header.luma_quant[63], 71);
        assert_eq!(header.chroma_quant[0], 16);
    }

    #[test]
    fn test_header_parse_truncated() {
        let data = vec![0u8; FRAME_HEADER_SIZE - 1];
        assert!(matches!(
            FrameHeader::parse(&data),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        assert!(flat_header(1920, 1080, ScanMode::Interlaced).validate().is_ok());
        // 1080 % 16 != 0, so the 32x8 strip applies and width 720 % 32 != 0
        assert!(matches!(
            flat_header(720, 1080, ScanMode::Progressive).validate(),
            Err(Error::Geometry(_))
        ));
        assert!(flat_header(720, 480, ScanMode::Interlaced).validate().is_ok());
        assert!(matches!(
            flat_header(1000, 480, ScanMode::Progressive).validate(),
            Err(Error::Geometry(_))
        ));
        assert!(matches!(
            flat_header(1920, 1084, ScanMode::Progressive).validate(),
            Err(Error::Geometry(_))
        ));
    }

    #[test]
    fn test_memory_source_payload_count_checked() {
        let mut source = MemoryFrameSource::new();
        let header = flat_header(1920, 1080, ScanMode::Interlaced);
        assert!(source
            .push_frame(header.clone(), vec![Vec::new(); 2])
            .is_err());
        assert!(source.push_frame(header, vec![Vec::new(); 4]).is_ok());
        assert_eq!(source.frame_count(), 1);
        assert!(source.frame_header(1).is_err());
        assert!(source.video_block_payload(0, 4).is_err());
    }
}
