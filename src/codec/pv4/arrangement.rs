//! Video block geometry
//!
//! A frame is split into 2 (progressive) or 4 (interlaced) video blocks.
//! Each block owns a band of `height / (16 * count)` full macroblock rows,
//! and the leftover bottom region of the frame (the "padding region",
//! starting at 16-pixel row `(height / (16 * count)) * count`) is split
//! among the blocks as contiguous raster runs. When the height is not a
//! multiple of 16 the padding region ends in one row of half-height 32x8
//! macroblocks at row `height / 16`, which the run layout places at the end
//! of the last video block.
//!
//! All of this is pure arithmetic over the frame header; the result is
//! computed once per decoder and shared read-only across decode threads.

use super::MACROBLOCK_SIZE;
use crate::error::{Error, Result};
use crate::format::FrameHeader;

/// Remainder macroblocks go to these block indices, in this order. The
/// order is part of the wire-compatible geometry and must not change.
const REMAINDER_PRIORITY: [usize; 3] = [1, 3, 2];

/// Derived geometry for one video block of a frame
#[derive(Debug, Clone)]
pub struct VideoBlockArrangement {
    /// Video block index within the frame
    pub block_index: usize,
    /// True when the frame is interlaced (4 video blocks, field flags)
    pub interlaced: bool,
    /// Total macroblocks owned by this block
    pub macroblock_count: usize,
    /// 16x16 macroblocks per full frame row
    pub macroblocks_per_row: usize,
    /// Macroblock coordinate where this block's padding run begins: y is a
    /// 16-pixel row index, x counts 16x16 macroblocks. When the run starts
    /// inside the 32x8 boundary strip (y == height / 16), x counts 32x8
    /// macroblocks instead.
    pub padding_x: usize,
    pub padding_y: usize,
    /// 16-pixel row index of the 32x8 boundary row, when the frame has one
    pub boundary_row: Option<usize>,

    /// First 16-pixel row of this block's own band
    band_start_row: usize,
    /// Macroblocks in the own band
    band_len: usize,
    /// Index of the first padding-region macroblock of this block's run
    padding_start: usize,
    /// First 16-pixel row of the shared padding region
    padding_region_row: usize,
    /// Complete 16-pixel rows in the frame
    full_rows: usize,
}

impl VideoBlockArrangement {
    /// Compute the arrangement of every video block of a frame.
    ///
    /// The per-block macroblock counts are `total / count` each, plus the
    /// division remainder distributed one macroblock at a time to blocks
    /// 1, 3, 2 in that priority order. The counts always sum to
    /// `width * height / 256`.
    pub fn for_frame(header: &FrameHeader) -> Result<Vec<VideoBlockArrangement>> {
        header.validate()?;

        let width = header.width as usize;
        let height = header.height as usize;
        let mb = MACROBLOCK_SIZE as usize;
        let block_count = header.scan_mode.video_block_count();
        let interlaced = block_count == 4;

        let macroblocks_per_row = width / mb;
        let full_rows = height / mb;
        let has_boundary = height % mb != 0;
        let boundary_row = has_boundary.then_some(full_rows);
        let macroblock_total = width * height / (mb * mb);

        let base = macroblock_total / block_count;
        let remainder = macroblock_total % block_count;
        let mut counts = vec![base; block_count];
        for &extra in REMAINDER_PRIORITY.iter().take(remainder) {
            counts[extra] += 1;
        }

        let band_rows = height / (mb * block_count);
        let padding_region_row = band_rows * block_count;
        let band_len = band_rows * macroblocks_per_row;
        let padding_full_rows = full_rows - padding_region_row;

        let mut arrangements = Vec::with_capacity(block_count);
        let mut padding_start = 0usize;
        for (block_index, &macroblock_count) in counts.iter().enumerate() {
            if macroblock_count < band_len {
                return Err(Error::geometry(format!(
                    "Video block {} count {} cannot cover its {}-row band",
                    block_index, macroblock_count, band_rows
                )));
            }

            // Padding runs start where the previous block's run ended
            let (padding_x, padding_y) = if padding_start < padding_full_rows * macroblocks_per_row
            {
                (
                    padding_start % macroblocks_per_row,
                    padding_region_row + padding_start / macroblocks_per_row,
                )
            } else {
                (
                    padding_start - padding_full_rows * macroblocks_per_row,
                    full_rows,
                )
            };

            arrangements.push(VideoBlockArrangement {
                block_index,
                interlaced,
                macroblock_count,
                macroblocks_per_row,
                padding_x,
                padding_y,
                boundary_row,
                band_start_row: block_index * band_rows,
                band_len,
                padding_start,
                padding_region_row,
                full_rows,
            });
            padding_start += macroblock_count - band_len;
        }

        Ok(arrangements)
    }

    /// Walk this block's macroblocks in decode order: the own row band in
    /// raster order, then a one-way switch to the block's padding run.
    pub fn walk(&self) -> MacroBlockWalk<'_> {
        MacroBlockWalk {
            arrangement: self,
            index: 0,
        }
    }
}

/// Position of one macroblock in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroBlockPos {
    /// Index within the video block's decode order
    pub index: usize,
    /// Top-left pixel x
    pub x: usize,
    /// Top-left pixel y
    pub y: usize,
    /// True for a 32x8 boundary macroblock
    pub boundary: bool,
}

/// Iterator over a video block's macroblock positions.
///
/// Measured in 8-line units the vertical step is 2 while 16x16 macroblocks
/// are walked and drops to 1 on entering the 32x8 boundary row.
pub struct MacroBlockWalk<'a> {
    arrangement: &'a VideoBlockArrangement,
    index: usize,
}

impl Iterator for MacroBlockWalk<'_> {
    type Item = MacroBlockPos;

    fn next(&mut self) -> Option<MacroBlockPos> {
        let arr = self.arrangement;
        if self.index >= arr.macroblock_count {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let mb = MACROBLOCK_SIZE as usize;
        if index < arr.band_len {
            // Own band
            let row = arr.band_start_row + index / arr.macroblocks_per_row;
            let col = index % arr.macroblocks_per_row;
            return Some(MacroBlockPos {
                index,
                x: col * mb,
                y: row * mb,
                boundary: false,
            });
        }

        // Padding run
        let j = arr.padding_start + (index - arr.band_len);
        let padding_full = (arr.full_rows - arr.padding_region_row) * arr.macroblocks_per_row;
        if j < padding_full {
            let row = arr.padding_region_row + j / arr.macroblocks_per_row;
            let col = j % arr.macroblocks_per_row;
            Some(MacroBlockPos {
                index,
                x: col * mb,
                y: row * mb,
                boundary: false,
            })
        } else {
            // 32x8 boundary strip
            let col = j - padding_full;
            Some(MacroBlockPos {
                index,
                x: col * mb * 2,
                y: arr.full_rows * mb,
                boundary: true,
            })
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.arrangement.macroblock_count - self.index;
        (left, Some(left))
    }
}
