//! PV4 frame decoder
//!
//! [`Pv4Decoder`] pulls headers and per-video-block payloads from a
//! [`FrameSource`] and exposes the two decode entry points. Video blocks
//! are independent: with a thread count of 0 they decode sequentially on
//! the calling thread, otherwise they fan out over worker threads and the
//! call blocks until every block has finished or failed. The destination
//! raster is partitioned by the arrangement, so workers never write the
//! same byte.

use std::thread;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::arrangement::VideoBlockArrangement;
use super::bitstream::BitReader;
use super::macroblock::{place_macroblock, Regime};
use super::quant::QuantTables;
use super::raster::RasterBuf;
use super::vlc::{decode_macroblock, MacroBlockCoeffs};
use super::OutputFormat;
use crate::error::{Error, Result};
use crate::format::{FrameSource, ScanMode};
use crate::util::Rational;

/// PV4 video decoder over a frame source
///
/// Frame geometry is fixed per stream: it is read from frame 0 at
/// construction and later frames must match. The decoder itself is not
/// safe for concurrent decode calls; only the internal per-frame fan-out
/// is parallel.
pub struct Pv4Decoder<S: FrameSource> {
    source: S,
    thread_count: usize,
    width: u32,
    height: u32,
    scan_mode: ScanMode,
    arrangements: Vec<VideoBlockArrangement>,
}

impl<S: FrameSource> Pv4Decoder<S> {
    /// Create a decoder.
    ///
    /// `thread_count` of 0 decodes every video block on the calling
    /// thread; otherwise at most `thread_count` worker threads decode
    /// blocks concurrently.
    pub fn new(source: S, thread_count: usize) -> Result<Self> {
        let header = source.frame_header(0)?;
        let arrangements = VideoBlockArrangement::for_frame(&header)?;

        debug!(
            width = header.width,
            height = header.height,
            scan_mode = ?header.scan_mode,
            video_blocks = arrangements.len(),
            thread_count,
            "pv4 decoder ready"
        );

        Ok(Pv4Decoder {
            source,
            thread_count,
            width: header.width,
            height: header.height,
            scan_mode: header.scan_mode,
            arrangements,
        })
    }

    /// Frame dimensions in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Scan mode of the stream
    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    /// Decode a frame as packed 4:2:2 (UYVY, 2 bytes per pixel).
    ///
    /// `stride` is the caller-chosen row pitch in bytes (>= width * 2);
    /// `dest` must hold at least `stride * height` bytes. Returns the
    /// frame's display aspect ratio.
    pub fn decode_frame_as_packed_yuv422(
        &mut self,
        frame_index: usize,
        dest: &mut [u8],
        stride: usize,
    ) -> Result<Rational> {
        self.decode_frame(frame_index, dest, stride, OutputFormat::PackedYuv422)
    }

    /// Decode a frame as packed 32-bit color (B G R 0xFF, 4 bytes per
    /// pixel). Same buffer contract as the 4:2:2 path with 4 bytes per
    /// pixel.
    pub fn decode_frame_as_xrgb(
        &mut self,
        frame_index: usize,
        dest: &mut [u8],
        stride: usize,
    ) -> Result<Rational> {
        self.decode_frame(frame_index, dest, stride, OutputFormat::Xrgb)
    }

    fn decode_frame(
        &mut self,
        frame_index: usize,
        dest: &mut [u8],
        stride: usize,
        format: OutputFormat,
    ) -> Result<Rational> {
        let header = self.source.frame_header(frame_index)?;
        if header.width != self.width
            || header.height != self.height
            || header.scan_mode != self.scan_mode
        {
            return Err(Error::geometry(format!(
                "Frame {} geometry {}x{} {:?} differs from stream geometry {}x{} {:?}",
                frame_index,
                header.width,
                header.height,
                header.scan_mode,
                self.width,
                self.height,
                self.scan_mode
            )));
        }

        let min_stride = self.width as usize * format.bytes_per_pixel();
        if stride < min_stride {
            return Err(Error::invalid_input(format!(
                "Stride {} below row size {}",
                stride, min_stride
            )));
        }
        let need = stride * self.height as usize;
        if dest.len() < need {
            return Err(Error::BufferTooSmall {
                need,
                have: dest.len(),
            });
        }

        let quant = QuantTables::new(&header);
        let interlaced = self.scan_mode == ScanMode::Interlaced;
        let payloads = self
            .arrangements
            .iter()
            .map(|arr| self.source.video_block_payload(frame_index, arr.block_index))
            .collect::<Result<Vec<_>>>()?;

        debug!(frame_index, ?format, "decoding frame");

        let raster = RasterBuf::new(dest);
        let mut failures: Vec<(usize, Error)> = Vec::new();

        if self.thread_count == 0 {
            for (arr, payload) in self.arrangements.iter().zip(&payloads) {
                if let Err(err) =
                    decode_video_block(arr, payload, &quant, interlaced, format, stride, &raster)
                {
                    failures.push((arr.block_index, err));
                }
            }
        } else {
            // Round-robin the (at most 4) blocks over the workers; the
            // scope join is the barrier, so a failed block can never leave
            // the frame call hanging.
            let worker_count = self.thread_count.min(self.arrangements.len());
            let shared_failures = Mutex::new(Vec::new());
            let quant = &quant;
            let raster = &raster;
            let arrangements = &self.arrangements;
            let payloads = &payloads;
            let shared = &shared_failures;

            thread::scope(|scope| {
                for worker in 0..worker_count {
                    let spawned = thread::Builder::new()
                        .name(format!("pv4-decode-{}", worker))
                        .spawn_scoped(scope, move || {
                            for arr in arrangements.iter().skip(worker).step_by(worker_count) {
                                let payload = &payloads[arr.block_index];
                                if let Err(err) = decode_video_block(
                                    arr, payload, quant, interlaced, format, stride, raster,
                                ) {
                                    shared.lock().push((arr.block_index, err));
                                }
                            }
                        });
                    if let Err(err) = spawned {
                        // None of the worker's blocks will decode; attribute
                        // the failure to each of them by block index
                        let mut locked = shared.lock();
                        for arr in arrangements.iter().skip(worker).step_by(worker_count) {
                            locked.push((
                                arr.block_index,
                                Error::Io(std::io::Error::new(err.kind(), err.to_string())),
                            ));
                        }
                    }
                }
            });

            failures = shared_failures.into_inner();
        }

        if !failures.is_empty() {
            failures.sort_by_key(|(block, _)| *block);
            for (block, err) in &failures {
                warn!(video_block = block, error = %err, "video block decode failed");
            }
            let (_, first) = failures.swap_remove(0);
            return Err(first);
        }

        Ok(header.display_aspect)
    }
}

/// Decode every macroblock of one video block into the raster
fn decode_video_block(
    arrangement: &VideoBlockArrangement,
    payload: &[u8],
    quant: &QuantTables,
    interlaced: bool,
    format: OutputFormat,
    stride: usize,
    raster: &RasterBuf<'_>,
) -> Result<()> {
    let mut cursor = BitReader::new(payload);
    let mut coeffs: Box<MacroBlockCoeffs> = Box::new([0i32; 512]);

    for pos in arrangement.walk() {
        let field_mode = decode_macroblock(&mut cursor, quant, interlaced, &mut coeffs)
            .map_err(|err| {
                Error::bitstream(
                    arrangement.block_index,
                    pos.index,
                    arrangement.macroblock_count,
                    &err,
                )
            })?;

        let regime = if pos.boundary {
            Regime::Boundary
        } else if field_mode {
            Regime::Field
        } else {
            Regime::Standard
        };
        place_macroblock(format, &coeffs, regime, pos.x, pos.y, stride, raster);
    }

    trace!(
        video_block = arrangement.block_index,
        macroblocks = arrangement.macroblock_count,
        "video block decoded"
    );
    Ok(())
}
