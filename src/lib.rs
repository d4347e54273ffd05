//! pv4dec - Intra-frame DCT video decoder for the Earthsoft PV4 capture format
//!
//! PV4 stores every frame independently using a DV-style (SMPTE 370M)
//! macroblock structure: each frame is split into 2 (progressive) or 4
//! (interlaced) independent "video blocks" that are entropy-decoded,
//! dequantized, inverse-transformed, and placed into the output raster,
//! optionally in parallel.
//!
//! # Architecture
//!
//! - `format`: frame headers and the [`format::FrameSource`] abstraction the
//!   decoder pulls compressed payloads from (container demuxing itself is a
//!   collaborator, not part of this crate)
//! - `codec`: the PV4 codec implementation (bitstream, entropy layer,
//!   block geometry, inverse DCT, pixel placement, frame orchestration)
//! - `util`: common utilities and data structures
//!
//! # Example
//!
//! ```no_run
//! use pv4dec::codec::pv4::Pv4Decoder;
//! use pv4dec::format::MemoryFrameSource;
//!
//! # fn run(source: MemoryFrameSource) -> pv4dec::Result<()> {
//! let mut decoder = Pv4Decoder::new(source, 4)?;
//! let (width, height) = decoder.dimensions();
//! let stride = width as usize * 2;
//! let mut dest = vec![0u8; stride * height as usize];
//! let aspect = decoder.decode_frame_as_packed_yuv422(0, &mut dest, stride)?;
//! println!("decoded frame, display aspect {}", aspect);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod format;
pub mod util;

pub use error::{Error, Result};

/// pv4dec version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
