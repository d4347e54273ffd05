//! Destination raster span shared across video block workers
//!
//! The caller's buffer is wrapped in a span that only exposes
//! bounds-checked byte writes. Video blocks cover disjoint pixel regions by
//! construction (the arrangement tiles the frame exactly), so workers never
//! write the same byte; the span is shared by reference across the decode
//! fan-out and never reads.

use std::marker::PhantomData;

/// Write-only view of the caller-owned destination buffer
pub struct RasterBuf<'a> {
    ptr: *mut u8,
    len: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

// Workers write disjoint byte sets (coverage invariant) and the span never
// reads, so concurrent use is sound.
unsafe impl Send for RasterBuf<'_> {}
unsafe impl Sync for RasterBuf<'_> {}

impl<'a> RasterBuf<'a> {
    /// Wrap a destination buffer
    pub fn new(buf: &'a mut [u8]) -> Self {
        RasterBuf {
            ptr: buf.as_mut_ptr(),
            len: buf.len(),
            _marker: PhantomData,
        }
    }

    /// Buffer length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Write one byte at `offset`.
    ///
    /// # Panics
    /// Panics if `offset` is out of bounds. Offsets are derived from
    /// geometry validated before decode starts, so a panic here means a
    /// placement arithmetic bug, not bad input.
    #[inline]
    pub fn write(&self, offset: usize, value: u8) {
        assert!(offset < self.len, "raster write out of bounds");
        unsafe {
            *self.ptr.add(offset) = value;
        }
    }
}
