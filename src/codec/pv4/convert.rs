//! Fixed-point YUV to packed BGRA conversion
//!
//! ITU-R BT.601 limited-range matrix in 10-bit fixed point: luma is scaled
//! by 1192 after the -16 black level shift, the chroma cross terms are
//! 2066 (Cb into B), -400/-833 (Cb/Cr into G), and 1634 (Cr into R), with a
//! final >>10. Results are clamped through a precomputed crop table indexed
//! by value + 512, covering every value the matrix can produce for 8-bit
//! inputs.

/// Half-range bias added to matrix output before indexing [`CROP`]
const CROP_BIAS: i32 = 512;

/// Clamp table for matrix output in -512..1536
static CROP: [u8; 2048] = build_crop_table();

const fn build_crop_table() -> [u8; 2048] {
    let mut table = [0u8; 2048];
    let mut i = 0;
    while i < 2048 {
        let v = i as i32 - CROP_BIAS;
        table[i] = if v < 0 {
            0
        } else if v > 255 {
            255
        } else {
            v as u8
        };
        i += 1;
    }
    table
}

#[inline]
fn crop(v: i32) -> u8 {
    debug_assert!((-CROP_BIAS..2048 - CROP_BIAS).contains(&v));
    CROP[(v + CROP_BIAS) as usize]
}

/// Convert one YCbCr sample to packed B, G, R, 0xFF
#[inline]
pub fn yuv_to_bgra(y: u8, cb: u8, cr: u8) -> [u8; 4] {
    let luma = 1192 * (y as i32 - 16);
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;

    let r = (luma + 1634 * cr) >> 10;
    let g = (luma - 400 * cb - 833 * cr) >> 10;
    let b = (luma + 2066 * cb) >> 10;

    [crop(b), crop(g), crop(r), 0xFF]
}

/// Convert one 4:2:2 group (Cb Y0 Cr Y1) to two packed BGRA pixels
#[inline]
pub fn uyvy_group_to_bgra(group: [u8; 4]) -> [u8; 8] {
    let [cb, y0, cr, y1] = group;
    let p0 = yuv_to_bgra(y0, cb, cr);
    let p1 = yuv_to_bgra(y1, cb, cr);
    [p0[0], p0[1], p0[2], p0[3], p1[0], p1[1], p1[2], p1[3]]
}
