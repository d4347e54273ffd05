//! Fixed-point 8x8 inverse DCT
//!
//! Classic two-pass separable integer IDCT with 13-bit scaled cosine
//! constants and 64-bit intermediates. Rows that carry only a DC term take
//! a constant-fill shortcut in each pass, which makes DC-only blocks exact:
//! a lone dequantized DC of `d` reconstructs to `(4 * d + 16) >> 5` in every
//! sample.
//!
//! The transform works entirely in the coefficient domain; sample clamping
//! and the +128 level shift happen at placement time (see `macroblock`).

const CONST_BITS: i32 = 13;
const PASS1_BITS: i32 = 2;

// cos(k*pi/16) scaled by 2^13
const FIX_0_298631336: i64 = 2446;
const FIX_0_390180644: i64 = 3196;
const FIX_0_541196100: i64 = 4433;
const FIX_0_765366865: i64 = 6270;
const FIX_0_899976223: i64 = 7373;
const FIX_1_175875602: i64 = 9633;
const FIX_1_501321110: i64 = 12299;
const FIX_1_847759065: i64 = 15137;
const FIX_1_961570560: i64 = 16069;
const FIX_2_053119869: i64 = 16819;
const FIX_2_562915447: i64 = 20995;
const FIX_3_072711026: i64 = 25172;

/// Round and shift a fixed-point intermediate down by `n` bits
#[inline]
fn descale(x: i64, n: i32) -> i64 {
    (x + (1 << (n - 1))) >> n
}

/// One 8-point IDCT over `input` (stride-separated), writing to `output`
#[inline]
fn idct_1d(input: [i64; 8], descale_bits: i32) -> [i64; 8] {
    // Even part
    let z2 = input[2];
    let z3 = input[6];
    let z1 = (z2 + z3) * FIX_0_541196100;
    let tmp2 = z1 - z3 * FIX_1_847759065;
    let tmp3 = z1 + z2 * FIX_0_765366865;

    let tmp0 = (input[0] + input[4]) << CONST_BITS;
    let tmp1 = (input[0] - input[4]) << CONST_BITS;

    let t10 = tmp0 + tmp3;
    let t13 = tmp0 - tmp3;
    let t11 = tmp1 + tmp2;
    let t12 = tmp1 - tmp2;

    // Odd part
    let mut o0 = input[7];
    let mut o1 = input[5];
    let mut o2 = input[3];
    let mut o3 = input[1];

    let mut z1 = o0 + o3;
    let mut z2 = o1 + o2;
    let mut z3 = o0 + o2;
    let mut z4 = o1 + o3;
    let z5 = (z3 + z4) * FIX_1_175875602;

    o0 *= FIX_0_298631336;
    o1 *= FIX_2_053119869;
    o2 *= FIX_3_072711026;
    o3 *= FIX_1_501321110;
    z1 *= -FIX_0_899976223;
    z2 *= -FIX_2_562915447;
    z3 = z3 * -FIX_1_961570560 + z5;
    z4 = z4 * -FIX_0_390180644 + z5;

    o0 += z1 + z3;
    o1 += z2 + z4;
    o2 += z2 + z3;
    o3 += z1 + z4;

    [
        descale(t10 + o3, descale_bits),
        descale(t11 + o2, descale_bits),
        descale(t12 + o1, descale_bits),
        descale(t13 + o0, descale_bits),
        descale(t13 - o0, descale_bits),
        descale(t12 - o1, descale_bits),
        descale(t11 - o2, descale_bits),
        descale(t10 - o3, descale_bits),
    ]
}

/// In-place 2D inverse DCT over a raster-order 8x8 coefficient block
pub fn idct_8x8(block: &mut [i32; 64]) {
    let mut tmp = [0i64; 64];

    // Row pass
    for row in 0..8 {
        let base = row * 8;
        let r = &block[base..base + 8];
        if r[1..].iter().all(|&c| c == 0) {
            let dc = (r[0] as i64) << PASS1_BITS;
            tmp[base..base + 8].fill(dc);
            continue;
        }
        let mut input = [0i64; 8];
        for (dst, &src) in input.iter_mut().zip(r) {
            *dst = src as i64;
        }
        tmp[base..base + 8].copy_from_slice(&idct_1d(input, CONST_BITS - PASS1_BITS));
    }

    // Column pass
    for col in 0..8 {
        let mut input = [0i64; 8];
        for row in 0..8 {
            input[row] = tmp[row * 8 + col];
        }
        if input[1..].iter().all(|&c| c == 0) {
            let dc = descale(input[0], PASS1_BITS + 3) as i32;
            for row in 0..8 {
                block[row * 8 + col] = dc;
            }
            continue;
        }
        let out = idct_1d(input, CONST_BITS + PASS1_BITS + 3);
        for row in 0..8 {
            block[row * 8 + col] = out[row] as i32;
        }
    }
}

/// The uniform sample value a DC-only block of dequantized DC `d`
/// reconstructs to
#[inline]
pub fn dc_only_value(d: i32) -> i32 {
    (4 * d + 16) >> 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_only_is_uniform() {
        for &dc in &[0i32, 1, 8, 80, 400, -80, -400] {
            let mut block = [0i32; 64];
            block[0] = dc;
            idct_8x8(&mut block);
            let expected = dc_only_value(dc);
            assert!(
                block.iter().all(|&s| s == expected),
                "dc {} expected {} got {:?}",
                dc,
                expected,
                &block[..8]
            );
        }
    }

    #[test]
    fn test_zero_block_stays_zero() {
        let mut block = [0i32; 64];
        idct_8x8(&mut block);
        assert!(block.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_single_ac_basis_is_antisymmetric() {
        // Coefficient (0,1) produces a horizontal cosine half-wave: each
        // row identical, columns antisymmetric about the center.
        let mut block = [0i32; 64];
        block[1] = 256;
        idct_8x8(&mut block);

        for row in 1..8 {
            assert_eq!(&block[row * 8..row * 8 + 8], &block[0..8]);
        }
        for col in 0..4 {
            // Rounding of the fixed-point descale can break exact sign
            // symmetry by one.
            assert!((block[col] + block[7 - col]).abs() <= 1);
        }
        assert!(block[0] > block[3]);
        assert!(block[3] > 0);
    }

    #[test]
    fn test_linearity() {
        let mut a = [0i32; 64];
        let mut b = [0i32; 64];
        let mut sum = [0i32; 64];
        a[0] = 320;
        b[9] = 144;
        sum[0] = 320;
        sum[9] = 144;

        idct_8x8(&mut a);
        idct_8x8(&mut b);
        idct_8x8(&mut sum);

        // Fixed-point rounding allows off-by-one against the separate
        // transforms.
        for i in 0..64 {
            assert!((sum[i] - (a[i] + b[i])).abs() <= 1, "sample {}", i);
        }
    }
}
