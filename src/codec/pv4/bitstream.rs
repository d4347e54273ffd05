//! Bitstream reading and writing for PV4 video blocks
//!
//! [`BitReader`] is the bit cursor the entropy layer consumes: it walks one
//! video block's compressed segment MSB-first. [`BitWriter`] is the encode
//! side of the same layer, used to synthesize conformant payloads.
//!
//! Both use MSB-first (big-endian) bit ordering.

use crate::error::{Error, Result};

/// Bitstream reader over one video block's compressed payload
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Current bit position (0-based from start of data)
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new reader positioned at the first bit of `data`
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, bit_pos: 0 }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// Returns `Error::EndOfStream` if no bits remain.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_pos >= self.data.len() * 8 {
            return Err(Error::EndOfStream);
        }

        let byte_idx = self.bit_pos / 8;
        let bit_idx = 7 - (self.bit_pos % 8); // MSB first
        let bit = (self.data[byte_idx] >> bit_idx) & 1;
        self.bit_pos += 1;
        Ok(bit != 0)
    }

    /// Read up to 32 bits, returned right-aligned in a u32
    #[inline]
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(Error::invalid_input("Cannot read more than 32 bits at once"));
        }
        if (n as usize) > self.remaining() {
            return Err(Error::EndOfStream);
        }

        let mut result: u32 = 0;
        for _ in 0..n {
            result = (result << 1) | (self.read_bit()? as u32);
        }
        Ok(result)
    }

    /// Read an unsigned ExpGolomb code.
    ///
    /// Format: leading zeros, 1-bit terminator, suffix bits.
    /// The value encoded is `(1 << num_zeros) - 1 + suffix`.
    pub fn read_exp_golomb(&mut self) -> Result<u32> {
        let mut leading_zeros: u32 = 0;

        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(Error::invalid_input(
                    "Invalid ExpGolomb code: too many leading zeros",
                ));
            }
        }

        if leading_zeros == 0 {
            return Ok(0);
        }

        // Widened: 31 leading zeros with an all-ones suffix assembles to
        // u32::MAX - 1, one past what a u32 intermediate can hold.
        let suffix = self.read_bits(leading_zeros as u8)? as u64;
        Ok(((1u64 << leading_zeros) - 1 + suffix) as u32)
    }

    /// Read a signed ExpGolomb code.
    ///
    /// Maps unsigned values to signed: 0->0, 1->1, 2->-1, 3->2, 4->-2, ...
    pub fn read_signed_exp_golomb(&mut self) -> Result<i32> {
        let unsigned = self.read_exp_golomb()?;
        let value = ((unsigned + 1) >> 1) as i32;
        if unsigned & 1 == 0 {
            Ok(-value)
        } else {
            Ok(value)
        }
    }

    /// Current bit position (0-based)
    #[inline]
    pub fn position(&self) -> usize {
        self.bit_pos
    }

    /// Bits remaining to read
    #[inline]
    pub fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }
}

/// Bitstream writer assembling a video block payload
///
/// Writes bits to an internal buffer in MSB-first order; the buffer grows
/// as needed.
pub struct BitWriter {
    data: Vec<u8>,
    current_byte: u8,
    /// Number of bits written to current_byte (0-7)
    bit_count: usize,
}

impl BitWriter {
    /// Create a new writer
    pub fn new() -> Self {
        BitWriter {
            data: Vec::with_capacity(4096),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Write a single bit
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.current_byte = (self.current_byte << 1) | (bit as u8);
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.data.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Write the lower `n` bits of `value`, MSB first
    #[inline]
    pub fn write_bits(&mut self, value: u32, n: u8) {
        debug_assert!(n <= 32, "Cannot write more than 32 bits at once");

        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Write an unsigned ExpGolomb code
    pub fn write_exp_golomb(&mut self, value: u32) {
        // u64 so u32::MAX does not overflow the augmented value
        let augmented = value as u64 + 1;
        let bits = 64 - augmented.leading_zeros();
        for _ in 0..bits - 1 {
            self.write_bit(false);
        }
        for i in (0..bits).rev() {
            self.write_bit((augmented >> i) & 1 != 0);
        }
    }

    /// Write a signed ExpGolomb code (inverse of `read_signed_exp_golomb`)
    pub fn write_signed_exp_golomb(&mut self, value: i32) {
        let unsigned = if value > 0 {
            (value as u32) * 2 - 1
        } else {
            (-value as u32) * 2
        };
        self.write_exp_golomb(unsigned);
    }

    /// Consume the writer, flushing a zero-padded final byte if needed
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.current_byte <<= 8 - self.bit_count;
            self.data.push(self.current_byte);
        }
        self.data
    }

    /// Total bits written so far
    #[inline]
    pub fn bit_position(&self) -> usize {
        self.data.len() * 8 + self.bit_count
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_msb_first() {
        let data = [0b1101_0110, 0b1000_0000];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(5).unwrap(), 0b11010);
        assert_eq!(br.read_bits(3).unwrap(), 0b110);
        assert!(br.read_bit().unwrap());
        assert_eq!(br.position(), 9);
        assert_eq!(br.remaining(), 7);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xFF];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(8).unwrap(), 0xFF);
        assert!(matches!(br.read_bit(), Err(Error::EndOfStream)));
        assert!(matches!(br.read_bits(4), Err(Error::EndOfStream)));
    }

    #[test]
    fn test_exp_golomb_known_codes() {
        // "1" -> 0, "010" -> 1, "011" -> 2, "00100" -> 3
        let data = [0b1_010_011_0, 0b0100_0000];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_exp_golomb().unwrap(), 0);
        assert_eq!(br.read_exp_golomb().unwrap(), 1);
        assert_eq!(br.read_exp_golomb().unwrap(), 2);
        assert_eq!(br.read_exp_golomb().unwrap(), 3);
    }

    #[test]
    fn test_exp_golomb_round_trip() {
        let values = [0u32, 1, 2, 3, 7, 8, 100, 255, 4095, 70000];
        let mut bw = BitWriter::new();
        for &v in &values {
            bw.write_exp_golomb(v);
        }
        let bytes = bw.into_bytes();
        let mut br = BitReader::new(&bytes);
        for &v in &values {
            assert_eq!(br.read_exp_golomb().unwrap(), v);
        }
    }

    #[test]
    fn test_exp_golomb_widest_codes() {
        // u32::MAX - 1 is the widest decodable code (31 leading zeros,
        // all-ones suffix); u32::MAX needs 32 leading zeros and is rejected
        let mut bw = BitWriter::new();
        bw.write_exp_golomb(u32::MAX - 1);
        bw.write_exp_golomb(u32::MAX);
        let bytes = bw.into_bytes();

        let mut br = BitReader::new(&bytes);
        assert_eq!(br.read_exp_golomb().unwrap(), u32::MAX - 1);
        assert!(matches!(
            br.read_exp_golomb(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_signed_exp_golomb_round_trip() {
        let values = [0i32, 1, -1, 2, -2, 17, -63, 255, -1024];
        let mut bw = BitWriter::new();
        for &v in &values {
            bw.write_signed_exp_golomb(v);
        }
        let bytes = bw.into_bytes();
        let mut br = BitReader::new(&bytes);
        for &v in &values {
            assert_eq!(br.read_signed_exp_golomb().unwrap(), v);
        }
    }

    #[test]
    fn test_writer_flush_pads_with_zeros() {
        let mut bw = BitWriter::new();
        bw.write_bits(0b101, 3);
        assert_eq!(bw.bit_position(), 3);
        assert_eq!(bw.into_bytes(), vec![0b1010_0000]);
    }
}
