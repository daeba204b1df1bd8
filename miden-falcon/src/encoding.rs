//! Compressed encoding of signature polynomials.
//!
//! Every coefficient v is written as:
//!
//! 1. one sign bit, set when v is negative;
//! 2. the 7 low bits of |v|, most significant first;
//! 3. |v| >> 7 in unary: that many zero bits followed by a one bit.
//!
//! The resulting bit stream is packed most significant bit first and padded with zeros to the
//! requested length.

use alloc::vec::Vec;

use crate::errors::FalconError;

/// Number of low bits of |v| written verbatim.
const LOW_BITS: u32 = 7;

const LOW_MASK: u16 = (1 << LOW_BITS) - 1;

/// Largest unary part of a coefficient that fits in an `i16`.
const MAX_HIGH: u32 = i16::MAX as u32 >> LOW_BITS;

// COMPRESSION
// ================================================================================================

/// Compresses the coefficients `v` into exactly `slen` bytes.
///
/// # Errors
/// Returns an error if the encoding of `v` needs more than `8 * slen` bits.
pub fn compress(v: &[i16], slen: usize) -> Result<Vec<u8>, FalconError> {
    let mut writer = BitWriter::new(slen);
    for &coef in v {
        let abs = coef.unsigned_abs();
        writer.push_bits(u16::from(coef < 0), 1)?;
        writer.push_bits(abs & LOW_MASK, LOW_BITS)?;
        for _ in 0..abs >> LOW_BITS {
            writer.push_bits(0, 1)?;
        }
        writer.push_bits(1, 1)?;
    }
    Ok(writer.finish())
}

/// Accumulates bits most significant first into at most `max_len` bytes.
struct BitWriter {
    bytes: Vec<u8>,
    max_len: usize,
    acc: u32,
    acc_len: u32,
}

impl BitWriter {
    fn new(max_len: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(max_len),
            max_len,
            acc: 0,
            acc_len: 0,
        }
    }

    /// Appends the `count` low bits of `value`; `count` is at most 8.
    fn push_bits(&mut self, value: u16, count: u32) -> Result<(), FalconError> {
        if 8 * self.bytes.len() + (self.acc_len + count) as usize > 8 * self.max_len {
            return Err(FalconError::EncodingTooLong(self.max_len));
        }
        self.acc = (self.acc << count) | u32::from(value);
        self.acc_len += count;
        if self.acc_len >= 8 {
            self.acc_len -= 8;
            self.bytes.push((self.acc >> self.acc_len) as u8);
            self.acc &= (1 << self.acc_len) - 1;
        }
        Ok(())
    }

    /// Flushes the pending bits and pads the output with zeros up to `max_len` bytes.
    fn finish(mut self) -> Vec<u8> {
        if self.acc_len > 0 {
            self.bytes.push((self.acc << (8 - self.acc_len)) as u8);
        }
        self.bytes.resize(self.max_len, 0);
        self.bytes
    }
}

// DECOMPRESSION
// ================================================================================================

/// Decompresses `n` coefficients from `x`, which must be at most `slen` bytes long.
///
/// Trailing zero bits are treated as padding. Bits left over once `n` coefficients have been
/// read are ignored.
///
/// # Errors
/// Returns an error if:
/// - `x` is longer than `slen` bytes or contains no set bit;
/// - a zero coefficient is encoded with a negative sign;
/// - a coefficient does not fit in an `i16`;
/// - the stream ends in the middle of a coefficient or yields fewer than `n` coefficients.
pub fn decompress(x: &[u8], slen: usize, n: usize) -> Result<Vec<i16>, FalconError> {
    if x.len() > slen {
        return Err(FalconError::InvalidEncoding("encoding is longer than expected"));
    }
    let mut reader = BitReader::new(x)?;

    let mut v = Vec::with_capacity(n);
    while !reader.is_empty() && v.len() < n {
        let negative = reader.read_bits(1)? == 1;
        let low = reader.read_bits(LOW_BITS)?;
        let mut high = 0u32;
        while reader.read_bits(1)? == 0 {
            high += 1;
            if high > MAX_HIGH {
                return Err(FalconError::InvalidEncoding("coefficient is out of range"));
            }
        }

        let abs = (high << LOW_BITS) | low;
        if negative && abs == 0 {
            return Err(FalconError::InvalidEncoding("zero is encoded with a negative sign"));
        }
        let abs = abs as i16;
        v.push(if negative { -abs } else { abs });
    }

    if v.len() != n {
        return Err(FalconError::InvalidEncoding("wrong number of coefficients"));
    }
    Ok(v)
}

/// Reads bits most significant first, up to and including the last set bit of the input.
struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    len: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Result<Self, FalconError> {
        let (last, byte) = bytes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, byte)| **byte != 0)
            .ok_or(FalconError::InvalidEncoding("encoding has no set bit"))?;
        let len = 8 * last + 8 - byte.trailing_zeros() as usize;
        Ok(Self { bytes, pos: 0, len })
    }

    fn is_empty(&self) -> bool {
        self.pos == self.len
    }

    /// Reads `count` bits as an unsigned integer.
    fn read_bits(&mut self, count: u32) -> Result<u32, FalconError> {
        if self.len - self.pos < count as usize {
            return Err(FalconError::InvalidEncoding(
                "encoding ends in the middle of a coefficient",
            ));
        }
        let mut value = 0;
        for _ in 0..count {
            let bit = (self.bytes[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn compress_matches_reference_vector() {
        assert_eq!(compress(&COMPRESS_V, 81).unwrap(), COMPRESS_X);
        assert_eq!(compress(&[1, -1], 3).unwrap(), [0x01, 0xc0, 0xc0]);
        assert_eq!(compress(&[3, -200, 0], 4).unwrap(), [0x03, 0xe4, 0x20, 0x10]);
    }

    #[test]
    fn compress_rejects_long_encodings() {
        assert_matches!(
            compress(&[128, 256, 512, 1024], 2),
            Err(FalconError::EncodingTooLong(2))
        );
        // 9 bits do not fit in a single byte
        assert_matches!(compress(&[0], 1), Err(FalconError::EncodingTooLong(1)));
        assert_eq!(compress(&[], 2).unwrap(), [0, 0]);
    }

    #[test]
    fn decompress_matches_reference_vectors() {
        assert_eq!(decompress(&DECOMPRESS_X, 81, 64).unwrap(), DECOMPRESS_V);
        assert_eq!(decompress(&COMPRESS_X, 81, 64).unwrap(), COMPRESS_V);
    }

    #[test]
    fn decompress_rejects_malformed_inputs() {
        // longer than slen
        assert_matches!(decompress(&[0x01, 0x80], 1, 1), Err(FalconError::InvalidEncoding(_)));
        // only padding
        assert_matches!(decompress(&[0, 0], 2, 1), Err(FalconError::InvalidEncoding(_)));
        assert_matches!(decompress(&[], 2, 1), Err(FalconError::InvalidEncoding(_)));
        // negative zero
        assert_matches!(decompress(&[0x80, 0x80], 2, 1), Err(FalconError::InvalidEncoding(_)));
        // unary part never terminates
        assert_matches!(decompress(&[0x01], 1, 1), Err(FalconError::InvalidEncoding(_)));
        // too few coefficients
        assert_matches!(decompress(&[0x01, 0x80], 2, 2), Err(FalconError::InvalidEncoding(_)));
        // |v| = 256 << 7 does not fit in an i16
        let mut huge = vec![0u8; 34];
        huge[33] = 0x80;
        assert_matches!(decompress(&huge, 34, 1), Err(FalconError::InvalidEncoding(_)));
    }

    #[test]
    fn decompress_ignores_bits_after_the_last_coefficient() {
        assert_eq!(decompress(&[0x01, 0x80, 0xff], 3, 1).unwrap(), [1]);
    }

    proptest! {
        #[test]
        fn compress_then_decompress(v in prop::collection::vec(-2047i16..=2047, 1..64)) {
            let slen = 2 * 64 + 8 * v.len();
            let x = compress(&v, slen).unwrap();
            prop_assert_eq!(x.len(), slen);
            prop_assert_eq!(decompress(&x, slen, v.len()).unwrap(), v);
        }
    }

    const COMPRESS_V: [i16; 64] = [
        176, -210, 53, 15, -91, -305, 324, 252, -30, 5, -83, 272, 0, 93, -117, 196, 22, 229, -217,
        -204, 5, -232, 61, -203, -27, -129, 28, -42, 81, 20, -23, -88, 255, -75, 10, 233, 54, 1,
        32, 48, 157, -124, -231, -159, -123, 94, -112, -246, 146, 46, -179, 282, -67, 114, -139,
        -122, -51, 443, 171, 23, 397, 180, -15, 67,
    ];

    const COMPRESS_X: [u8; 81] = [
        48, 116, 147, 88, 127, 111, 98, 81, 11, 227, 61, 5, 233, 196, 8, 5, 119, 235, 68, 69, 172,
        174, 203, 152, 130, 250, 19, 222, 91, 55, 129, 71, 53, 85, 24, 166, 95, 177, 127, 114, 225,
        86, 148, 218, 3, 32, 152, 71, 95, 207, 59, 62, 253, 215, 190, 31, 100, 73, 46, 217, 163,
        71, 14, 229, 139, 126, 182, 115, 177, 43, 69, 225, 162, 104, 199, 208, 224, 0, 0, 0, 0,
    ];

    const DECOMPRESS_X: [u8; 81] = [
        85, 198, 106, 215, 19, 11, 127, 229, 79, 178, 214, 39, 138, 192, 231, 81, 170, 61, 121,
        143, 220, 161, 182, 200, 11, 137, 218, 228, 105, 90, 136, 246, 119, 125, 14, 67, 93, 170,
        47, 204, 180, 202, 202, 135, 115, 65, 237, 179, 226, 160, 48, 130, 206, 158, 255, 162, 2,
        104, 178, 235, 203, 11, 237, 169, 164, 165, 145, 239, 44, 43, 240, 147, 37, 235, 115, 159,
        0, 0, 0, 0, 0,
    ];

    const DECOMPRESS_V: [i16; 64] = [
        85, -12, -171, 369, -5, 127, -74, 62, -22, 226, -98, 224, -78, 70, 81, -87, 49, -375, 195,
        -182, 129, -68, -90, -72, -165, -40, 30, -29, -62, 142, 141, -90, 69, -371, 105, 299, 80,
        -92, -32, -109, 103, -10, 1, 264, 231, 61, -126, 400, 180, 101, -303, 225, -118, -41, 201,
        44, 30, -101, 10, -248, 166, 175, 238, -79,
    ];
}
