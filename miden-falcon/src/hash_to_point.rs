use alloc::vec::Vec;

use sha3::{
    Shake256,
    digest::{ExtendableOutput, Update, XofReader},
};

use crate::{
    MODULUS,
    math::{FalconFelt, Polynomial},
};

/// Largest multiple of q that fits in 16 bits; 16-bit samples at or above it are rejected.
const ACCEPT_BOUND: u32 = (u16::MAX as u32 + 1) / MODULUS as u32 * MODULUS as u32;

// HASH-TO-POINT
// ================================================================================================

/// Hashes a salt and a message to a uniformly distributed polynomial of degree `n` in
/// Z_q\[x\]/(x^n + 1).
///
/// SHAKE256 absorbs the salt followed by the message. Its output is consumed two bytes at a
/// time as big-endian 16-bit values; values below 5q are accepted and reduced mod q, the others
/// are discarded.
pub fn hash_to_point(message: &[u8], salt: &[u8], n: usize) -> Polynomial<FalconFelt> {
    let mut hasher = Shake256::default();
    hasher.update(salt);
    hasher.update(message);
    let mut reader = hasher.finalize_xof();

    let mut coefficients = Vec::with_capacity(n);
    let mut buf = [0_u8; 2];
    while coefficients.len() < n {
        reader.read(&mut buf);
        let value = u32::from(u16::from_be_bytes(buf));
        if value < ACCEPT_BOUND {
            coefficients.push(FalconFelt::new((value % MODULUS as u32) as u16));
        }
    }

    Polynomial::new(coefficients)
}

// TESTS
// ================================================================================================
