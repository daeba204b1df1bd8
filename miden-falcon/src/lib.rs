//! Falcon lattice-based signatures over the ring Z\[x\]/(x^n + 1), q = 12289, for every
//! power-of-two degree n from 2 to 1024.
//!
//! The crate covers the whole Falcon pipeline:
//!
//! - NTRU key generation, solving fG - gF = q with exact big-integer arithmetic;
//! - the floating-point LDL sampling tree built from the secret basis;
//! - the discrete Gaussian sampler and the fast-Fourier sampler used to produce signatures;
//! - the compressed signature codec;
//! - verification through NTT multiplication and a squared-norm check.
//!
//! Signing is available either with a caller-supplied RNG ([PrivateKey::sign_with_rng]) or
//! deterministically ([PrivateKey::sign]), in which case the sampler randomness is derived from
//! the private key and the message using BLAKE3.
//!
//! No constant-time guarantees are made by this implementation.
#![no_std]

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod encoding;
mod errors;
mod hash_to_point;
mod keys;
pub mod math;
mod params;
mod signature;
pub mod utils;

#[cfg(test)]
mod tests;

use self::utils::{ByteReader, ByteWriter, Deserializable, DeserializationError, Serializable};

pub use self::{
    encoding::{compress, decompress},
    errors::FalconError,
    hash_to_point::hash_to_point,
    keys::{PrivateKey, PublicKey},
    math::{FalconFelt, LdlTree, Polynomial},
    params::{LOG_MAX_N, MAX_N, MIN_N, PublicParameters},
    signature::{Signature, SignatureHeader},
};

// CONSTANTS
// ================================================================================================

/// The Falcon modulus q.
pub const MODULUS: i16 = 12289;

/// Length of the salt (nonce) mixed into hash-to-point.
pub const SALT_LEN: usize = 40;

/// Length of the signature header byte.
pub const HEADER_LEN: usize = 1;
