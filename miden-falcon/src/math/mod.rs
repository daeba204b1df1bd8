//! Arithmetic layer of the Falcon engine.
//!
//! Polynomials live in one of three representations:
//!
//! 1. coefficient form, with integer (`i16`, [BigInt](num::BigInt)) or real coefficients;
//! 2. FFT form ([Complex64](num_complex::Complex64) evaluations at the roots of `x^n + 1`);
//! 3. NTT form ([FalconFelt] evaluations at the roots of `x^n + 1` in Z_q).
//!
//! On top of this sit the big-integer algebra used to solve the NTRU equation, the NTRU key
//! generator, the LDL sampling tree, and the two samplers (the integer Gaussian sampler and the
//! fast-Fourier sampler).
//!
//! It uses and acknowledges the work in:
//!
//! 1. The [reference](https://falcon-sign.info/impl/README.txt.html) implementation by Thomas
//!    Pornin.
//! 2. The [Python](https://github.com/tprest/falcon.py) implementation by Thomas Prest.
use alloc::vec::Vec;
use core::ops::MulAssign;

use num::{One, Zero};

use super::MODULUS;

mod bigint;
pub use bigint::{bitsize, reduce, xgcd};

mod fft;
pub use fft::{CyclotomicFourier, FastFft};

mod field;
pub use field::FalconFelt;

mod ffsampling;
pub use ffsampling::{
    LdlTree, ffldl, ffnp, ffsampling, gram, gram_coefficients, ldl, normalize_tree,
};

mod ntru;
pub use ntru::{NtruError, gen_poly, gs_norm, ntru_gen, ntru_solve};

mod polynomial;
pub use polynomial::Polynomial;

mod samplerz;
pub use samplerz::sampler_z;

// INVERSION
// ================================================================================================

pub trait Inverse: Copy + Zero + MulAssign + One {
    /// Gets the inverse of a, or zero if it is zero.
    fn inverse_or_zero(self) -> Self;

    /// Gets the inverses of a batch of elements, and skip over any that are zero.
    fn batch_inverse_or_zero(batch: &[Self]) -> Vec<Self> {
        let mut acc = Self::one();
        let mut rp: Vec<Self> = Vec::with_capacity(batch.len());
        for batch_item in batch {
            if !batch_item.is_zero() {
                rp.push(acc);
                acc = *batch_item * acc;
            } else {
                rp.push(Self::zero());
            }
        }
        let mut inv = Self::inverse_or_zero(acc);
        for i in (0..batch.len()).rev() {
            if !batch[i].is_zero() {
                rp[i] *= inv;
                inv *= batch[i];
            }
        }
        rp
    }
}
