//! Recursive Fourier transforms over Z\[x\]/(x^n + 1).
//!
//! The same split/merge recursion is used in two domains:
//!
//! - over the complex numbers, where it is the FFT used for all floating-point arithmetic;
//! - over Z_q, where it is the NTT used for exact arithmetic mod q.
//!
//! In both domains the j-th output of a degree-n transform is the evaluation of the input at
//! `ζ^e(n, j)`, for a fixed primitive 2048-th root of unity ζ and an exponent table shared by the
//! two domains. Both root tables are computed at compile time.

use alloc::vec::Vec;
use core::{
    f64::consts::PI,
    ops::{Add, Mul, Sub},
};

use num::Zero;
use num_complex::Complex64;
use zeroize::Zeroize;

use super::{FalconFelt, Inverse, Polynomial};
use crate::{errors::FalconError, params::MAX_N};

// CONSTANTS
// ================================================================================================

/// Number of tabulated powers of the primitive root, i.e., its order.
const ROOTS_LEN: usize = 2 * MAX_N;

/// A primitive 2048-th root of unity mod q, chosen so that `OMEGA^512 = 1479`.
const OMEGA: FalconFelt = FalconFelt::new(1945);

/// Inverse of 2 mod q.
const I2: FalconFelt = FalconFelt::new(6145);

/// Evaluation order shared by both transforms: the j-th point of the degree-1024 transform is
/// `ζ^ROOT_EXPONENTS[j]`. Smaller degrees use a strided view of this table.
static ROOT_EXPONENTS: [u16; MAX_N] = root_exponents();

/// `COMPLEX_ROOTS[k] = exp(i * pi * k / 1024)`.
static COMPLEX_ROOTS: [Complex64; ROOTS_LEN] = complex_roots();

/// `ZQ_ROOTS[k] = OMEGA^k mod q`.
static ZQ_ROOTS: [FalconFelt; ROOTS_LEN] = zq_roots();

const fn root_exponents() -> [u16; MAX_N] {
    // the roots of x^2 + 1 are ζ^512 and ζ^-512; every doubling of the degree replaces each root
    // r of x^m + 1 by the two square roots of r
    let mut exps = [0i32; MAX_N];
    exps[0] = 1;
    exps[1] = -1;
    let mut m = 2;
    while m < MAX_N {
        let mut i = m;
        while i > 0 {
            i -= 1;
            let x = exps[i];
            exps[2 * i] = x;
            exps[2 * i + 1] = if x > 0 { x - 2 * m as i32 } else { x + 2 * m as i32 };
        }
        m *= 2;
    }

    let mut table = [0u16; MAX_N];
    let mut j = 0;
    while j < MAX_N {
        table[j] = exps[j].rem_euclid(ROOTS_LEN as i32) as u16;
        j += 1;
    }
    table
}

/// Returns (sin(theta), cos(theta)) for theta in [0, pi/2].
const fn sin_cos(theta: f64) -> (f64, f64) {
    let x2 = theta * theta;
    let (mut sin, mut cos) = (theta, 1.0);
    let (mut sin_term, mut cos_term) = (theta, 1.0);
    let mut k = 1;
    while k < 20 {
        let k2 = (2 * k) as f64;
        cos_term = -cos_term * x2 / ((k2 - 1.0) * k2);
        sin_term = -sin_term * x2 / (k2 * (k2 + 1.0));
        cos += cos_term;
        sin += sin_term;
        k += 1;
    }
    (sin, cos)
}

const fn complex_roots() -> [Complex64; ROOTS_LEN] {
    let quarter = ROOTS_LEN / 4;
    let mut table = [Complex64 { re: 0.0, im: 0.0 }; ROOTS_LEN];
    let mut k = 0;
    while k < ROOTS_LEN {
        let (sin, cos) = sin_cos(PI * (k % quarter) as f64 / MAX_N as f64);
        // rotate by i^(k / quarter)
        table[k] = match k / quarter {
            0 => Complex64 { re: cos, im: sin },
            1 => Complex64 { re: -sin, im: cos },
            2 => Complex64 { re: -cos, im: -sin },
            _ => Complex64 { re: sin, im: -cos },
        };
        k += 1;
    }
    table
}

const fn zq_roots() -> [FalconFelt; ROOTS_LEN] {
    let mut table = [FalconFelt::new(1); ROOTS_LEN];
    let mut k = 1;
    while k < ROOTS_LEN {
        table[k] = table[k - 1].const_mul(OMEGA);
        k += 1;
    }
    table
}

/// Exponent of ζ at which the j-th coefficient of a degree-n transform is evaluated.
fn root_exponent(n: usize, j: usize) -> usize {
    let stride = MAX_N / n;
    (stride * ROOT_EXPONENTS[stride * j] as usize) % ROOTS_LEN
}

// CYCLOTOMIC FOURIER
// ================================================================================================

/// A domain that tabulates the roots of x^n + 1 for every supported n, and hence supports the
/// recursive Falcon transform.
pub trait CyclotomicFourier:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    /// Returns ζ^k for the fixed primitive 2048-th root of unity ζ of this domain.
    fn power_of_root(k: usize) -> Self;

    /// Returns 1/2.
    fn half() -> Self;

    /// Returns the j-th root of x^n + 1 in transform order.
    fn root(n: usize, j: usize) -> Self {
        Self::power_of_root(root_exponent(n, j))
    }

    /// Returns the inverse of [Self::root].
    fn inverse_root(n: usize, j: usize) -> Self {
        Self::power_of_root((ROOTS_LEN - root_exponent(n, j)) % ROOTS_LEN)
    }
}

impl CyclotomicFourier for Complex64 {
    fn power_of_root(k: usize) -> Self {
        COMPLEX_ROOTS[k % ROOTS_LEN]
    }

    fn half() -> Self {
        Complex64::new(0.5, 0.0)
    }
}

impl CyclotomicFourier for FalconFelt {
    fn power_of_root(k: usize) -> Self {
        ZQ_ROOTS[k % ROOTS_LEN]
    }

    fn half() -> Self {
        I2
    }
}

impl Inverse for Complex64 {
    fn inverse_or_zero(self) -> Self {
        let norm = self.norm_sqr();
        if norm == 0.0 {
            return Complex64::zero();
        }
        self.conj() / norm
    }

    // The running product of the default batch inversion leaves the f64 range for large n.
    fn batch_inverse_or_zero(batch: &[Self]) -> Vec<Self> {
        batch.iter().map(|c| c.inverse_or_zero()).collect()
    }
}

// FAST FOURIER TRANSFORM
// ================================================================================================

/// Split/merge based Fourier transform of polynomials in Z\[x\]/(x^n + 1).
///
/// For [FalconFelt] coefficients the transform is the NTT mod q; for [Complex64] coefficients it
/// is the complex FFT.
pub trait FastFft: Sized {
    /// Transforms coefficient form into evaluation form.
    fn fft(&self) -> Self;

    /// Transforms evaluation form back into coefficient form.
    fn ifft(&self) -> Self;

    /// Splits a transformed polynomial f into transformed (f0, f1) with
    /// f(x) = f0(x^2) + x * f1(x^2).
    fn split_fft(&self) -> (Self, Self);

    /// Inverse of [FastFft::split_fft].
    fn merge_fft(f0: &Self, f1: &Self) -> Self;
}

impl<F: CyclotomicFourier> FastFft for Polynomial<F> {
    fn fft(&self) -> Self {
        let c = &self.coefficients;
        match c.len() {
            0 | 1 => self.clone(),
            2 => {
                let i = F::root(2, 0);
                Polynomial::new(vec![c[0] + i * c[1], c[0] - i * c[1]])
            },
            _ => {
                let (even, odd) = self.even_odd();
                Self::merge_fft(&even.fft(), &odd.fft())
            },
        }
    }

    fn ifft(&self) -> Self {
        let c = &self.coefficients;
        match c.len() {
            0 | 1 => self.clone(),
            2 => {
                let half = F::half();
                let i_inv = F::inverse_root(2, 0);
                Polynomial::new(vec![half * (c[0] + c[1]), half * (c[0] - c[1]) * i_inv])
            },
            _ => {
                let (f0, f1) = self.split_fft();
                Polynomial::interleave(&f0.ifft(), &f1.ifft())
            },
        }
    }

    fn split_fft(&self) -> (Self, Self) {
        let n = self.len();
        let half = F::half();
        let (f0, f1): (Vec<F>, Vec<F>) = self
            .coefficients
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                let (a, b) = (pair[0], pair[1]);
                (half * (a + b), half * (a - b) * F::inverse_root(n, 2 * i))
            })
            .unzip();
        (Polynomial::new(f0), Polynomial::new(f1))
    }

    fn merge_fft(f0: &Self, f1: &Self) -> Self {
        let n = 2 * f0.len();
        let mut coefficients = Vec::with_capacity(n);
        for (i, (&a, &b)) in f0.coefficients.iter().zip(f1.coefficients.iter()).enumerate() {
            let t = F::root(n, 2 * i) * b;
            coefficients.push(a + t);
            coefficients.push(a - t);
        }
        Polynomial::new(coefficients)
    }
}

// FFT DOMAIN HELPERS
// ================================================================================================

impl Polynomial<Complex64> {
    /// Returns the FFT of a polynomial with real coefficients.
    pub fn fft_of<T: Copy + Into<f64>>(poly: &Polynomial<T>) -> Self {
        poly.map(|&c| Complex64::new(c.into(), 0.0)).fft()
    }

    /// Returns the real coefficients of the inverse FFT of this polynomial.
    pub fn ifft_real(&self) -> Polynomial<f64> {
        self.ifft().map(|c| c.re)
    }

    /// Returns the adjoint of this polynomial in the FFT domain (coefficient-wise conjugation).
    pub fn adj_fft(&self) -> Self {
        self.map(Complex64::conj)
    }

    /// Returns `self * adj(self)`, which is real and non-negative at every evaluation point.
    pub fn self_adj_product(&self) -> Self {
        self.map(|c| Complex64::new(c.norm_sqr(), 0.0))
    }

    /// Overwrites every coefficient with zero.
    pub fn zeroize_fft(&mut self) {
        for c in self.coefficients.iter_mut() {
            c.re.zeroize();
            c.im.zeroize();
        }
    }
}

impl Polynomial<f64> {
    /// Multiplies two real polynomials mod x^n + 1 through the FFT.
    pub fn mul_fft(&self, other: &Self) -> Self {
        let other_fft = Polynomial::<Complex64>::fft_of(other);
        Polynomial::<Complex64>::fft_of(self).hadamard_mul(&other_fft).ifft_real()
    }

    /// Divides two real polynomials mod x^n + 1 through the FFT.
    pub fn div_fft(&self, other: &Self) -> Self {
        let other_fft = Polynomial::<Complex64>::fft_of(other);
        Polynomial::<Complex64>::fft_of(self).hadamard_div(&other_fft).ifft_real()
    }
}

// NTT DOMAIN HELPERS
// ================================================================================================

impl Polynomial<FalconFelt> {
    /// Multiplies two polynomials in Z_q\[x\]/(x^n + 1) through the NTT.
    pub fn mul_zq(&self, other: &Self) -> Self {
        self.fft().hadamard_mul(&other.fft()).ifft()
    }

    /// Divides two polynomials in Z_q\[x\]/(x^n + 1) through the NTT.
    ///
    /// # Errors
    /// Returns an error if `other` is not invertible, i.e., if any coefficient of its NTT is zero.
    pub fn div_zq(&self, other: &Self) -> Result<Self, FalconError> {
        let other_ntt = other.fft();
        if other_ntt.coefficients.iter().any(Zero::is_zero) {
            return Err(FalconError::DivisionByZero);
        }
        Ok(self.fft().hadamard_div(&other_ntt).ifft())
    }

    /// Returns true if this polynomial is invertible in Z_q\[x\]/(x^n + 1).
    pub fn is_invertible(&self) -> bool {
        !self.fft().coefficients.iter().any(Zero::is_zero)
    }
}

// TESTS
// ================================================================================================
