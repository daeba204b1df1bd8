//! Exact polynomial algebra over arbitrary-precision integers, used to solve the NTRU equation.

use alloc::vec::Vec;

use num::{BigInt, FromPrimitive, Integer, One, ToPrimitive, Zero};
#[cfg(not(feature = "std"))]
use num::Float;
use num_complex::Complex64;
use tracing::trace;

use super::{NtruError, Polynomial};

/// Precision, in bits, of the floating-point approximations used by Babai reduction.
const REDUCE_PRECISION: u64 = 53;

/// Upper bound on the number of Babai reduction rounds for a single (F, G) candidate.
const MAX_REDUCE_ROUNDS: usize = 4096;

// KARATSUBA
// ================================================================================================

/// Multiplies `a` and `b`, both of length `n` (a power of two), returning the full product of
/// length `2n` (the last coefficient is always zero).
fn karatsuba(a: &[BigInt], b: &[BigInt], n: usize) -> Vec<BigInt> {
    if n == 1 {
        return vec![&a[0] * &b[0], BigInt::zero()];
    }
    let n2 = n / 2;
    let (a0, a1) = a.split_at(n2);
    let (b0, b1) = b.split_at(n2);
    let ax: Vec<BigInt> = a0.iter().zip(a1).map(|(x, y)| x + y).collect();
    let bx: Vec<BigInt> = b0.iter().zip(b1).map(|(x, y)| x + y).collect();

    let a0b0 = karatsuba(a0, b0, n2);
    let a1b1 = karatsuba(a1, b1, n2);
    let mut axbx = karatsuba(&ax, &bx, n2);
    for i in 0..n {
        axbx[i] -= &a0b0[i] + &a1b1[i];
    }

    let mut ab = vec![BigInt::zero(); 2 * n];
    for i in 0..n {
        ab[i] += &a0b0[i];
        ab[i + n] += &a1b1[i];
        ab[i + n2] += &axbx[i];
    }
    ab
}

impl Polynomial<BigInt> {
    /// Returns the full (non-reduced) product of two polynomials of equal power-of-two length n,
    /// as a polynomial of length 2n.
    pub fn karatsuba(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Polynomial::new(karatsuba(&self.coefficients, &other.coefficients, self.len()))
    }

    /// Returns the product of two polynomials in Z\[x\]/(x^n + 1).
    pub fn karamul(&self, other: &Self) -> Self {
        let n = self.len();
        let ab = self.karatsuba(other).coefficients;
        let (low, high) = ab.split_at(n);
        Polynomial::new(low.iter().zip(high).map(|(l, h)| l - h).collect())
    }

    /// Returns a(-x), i.e., the polynomial with its odd-indexed coefficients negated.
    pub fn galois_conjugate(&self) -> Self {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| if i % 2 == 0 { c.clone() } else { -c })
            .collect();
        Polynomial::new(coefficients)
    }

    /// Projects a polynomial of Z\[x\]/(x^n + 1) onto Z\[x\]/(x^(n/2) + 1).
    ///
    /// Writing a(x) = ae(x^2) + x * ao(x^2), the field norm is ae^2 - x * ao^2.
    pub fn field_norm(&self) -> Self {
        let n2 = self.len() / 2;
        let (ae, ao) = self.even_odd();
        let ao_squared = ao.karamul(&ao).coefficients;
        let mut norm = ae.karamul(&ae);
        for i in 0..n2 - 1 {
            norm.coefficients[i + 1] -= &ao_squared[i];
        }
        // x * x^(n/2 - 1) = -1 mod x^(n/2) + 1
        norm.coefficients[0] += &ao_squared[n2 - 1];
        norm
    }

    /// Lifts a polynomial of Z\[x\]/(x^(n/2) + 1) to Z\[x\]/(x^n + 1), mapping a(x) to a(x^2).
    pub fn lift(&self) -> Self {
        let mut coefficients = vec![BigInt::zero(); 2 * self.len()];
        for (i, c) in self.coefficients.iter().enumerate() {
            coefficients[2 * i] = c.clone();
        }
        Polynomial::new(coefficients)
    }

    /// Returns the largest [bitsize] among the coefficients, floored at `floor`.
    fn max_bitsize(&self, floor: u64) -> u64 {
        self.coefficients.iter().map(bitsize).fold(floor, u64::max)
    }

    /// Shifts every coefficient right by `shift` bits (rounding down) and converts the result
    /// to the FFT domain.
    fn truncated_fft(&self, shift: u64) -> Result<Polynomial<Complex64>, NtruError> {
        let coefficients = self
            .coefficients
            .iter()
            .map(|c| (c >> shift).to_f64().ok_or(NtruError::ReductionDiverged))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(Polynomial::<Complex64>::fft_of(&Polynomial::new(coefficients)))
    }
}

impl From<&Polynomial<i16>> for Polynomial<BigInt> {
    fn from(poly: &Polynomial<i16>) -> Self {
        poly.map(|&c| BigInt::from(c))
    }
}

impl Polynomial<BigInt> {
    /// Converts the polynomial to `i16` coefficients, or returns `None` if a coefficient is out
    /// of range.
    pub fn to_i16(&self) -> Option<Polynomial<i16>> {
        self.coefficients
            .iter()
            .map(ToPrimitive::to_i16)
            .collect::<Option<Vec<_>>>()
            .map(Polynomial::new)
    }
}

// SCALAR HELPERS
// ================================================================================================

/// Returns the bit length of |a|, rounded up to a multiple of 8.
pub fn bitsize(a: &BigInt) -> u64 {
    a.bits().div_ceil(8) * 8
}

/// Extended Euclidean algorithm: returns (d, u, v) such that d = gcd(b, n) = u * b + v * n.
pub fn xgcd(b: &BigInt, n: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut b, mut n) = (b.clone(), n.clone());
    let (mut x0, mut x1) = (BigInt::one(), BigInt::zero());
    let (mut y0, mut y1) = (BigInt::zero(), BigInt::one());
    while !n.is_zero() {
        let (q, r) = b.div_mod_floor(&n);
        b = core::mem::replace(&mut n, r);
        let x2 = &x0 - &q * &x1;
        x0 = core::mem::replace(&mut x1, x2);
        let y2 = &y0 - &q * &y1;
        y0 = core::mem::replace(&mut y1, y2);
    }
    (b, x0, y0)
}

// BABAI REDUCTION
// ================================================================================================

/// Reduces (F, G) relative to (f, g) using Babai's round-off algorithm, so that fG - gF is
/// unchanged and (F, G) becomes as short as (f, g) allows.
///
/// The quotient k = round((F f* + G g*) / (f f* + g g*)) is computed in the FFT domain on
/// 53-bit approximations of the operands. Each round subtracts (k f, k g), scaled to the current
/// size of (F, G), until that size drops below the size of (f, g) or k vanishes.
///
/// # Errors
/// Returns an error if the reduction does not settle within a fixed number of rounds.
pub fn reduce(
    f: &Polynomial<BigInt>,
    g: &Polynomial<BigInt>,
    big_f: &mut Polynomial<BigInt>,
    big_g: &mut Polynomial<BigInt>,
) -> Result<(), NtruError> {
    let size = g.max_bitsize(f.max_bitsize(REDUCE_PRECISION));
    let f_fft = f.truncated_fft(size - REDUCE_PRECISION)?;
    let g_fft = g.truncated_fft(size - REDUCE_PRECISION)?;
    let denominator = &f_fft.self_adj_product() + &g_fft.self_adj_product();
    let f_adj = f_fft.adj_fft();
    let g_adj = g_fft.adj_fft();

    for round in 0..MAX_REDUCE_ROUNDS {
        let big_size = big_g.max_bitsize(big_f.max_bitsize(REDUCE_PRECISION));
        if big_size < size {
            trace!(round, "babai reduction converged");
            return Ok(());
        }

        let big_f_fft = big_f.truncated_fft(big_size - REDUCE_PRECISION)?;
        let big_g_fft = big_g.truncated_fft(big_size - REDUCE_PRECISION)?;
        let numerator = &big_f_fft.hadamard_mul(&f_adj) + &big_g_fft.hadamard_mul(&g_adj);
        let k = numerator
            .hadamard_div(&denominator)
            .ifft_real()
            .coefficients
            .into_iter()
            .map(|c| BigInt::from_f64(c.round()).ok_or(NtruError::ReductionDiverged))
            .collect::<Result<Vec<_>, _>>()?;
        if k.iter().all(Zero::is_zero) {
            trace!(round, "babai reduction reached a zero quotient");
            return Ok(());
        }

        let k = Polynomial::new(k);
        let shift = big_size - size;
        let fk = f.karamul(&k);
        let gk = g.karamul(&k);
        for (c, d) in big_f.coefficients.iter_mut().zip(fk.coefficients) {
            *c -= d << shift;
        }
        for (c, d) in big_g.coefficients.iter_mut().zip(gk.coefficients) {
            *c -= d << shift;
        }
    }

    Err(NtruError::ReductionDiverged)
}

// TESTS
// ================================================================================================
