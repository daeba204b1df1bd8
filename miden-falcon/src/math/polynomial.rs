//! Generic polynomial type and operations used in Falcon.

use alloc::vec::Vec;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use num::Zero;
use zeroize::Zeroize;

use super::{Inverse, field::FalconFelt};

/// Represents a polynomial with coefficients of type F.
///
/// Depending on `F` the same type carries a polynomial in coefficient form (`i16`, `i32`,
/// [BigInt](num::BigInt), `f64`), in FFT form (`Complex64`) or in NTT form ([FalconFelt]).
/// Unless stated otherwise, operations treat coefficient vectors as elements of
/// Z\[x\]/(x^n + 1) where n is the length of the vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polynomial<F> {
    /// Coefficients of the polynomial, ordered from lowest to highest degree.
    pub coefficients: Vec<F>,
}

impl<F> Polynomial<F> {
    /// Creates a new polynomial from the provided coefficients.
    pub fn new(coefficients: Vec<F>) -> Self {
        Self { coefficients }
    }

    /// Returns the number of coefficients of this polynomial.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns true if this polynomial has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Applies a function to each coefficient and returns a new polynomial.
    pub fn map<G, C: FnMut(&F) -> G>(&self, closure: C) -> Polynomial<G> {
        Polynomial::new(self.coefficients.iter().map(closure).collect())
    }

    /// Folds the coefficients using the provided function and initial value.
    pub fn fold<G, C: FnMut(G, &F) -> G>(&self, initial_value: G, closure: C) -> G {
        self.coefficients.iter().fold(initial_value, closure)
    }
}

impl<F: Clone> Polynomial<F> {
    /// Splits the polynomial into its even-indexed and odd-indexed coefficients, so that
    /// `self(x) = even(x^2) + x * odd(x^2)`.
    pub fn even_odd(&self) -> (Self, Self) {
        let even = self.coefficients.iter().step_by(2).cloned().collect();
        let odd = self.coefficients.iter().skip(1).step_by(2).cloned().collect();
        (Self::new(even), Self::new(odd))
    }

    /// Inverse of [Self::even_odd]: interleaves the coefficients of `even` and `odd`.
    pub fn interleave(even: &Self, odd: &Self) -> Self {
        debug_assert_eq!(even.len(), odd.len());
        let coefficients = even
            .coefficients
            .iter()
            .zip(odd.coefficients.iter())
            .flat_map(|(e, o)| [e.clone(), o.clone()])
            .collect();
        Self::new(coefficients)
    }
}

impl<F: Clone + Zero> Polynomial<F> {
    /// Returns the zero polynomial with `n` coefficients.
    pub fn zero_of_len(n: usize) -> Self {
        Self::new(vec![F::zero(); n])
    }

    /// Returns true if every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(Zero::is_zero)
    }
}

impl<F: Clone + Neg<Output = F>> Polynomial<F> {
    /// Returns the adjoint a*(x) = a(1/x) mod (x^n + 1), that is `[a0, -a_{n-1}, ..., -a1]`.
    ///
    /// In the FFT domain this corresponds to a coefficient-wise complex conjugation.
    pub fn adjoint(&self) -> Self {
        let mut coefficients = Vec::with_capacity(self.len());
        if let Some((first, rest)) = self.coefficients.split_first() {
            coefficients.push(first.clone());
            coefficients.extend(rest.iter().rev().map(|c| -c.clone()));
        }
        Self::new(coefficients)
    }
}

impl<F: Clone + Zero + Sub<Output = F>> Polynomial<F> {
    /// Reduces the polynomial modulo x^n + 1, folding every coefficient of degree `i >= n` onto
    /// degree `i mod n` with sign `(-1)^(i / n)`.
    pub fn reduce_by_cyclotomic(&self, n: usize) -> Self {
        let mut coefficients = vec![F::zero(); n];
        for (i, c) in self.coefficients.iter().enumerate() {
            let slot = &mut coefficients[i % n];
            *slot = if (i / n) % 2 == 0 {
                slot.clone() + c.clone()
            } else {
                slot.clone() - c.clone()
            };
        }
        Self::new(coefficients)
    }
}

impl<F: Copy + Mul<Output = F> + Inverse> Polynomial<F> {
    /// Multiplies two polynomials coefficient-wise (Hadamard multiplication).
    pub fn hadamard_mul(&self, other: &Self) -> Self {
        Polynomial::new(
            self.coefficients
                .iter()
                .zip(other.coefficients.iter())
                .map(|(a, b)| *a * *b)
                .collect(),
        )
    }

    /// Divides two polynomials coefficient-wise (Hadamard division). Zero divisors yield zero.
    pub fn hadamard_div(&self, other: &Self) -> Self {
        let other_coefficients_inverse = F::batch_inverse_or_zero(&other.coefficients);
        Polynomial::new(
            self.coefficients
                .iter()
                .zip(other_coefficients_inverse.iter())
                .map(|(a, b)| *a * *b)
                .collect(),
        )
    }

    /// Computes the coefficient-wise inverse (Hadamard inverse).
    pub fn hadamard_inv(&self) -> Self {
        Polynomial::new(F::batch_inverse_or_zero(&self.coefficients))
    }
}

// ARITHMETIC OPERATORS
// ================================================================================================

impl<F> Add for &Polynomial<F>
where
    F: Add<Output = F> + Clone,
{
    type Output = Polynomial<F>;

    fn add(self, rhs: Self) -> Self::Output {
        let (long, short) = if self.len() >= rhs.len() { (self, rhs) } else { (rhs, self) };
        let mut coefficients = long.coefficients.clone();
        for (c, s) in coefficients.iter_mut().zip(short.coefficients.iter()) {
            *c = c.clone() + s.clone();
        }
        Polynomial { coefficients }
    }
}

impl<F> Add for Polynomial<F>
where
    F: Add<Output = F> + Clone,
{
    type Output = Polynomial<F>;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl<F> AddAssign for Polynomial<F>
where
    F: Add<Output = F> + Clone,
{
    fn add_assign(&mut self, rhs: Self) {
        *self = &*self + &rhs;
    }
}

impl<F> Sub for &Polynomial<F>
where
    F: Add<Output = F> + Neg<Output = F> + Clone,
{
    type Output = Polynomial<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        self + &(-rhs)
    }
}

impl<F> Sub for Polynomial<F>
where
    F: Add<Output = F> + Neg<Output = F> + Clone,
{
    type Output = Polynomial<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl<F> SubAssign for Polynomial<F>
where
    F: Add<Output = F> + Neg<Output = F> + Clone,
{
    fn sub_assign(&mut self, rhs: Self) {
        *self = &*self - &rhs;
    }
}

impl<F: Neg<Output = F> + Clone> Neg for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn neg(self) -> Self::Output {
        self.map(|a| -a.clone())
    }
}

impl<F: Neg<Output = F> + Clone> Neg for Polynomial<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        -&self
    }
}

/// Plain (non-reduced) polynomial product, of length `len(a) + len(b) - 1`.
impl<F> Mul for &Polynomial<F>
where
    F: Add<Output = F> + Mul<Output = F> + Zero + Clone,
{
    type Output = Polynomial<F>;

    fn mul(self, other: Self) -> Self::Output {
        if self.is_empty() || other.is_empty() {
            return Polynomial::new(Vec::new());
        }
        let mut coefficients = vec![F::zero(); self.len() + other.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] = coefficients[i + j].clone() + a.clone() * b.clone();
            }
        }
        Polynomial { coefficients }
    }
}

impl<F> Mul for Polynomial<F>
where
    F: Add<Output = F> + Mul<Output = F> + Zero + Clone,
{
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        &self * &other
    }
}

impl<F: Mul<Output = F> + Clone> Mul<F> for &Polynomial<F> {
    type Output = Polynomial<F>;

    fn mul(self, other: F) -> Self::Output {
        self.map(|c| c.clone() * other.clone())
    }
}

impl<F: Mul<Output = F> + Clone> Mul<F> for Polynomial<F> {
    type Output = Polynomial<F>;

    fn mul(self, other: F) -> Self::Output {
        &self * other
    }
}

// FALCON-SPECIFIC HELPERS
// ================================================================================================

impl Polynomial<FalconFelt> {
    /// Computes the squared L2 norm of the polynomial, using balanced representatives.
    pub fn norm_squared(&self) -> u64 {
        self.fold(0u64, |acc, c| {
            let v = c.balanced_value() as i64;
            acc + (v * v) as u64
        })
    }

    /// Returns the coefficients in balanced signed representation.
    pub fn to_balanced(&self) -> Polynomial<i16> {
        self.map(FalconFelt::balanced_value)
    }
}

impl Polynomial<i16> {
    /// Computes the squared L2 norm of the polynomial.
    pub fn norm_squared(&self) -> u64 {
        self.fold(0u64, |acc, &c| acc + (c as i64 * c as i64) as u64)
    }
}

impl From<&Polynomial<i16>> for Polynomial<FalconFelt> {
    fn from(item: &Polynomial<i16>) -> Self {
        item.map(|&a| FalconFelt::from(a))
    }
}

impl From<&[i16]> for Polynomial<FalconFelt> {
    fn from(item: &[i16]) -> Self {
        Polynomial::new(item.iter().map(|&a| FalconFelt::from(a)).collect())
    }
}

// ZEROIZE IMPLEMENTATIONS
// ================================================================================================

impl<F: Zeroize> Zeroize for Polynomial<F> {
    fn zeroize(&mut self) {
        self.coefficients.zeroize();
    }
}

// TESTS
// ================================================================================================
