use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num::{One, Zero};
use zeroize::Zeroize;

use super::{Inverse, MODULUS};

const Q: u32 = MODULUS as u32;

// FALCON FIELD ELEMENT
// ================================================================================================

/// An element of Z_q, q = 12289.
///
/// The element is always stored as its canonical representative in [0, q). The balanced
/// representative in [-(q-1)/2, (q-1)/2] is available through [FalconFelt::balanced_value].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FalconFelt(u16);

impl FalconFelt {
    /// Creates a new field element, reducing `value` mod q.
    pub const fn new(value: u16) -> Self {
        Self((value as u32 % Q) as u16)
    }

    /// Returns the canonical representative of this element in [0, q).
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the representative of this element in [-(q-1)/2, (q-1)/2].
    pub const fn balanced_value(&self) -> i16 {
        let value = self.0 as i16;
        if value > MODULUS / 2 { value - MODULUS } else { value }
    }

    /// Raises this element to the power `exp`.
    pub const fn pow(self, mut exp: u32) -> Self {
        let mut base = self.0 as u32;
        let mut acc = 1u32;
        while exp != 0 {
            if exp & 1 == 1 {
                acc = acc * base % Q;
            }
            base = base * base % Q;
            exp >>= 1;
        }
        Self(acc as u16)
    }

    pub(crate) const fn const_mul(self, rhs: Self) -> Self {
        Self((self.0 as u32 * rhs.0 as u32 % Q) as u16)
    }
}

// ARITHMETIC
// ================================================================================================

impl Add for FalconFelt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let sum = self.0 as u32 + rhs.0 as u32;
        Self(if sum >= Q { sum - Q } else { sum } as u16)
    }
}

impl AddAssign for FalconFelt {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FalconFelt {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl SubAssign for FalconFelt {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FalconFelt {
    type Output = Self;

    fn neg(self) -> Self::Output {
        if self.0 == 0 { self } else { Self(Q as u16 - self.0) }
    }
}

impl Mul for FalconFelt {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.const_mul(rhs)
    }
}

impl MulAssign for FalconFelt {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for FalconFelt {
    type Output = Self;

    /// Division by zero yields zero; callers that must detect it check the divisor first.
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.inverse_or_zero()
    }
}

impl DivAssign for FalconFelt {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Zero for FalconFelt {
    fn zero() -> Self {
        Self(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl One for FalconFelt {
    fn one() -> Self {
        Self(1)
    }
}

impl Inverse for FalconFelt {
    fn inverse_or_zero(self) -> Self {
        // a^(q - 2) = a^-1 for a != 0, and 0^(q - 2) = 0
        self.pow(Q - 2)
    }
}

impl Zeroize for FalconFelt {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

// CONVERSIONS
// ================================================================================================

impl From<i16> for FalconFelt {
    fn from(value: i16) -> Self {
        Self(value.rem_euclid(MODULUS) as u16)
    }
}

impl From<i32> for FalconFelt {
    fn from(value: i32) -> Self {
        Self(value.rem_euclid(Q as i32) as u16)
    }
}

impl From<FalconFelt> for u16 {
    fn from(value: FalconFelt) -> Self {
        value.0
    }
}

// TESTS
// ================================================================================================
