use core::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_traits::{Signed, ToPrimitive};

/// A signed integer of unbounded magnitude that stays in
/// a machine word for as long as it can.
///
/// Coefficients and exponents are overwhelmingly small in
/// practice, so `FastInt` stores them as an `i64` and only
/// promotes to a heap-allocated [`BigInt`] once a result no
/// longer fits. An operation whose true result exceeds the
/// machine width always promotes; it never wraps or saturates.
///
/// The representation is canonical: the big form is used only
/// for values outside `i64`'s range, so equality can compare
/// representations directly.
///
/// Values are immutable. Every operation returns a new value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FastInt(Repr);

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum Repr {
    Small(i64),
    Big(BigInt),
}

impl FastInt {
    /// The value zero.
    pub const ZERO: Self = Self(Repr::Small(0));
    /// The value one.
    pub const ONE: Self = Self(Repr::Small(1));

    /// Creates a `FastInt` from a machine integer.
    pub const fn new(v: i64) -> Self {
        Self(Repr::Small(v))
    }

    /// Creates a `FastInt` from a big integer, demoting it to
    /// the small representation if it fits.
    pub fn from_big(v: BigInt) -> Self {
        match v.to_i64() {
            Some(small) => Self(Repr::Small(small)),
            None => Self(Repr::Big(v)),
        }
    }

    /// Reports whether the value is zero.
    pub fn is_zero(&self) -> bool {
        // Canonical: zero is always small.
        matches!(self.0, Repr::Small(0))
    }

    /// Reports whether the value is strictly negative.
    pub fn is_negative(&self) -> bool {
        match &self.0 {
            Repr::Small(v) => *v < 0,
            Repr::Big(v) => v.is_negative(),
        }
    }

    /// Reports whether the value is strictly positive.
    pub fn is_positive(&self) -> bool {
        match &self.0 {
            Repr::Small(v) => *v > 0,
            Repr::Big(v) => v.is_positive(),
        }
    }

    /// Reports whether the value is even.
    pub fn is_even(&self) -> bool {
        match &self.0 {
            Repr::Small(v) => v % 2 == 0,
            Repr::Big(v) => v.is_even(),
        }
    }

    /// Returns the sign of the value: -1, 0, or +1.
    pub fn signum(&self) -> i32 {
        match &self.0 {
            Repr::Small(v) => match v.cmp(&0) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
            // Canonical: the big form is never zero.
            Repr::Big(v) => {
                if v.is_negative() {
                    -1
                } else {
                    1
                }
            }
        }
    }

    /// Computes `self + rhs`.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn add(&self, rhs: &Self) -> Self {
        match (&self.0, &rhs.0) {
            (Repr::Small(a), Repr::Small(b)) => match a.checked_add(*b) {
                Some(v) => Self(Repr::Small(v)),
                None => Self::from_big(BigInt::from(*a) + BigInt::from(*b)),
            },
            _ => Self::from_big(self.to_big() + rhs.to_big()),
        }
    }

    /// Computes `self - rhs`.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn sub(&self, rhs: &Self) -> Self {
        match (&self.0, &rhs.0) {
            (Repr::Small(a), Repr::Small(b)) => match a.checked_sub(*b) {
                Some(v) => Self(Repr::Small(v)),
                None => Self::from_big(BigInt::from(*a) - BigInt::from(*b)),
            },
            _ => Self::from_big(self.to_big() - rhs.to_big()),
        }
    }

    /// Computes `self * rhs`.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn mul(&self, rhs: &Self) -> Self {
        match (&self.0, &rhs.0) {
            (Repr::Small(a), Repr::Small(b)) => match a.checked_mul(*b) {
                Some(v) => Self(Repr::Small(v)),
                None => Self::from_big(BigInt::from(*a) * BigInt::from(*b)),
            },
            _ => Self::from_big(self.to_big() * rhs.to_big()),
        }
    }

    /// Computes `-self`.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn neg(&self) -> Self {
        match &self.0 {
            Repr::Small(v) => match v.checked_neg() {
                Some(v) => Self(Repr::Small(v)),
                None => Self::from_big(-BigInt::from(*v)),
            },
            Repr::Big(v) => Self::from_big(-v.clone()),
        }
    }

    /// Computes `|self|`.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Computes the quotient and remainder of `self / rhs`,
    /// truncating toward zero.
    ///
    /// `rhs` must be non-zero.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn div_rem(&self, rhs: &Self) -> (Self, Self) {
        debug_assert!(!rhs.is_zero());

        match (&self.0, &rhs.0) {
            (Repr::Small(a), Repr::Small(b)) => {
                // `i64::MIN / -1` is the only overflowing case.
                match a.checked_div(*b) {
                    Some(q) => (Self(Repr::Small(q)), Self(Repr::Small(a % b))),
                    None => (Self::from_big(-BigInt::from(*a)), Self::ZERO),
                }
            }
            _ => {
                let (q, r) = self.to_big().div_rem(&rhs.to_big());
                (Self::from_big(q), Self::from_big(r))
            }
        }
    }

    /// Computes the greatest common divisor of `self` and `rhs`.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn gcd(&self, rhs: &Self) -> Self {
        match (&self.0, &rhs.0) {
            (Repr::Small(a), Repr::Small(b)) if *a != i64::MIN && *b != i64::MIN => {
                Self(Repr::Small(a.gcd(b)))
            }
            _ => Self::from_big(self.to_big().gcd(&rhs.to_big())),
        }
    }

    /// Computes the integer `n`th root, truncated toward zero.
    ///
    /// The value must be non-negative and `n` at least one.
    #[must_use = "this returns the result of the operation \
                      without modifying the original"]
    pub fn nth_root(&self, n: u32) -> Self {
        debug_assert!(!self.is_negative());
        debug_assert!(n >= 1);

        match &self.0 {
            Repr::Small(v) => Self(Repr::Small(v.nth_root(n))),
            Repr::Big(v) => Self::from_big(v.nth_root(n)),
        }
    }

    /// Returns the number of bits needed to represent the
    /// magnitude of the value, which is zero for zero.
    pub fn bits(&self) -> u64 {
        match &self.0 {
            Repr::Small(v) => u64::from(64 - v.unsigned_abs().leading_zeros()),
            Repr::Big(v) => v.bits(),
        }
    }

    /// Reports whether the value fits in a machine word.
    pub fn is_small(&self) -> bool {
        matches!(self.0, Repr::Small(_))
    }

    /// Converts the value to an `i64`, or returns `None` if it
    /// is too large in magnitude.
    pub fn to_i64(&self) -> Option<i64> {
        match &self.0 {
            Repr::Small(v) => Some(*v),
            Repr::Big(_) => None,
        }
    }

    /// Converts the value to a `u64`, or returns `None` if it
    /// is negative or too large.
    pub fn to_u64(&self) -> Option<u64> {
        match &self.0 {
            Repr::Small(v) => u64::try_from(*v).ok(),
            Repr::Big(_) => None,
        }
    }

    /// Converts the value to a `u32`, or returns `None` if it
    /// is negative or too large.
    pub fn to_u32(&self) -> Option<u32> {
        match &self.0 {
            Repr::Small(v) => u32::try_from(*v).ok(),
            Repr::Big(_) => None,
        }
    }

    /// Converts the value to a big integer.
    pub fn to_big(&self) -> BigInt {
        match &self.0 {
            Repr::Small(v) => BigInt::from(*v),
            Repr::Big(v) => v.clone(),
        }
    }

    /// Compares `self` and `rhs`.
    pub fn cmp(&self, rhs: &Self) -> Ordering {
        match (&self.0, &rhs.0) {
            (Repr::Small(a), Repr::Small(b)) => a.cmp(b),
            // Canonical: a big value is outside `i64`'s range,
            // so its sign decides the comparison.
            (Repr::Small(_), Repr::Big(b)) => {
                if b.is_negative() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Repr::Big(a), Repr::Small(_)) => {
                if a.is_negative() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Repr::Big(a), Repr::Big(b)) => a.cmp(b),
        }
    }
}

impl From<i64> for FastInt {
    fn from(v: i64) -> Self {
        Self::new(v)
    }
}

impl From<i32> for FastInt {
    fn from(v: i32) -> Self {
        Self::new(i64::from(v))
    }
}

impl From<u32> for FastInt {
    fn from(v: u32) -> Self {
        Self::new(i64::from(v))
    }
}

impl From<u64> for FastInt {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Self::new(v),
            Err(_) => Self::from_big(BigInt::from(v)),
        }
    }
}

impl From<BigInt> for FastInt {
    fn from(v: BigInt) -> Self {
        Self::from_big(v)
    }
}

impl PartialOrd for FastInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FastInt {
    fn cmp(&self, other: &Self) -> Ordering {
        FastInt::cmp(self, other)
    }
}
