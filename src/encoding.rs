use num_bigint::BigInt;

use crate::fint::FastInt;

/// The largest radix-power shift an internal scaling step will
/// attempt. Anything larger cannot be the result of a sane
/// computation and is refused as an invalid operation rather
/// than allocating an astronomically large coefficient.
pub(crate) const MAX_RADIX_SHIFT: u64 = 9_999_999;

/// Classifies a value as finite or one of the special values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Special {
    /// An ordinary coefficient/exponent pair.
    Finite,
    /// An infinity. The coefficient and exponent carry no
    /// meaning.
    Inf,
    /// A quiet NaN. The coefficient is a diagnostic payload.
    QNan,
    /// A signaling NaN. Raises an invalid operation and
    /// quietens on any use.
    SNan,
}

impl Special {
    /// Reports whether this is a quiet or signaling NaN.
    pub const fn is_nan(self) -> bool {
        matches!(self, Self::QNan | Self::SNan)
    }
}

/// The seam between the generic engine and a concrete numeric
/// encoding.
///
/// The rounding kernel and every arithmetic operation are
/// written once, generically, against this contract; [`Dec`]
/// and [`Bin`] implement it for radices 10 and 2. Construction
/// through [`from_parts`][Self::from_parts] never validates
/// range and never rounds; that is the rounding kernel's job.
///
/// [`Dec`]: crate::Dec
/// [`Bin`]: crate::Bin
pub trait Encoding: Clone + Sized {
    /// The positional base: 2 or 10.
    const RADIX: u32;

    /// Reports whether the sign bit is set.
    ///
    /// Zero coefficients keep their sign bit; `-0` exists.
    fn signbit(&self) -> bool;

    /// Returns the unsigned coefficient, or the diagnostic
    /// payload of a NaN.
    fn coeff(&self) -> &FastInt;

    /// Returns the exponent. Meaningless for specials.
    fn exp(&self) -> &FastInt;

    /// Returns the special-value class.
    fn special(&self) -> Special;

    /// Creates a finite value. `coeff` must be non-negative.
    fn from_parts(neg: bool, coeff: FastInt, exp: FastInt) -> Self;

    /// Creates an infinity or NaN. `payload` is kept as the
    /// NaN diagnostic and ignored for infinities.
    fn special_from_parts(neg: bool, kind: Special, payload: FastInt) -> Self;

    /// Creates a value from a machine integer, exactly.
    fn value_of(v: i64) -> Self {
        Self::from_parts(v < 0, FastInt::new(v).abs(), FastInt::ZERO)
    }

    /// Reports whether the value is neither an infinity nor
    /// a NaN.
    fn is_finite(&self) -> bool {
        matches!(self.special(), Special::Finite)
    }

    /// Reports whether the value is an infinity.
    fn is_infinite(&self) -> bool {
        matches!(self.special(), Special::Inf)
    }

    /// Reports whether the value is a quiet or signaling NaN.
    fn is_nan(&self) -> bool {
        self.special().is_nan()
    }

    /// Reports whether the value is a signaling NaN.
    fn is_signaling(&self) -> bool {
        matches!(self.special(), Special::SNan)
    }

    /// Reports whether the value is finite with a zero
    /// coefficient.
    fn is_zero(&self) -> bool {
        self.is_finite() && self.coeff().is_zero()
    }

    /// Returns the sign of the value: -1, 0, or +1. Both zeros
    /// report 0; NaNs and infinities report by sign bit.
    fn sign(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.signbit() {
            -1
        } else {
            1
        }
    }

    /// Returns the value with the sign bit replaced.
    fn with_sign(&self, neg: bool) -> Self {
        match self.special() {
            Special::Finite => Self::from_parts(neg, self.coeff().clone(), self.exp().clone()),
            kind => Self::special_from_parts(neg, kind, self.coeff().clone()),
        }
    }

    /// Returns the value with a signaling NaN quietened.
    fn quieted(&self) -> Self {
        if self.is_signaling() {
            Self::special_from_parts(self.signbit(), Special::QNan, self.coeff().clone())
        } else {
            self.clone()
        }
    }

    /// Returns the number of radix digits in `coeff`, which is
    /// one for zero.
    fn digit_length(coeff: &FastInt) -> u64 {
        digit_len(coeff, Self::RADIX)
    }

    /// Returns the adjusted exponent, `exp + digits - 1`.
    fn adjusted_exp(&self) -> FastInt {
        let digits = Self::digit_length(self.coeff());
        self.exp().add(&FastInt::from(digits)).sub(&FastInt::ONE)
    }

    /// Computes `coeff * RADIX^count`, or `None` if `count` is
    /// too large to attempt.
    fn mul_radix_pow(coeff: &FastInt, count: u64) -> Option<FastInt> {
        mul_radix_pow(coeff, count, Self::RADIX)
    }

    /// Shifts `coeff` right by `count` digits.
    ///
    /// Returns the kept digits, the most significant discarded
    /// digit, and whether any further discarded digit was
    /// non-zero.
    fn shr_digits(coeff: &FastInt, count: u64) -> (FastInt, u8, bool) {
        shr_digits(coeff, count, Self::RADIX)
    }

    /// Returns the least number of radix-power shifts of `num`
    /// that make `num / den` terminate exactly, or `None` if no
    /// shift does.
    fn division_shift(num: &FastInt, den: &FastInt) -> Option<u64> {
        division_shift(num, den, Self::RADIX)
    }
}

/// Powers of ten that fit in an `i64`.
const POW10: [i64; 19] = {
    let mut t = [1i64; 19];
    let mut i = 1;
    while i < 19 {
        t[i] = t[i - 1] * 10;
        i += 1;
    }
    t
};

/// Returns `radix^n` without overflow, promoting as needed.
pub(crate) fn radix_pow(radix: u32, n: u64) -> FastInt {
    debug_assert!(n <= MAX_RADIX_SHIFT);

    match radix {
        10 if n < 19 => FastInt::new(POW10[n as usize]),
        2 if n < 63 => FastInt::new(1i64 << n),
        _ => {
            let n = u32::try_from(n).unwrap_or(u32::MAX);
            FastInt::from_big(BigInt::from(radix).pow(n))
        }
    }
}

pub(crate) fn digit_len(coeff: &FastInt, radix: u32) -> u64 {
    debug_assert!(!coeff.is_negative());

    if coeff.is_zero() {
        return 1;
    }
    if radix == 2 {
        return coeff.bits();
    }
    if let Some(v) = coeff.to_u64() {
        return u64::from(v.ilog10()) + 1;
    }

    // bits * log10(2) underestimates by at most one digit;
    // 30103/100000 < log10(2) keeps the estimate low.
    let bits = coeff.bits();
    let mut digits = (bits - 1) * 30_103 / 100_000 + 1;
    let big = coeff.to_big();
    while big >= BigInt::from(10u32).pow(u32::try_from(digits).unwrap_or(u32::MAX)) {
        digits += 1;
    }
    digits
}

pub(crate) fn mul_radix_pow(coeff: &FastInt, count: u64, radix: u32) -> Option<FastInt> {
    if count == 0 || coeff.is_zero() {
        return Some(coeff.clone());
    }
    if count > MAX_RADIX_SHIFT {
        return None;
    }
    Some(coeff.mul(&radix_pow(radix, count)))
}

pub(crate) fn shr_digits(coeff: &FastInt, count: u64, radix: u32) -> (FastInt, u8, bool) {
    debug_assert!(count >= 1);
    debug_assert!(!coeff.is_negative());

    // Shifting out more than every digit leaves a zero quotient
    // with everything in the sticky tail.
    let digits = digit_len(coeff, radix);
    if count > digits {
        return (FastInt::ZERO, 0, !coeff.is_zero());
    }

    let lo = radix_pow(radix, count - 1);
    let hi = lo.mul(&FastInt::from(radix));
    let (q, r) = coeff.div_rem(&hi);
    let (lsd, rest) = r.div_rem(&lo);
    let lsd = u8::try_from(lsd.to_u64().unwrap_or(0)).unwrap_or(0);
    debug_assert!(u32::from(lsd) < radix);
    (q, lsd, !rest.is_zero())
}

pub(crate) fn division_shift(num: &FastInt, den: &FastInt, radix: u32) -> Option<u64> {
    debug_assert!(!den.is_zero());

    let g = num.gcd(den);
    let mut d = den.div_rem(&g).0.abs();

    let mut twos = 0u64;
    loop {
        let (q, r) = d.div_rem(&FastInt::new(2));
        if !r.is_zero() {
            break;
        }
        d = q;
        twos += 1;
    }

    let mut fives = 0u64;
    if radix == 10 {
        loop {
            let (q, r) = d.div_rem(&FastInt::new(5));
            if !r.is_zero() {
                break;
            }
            d = q;
            fives += 1;
        }
    }

    if d == FastInt::ONE {
        Some(twos.max(fives))
    } else {
        None
    }
}
