use core::{cmp::Ordering, fmt};

use bitflags::bitflags;

/// Arithmetic settings: precision, rounding, exponent range,
/// traps, and the accumulated [`Condition`] flags.
///
/// A context with precision zero and no exponent range requests
/// exact arithmetic wherever the true result has a finite digit
/// length.
///
/// Flags accumulate monotonically across operations that reuse
/// one context; they are never cleared by a later operation. The
/// flag accumulator is the only mutable state in the crate and
/// is not synchronized: do not share one context across
/// concurrently executing operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ctx {
    pub(crate) precision: u32,
    pub(crate) rounding: RoundingMode,
    pub(crate) emin: Option<i64>,
    pub(crate) emax: Option<i64>,
    pub(crate) bits_precision: bool,
    pub(crate) clamp: bool,
    pub(crate) traps: Condition,
    pub(crate) flags: Condition,
}

impl Ctx {
    /// Creates a context requesting exact, unlimited-precision
    /// arithmetic with round-half-even.
    pub const fn new() -> Self {
        Self {
            precision: 0,
            rounding: RoundingMode::ToNearestEven,
            emin: None,
            emax: None,
            bits_precision: false,
            clamp: false,
            traps: Condition::empty(),
            flags: Condition::empty(),
        }
    }

    /// Sets the maximum number of significant digits in
    /// a result. Zero means unlimited.
    pub const fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the rounding mode.
    pub const fn with_rounding_mode(mut self, mode: RoundingMode) -> Self {
        self.rounding = mode;
        self
    }

    /// Sets the minimum and maximum adjusted exponents.
    pub const fn with_exponent_range(mut self, emin: i64, emax: i64) -> Self {
        self.emin = Some(emin);
        self.emax = Some(emax);
        self
    }

    /// Measures precision in bits of the coefficient rather
    /// than radix digits.
    ///
    /// For radix 2 the two are the same.
    pub const fn with_bits_precision(mut self, yes: bool) -> Self {
        self.bits_precision = yes;
        self
    }

    /// Clamps the exponents of normal results so that a value
    /// padded with trailing zeros never exceeds the maximum
    /// adjusted exponent.
    pub const fn with_clamp(mut self, yes: bool) -> Self {
        self.clamp = yes;
        self
    }

    /// Sets the trap mask. An operation that raises a condition
    /// in the mask aborts with an [`Error`] instead of
    /// returning a value.
    pub const fn with_traps(mut self, traps: Condition) -> Self {
        self.traps = traps;
        self
    }

    /// Returns the precision.
    pub const fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns the rounding mode.
    pub const fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Returns the minimum adjusted exponent, if bounded.
    pub const fn emin(&self) -> Option<i64> {
        self.emin
    }

    /// Returns the maximum adjusted exponent, if bounded.
    pub const fn emax(&self) -> Option<i64> {
        self.emax
    }

    /// Returns the accumulated condition flags.
    pub const fn flags(&self) -> Condition {
        self.flags
    }

    /// Clears the accumulated condition flags.
    ///
    /// Operations never clear flags; this is the caller's way
    /// to start a fresh chain.
    pub fn clear_flags(&mut self) {
        self.flags = Condition::empty();
    }

    /// Records `cond` in the accumulator.
    pub(crate) fn raise(&mut self, cond: Condition) {
        self.flags |= cond;
    }

    /// Returns the smallest exponent a subnormal result may
    /// take, or `None` if the range is unbounded.
    pub(crate) fn etiny(&self) -> Option<i64> {
        let emin = self.emin?;
        if self.precision == 0 {
            Some(emin)
        } else {
            Some(emin.saturating_sub(i64::from(self.precision) - 1))
        }
    }

    /// Runs `f`, then converts any newly raised trapped
    /// condition into an error.
    pub(crate) fn guard<T>(&mut self, f: impl FnOnce(&mut Ctx) -> T) -> Result<T, Error> {
        let before = self.flags;
        let out = f(self);
        let raised = self.flags & !before;
        let trapped = raised & self.traps;
        if trapped.is_empty() {
            Ok(out)
        } else {
            Err(Error::trapped(trapped))
        }
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

/// How to round a result that has too many digits.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub enum RoundingMode {
    /// IEEE 754-2008 roundTiesToEven.
    ///
    /// - Under half rounds toward zero.
    /// - Over half rounds away from zero.
    /// - Exactly half rounds to the nearest even digit.
    #[default]
    ToNearestEven,
    /// IEEE 754-2008 roundTiesToAway.
    ///
    /// Like [`ToNearestEven`][Self::ToNearestEven], except that
    /// an exact half rounds away from zero.
    ToNearestAway,
    /// Like [`ToNearestAway`][Self::ToNearestAway], except that
    /// an exact half rounds toward zero.
    ToNearestTowardZero,
    /// Rounds away from zero if any discarded digit is
    /// non-zero.
    AwayFromZero,
    /// IEEE 754-2008 roundTowardZero.
    ///
    /// AKA truncation.
    ToZero,
    /// IEEE 754-2008 roundTowardPositive.
    ///
    /// AKA ceiling.
    ToPositiveInf,
    /// IEEE 754-2008 roundTowardNegative.
    ///
    /// AKA floor.
    ToNegativeInf,
    /// Forces the last kept digit odd if any digit was
    /// discarded.
    ///
    /// Rounding toward an odd digit never lands on a tie, so an
    /// intermediate result rounded this way can be re-rounded
    /// in any other mode without double rounding. Used
    /// internally by the transcendental routines.
    ToOdd,
    /// Rounds away from zero only when the last kept digit is
    /// zero or half the radix, so the rounding direction stays
    /// detectable in the result.
    ZeroFiveAway,
    /// [`ToOdd`][Self::ToOdd] for radix 2,
    /// [`ZeroFiveAway`][Self::ZeroFiveAway] for radix 10.
    OddZeroFiveAway,
    /// No rounding: any non-zero discarded digit is an
    /// [`INVALID_OPERATION`][Condition::INVALID_OPERATION].
    Exact,
}

impl RoundingMode {
    /// Decides whether to round away from zero.
    ///
    /// - `neg`: the sign of the result;
    /// - `lsd`: the most significant discarded digit;
    /// - `sticky`: whether any digit beyond `lsd` is non-zero;
    /// - `last`: the least significant kept digit;
    /// - `radix`: 2 or 10.
    ///
    /// [`Exact`][Self::Exact] must be resolved by the caller
    /// before asking for a decision.
    pub(crate) fn rounds_away(self, neg: bool, lsd: u8, sticky: bool, last: u8, radix: u32) -> bool {
        let half = (radix / 2) as u8;
        let any = lsd != 0 || sticky;
        match self {
            Self::ToNearestEven => match lsd.cmp(&half) {
                Ordering::Greater => true,
                Ordering::Equal => sticky || last % 2 != 0,
                Ordering::Less => false,
            },
            Self::ToNearestAway => lsd >= half,
            Self::ToNearestTowardZero => match lsd.cmp(&half) {
                Ordering::Greater => true,
                Ordering::Equal => sticky,
                Ordering::Less => false,
            },
            Self::AwayFromZero => any,
            Self::ToZero => false,
            Self::ToPositiveInf => !neg && any,
            Self::ToNegativeInf => neg && any,
            Self::ToOdd => any && last % 2 == 0,
            Self::ZeroFiveAway => any && (last == 0 || last == half),
            Self::OddZeroFiveAway => {
                if radix == 2 {
                    Self::ToOdd.rounds_away(neg, lsd, sticky, last, radix)
                } else {
                    Self::ZeroFiveAway.rounds_away(neg, lsd, sticky, last, radix)
                }
            }
            // The kernel raises Invalid before asking.
            Self::Exact => false,
        }
    }

    /// Reports whether an overflowing result in this mode is
    /// clamped to the largest finite value instead of becoming
    /// an infinity.
    pub(crate) fn overflow_stays_finite(self, neg: bool) -> bool {
        match self {
            Self::ToZero | Self::ToOdd => true,
            Self::ToPositiveInf => neg,
            Self::ToNegativeInf => !neg,
            _ => false,
        }
    }
}

bitflags! {
    /// An exceptional condition raised during an operation.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct Condition: u32 {
        /// The exponent was forced into range by padding or
        /// truncation, not by rounding.
        const CLAMPED = 0x1;
        /// Division of a finite, non-zero dividend by zero.
        const DIVISION_BY_ZERO = 0x2;
        /// A discarded digit was non-zero, so the result
        /// differs from the exact value.
        const INEXACT = 0x4;
        /// No defined result: 0/0, opposite-sign infinities
        /// added, a signaling NaN operand, a non-terminating
        /// quotient at unlimited precision, a quantize needing
        /// more digits than the precision allows, or an
        /// internal radix-power scaling too large to attempt.
        const INVALID_OPERATION = 0x8;
        /// The adjusted exponent, after rounding, exceeds the
        /// maximum allowed exponent.
        const OVERFLOW = 0x10;
        /// Digits were discarded from the coefficient.
        const ROUNDED = 0x20;
        /// The adjusted exponent, before any rounding, is below
        /// the minimum allowed exponent.
        const SUBNORMAL = 0x40;
        /// The result is both subnormal and inexact.
        const UNDERFLOW = 0x80;
    }
}

/// An error aborting an operation.
///
/// Untrapped failures return quiet NaNs or signed infinities so
/// that chains of operations run to completion; an `Error` is
/// produced only when a raised condition is in the context's
/// trap mask, or when an operation cannot be attempted at all.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub(crate) const fn trapped(cond: Condition) -> Self {
        Self {
            kind: ErrorKind::Trapped(cond),
        }
    }

    pub(crate) const fn unlimited_precision() -> Self {
        Self {
            kind: ErrorKind::UnlimitedPrecision,
        }
    }

    pub(crate) const fn invalid_argument(reason: &'static str) -> Self {
        Self {
            kind: ErrorKind::InvalidArgument(reason),
        }
    }

    /// Returns the trapped condition, if the error came from
    /// the trap mask.
    pub const fn condition(&self) -> Option<Condition> {
        match self.kind {
            ErrorKind::Trapped(cond) => Some(cond),
            _ => None,
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum ErrorKind {
    Trapped(Condition),
    UnlimitedPrecision,
    InvalidArgument(&'static str),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trapped(cond) => write!(f, "trapped condition: {cond:?}"),
            Self::UnlimitedPrecision => {
                write!(f, "operation requires a bounded precision")
            }
            Self::InvalidArgument(reason) => write!(f, "{reason}"),
        }
    }
}
