use crate::{
    ctx::{Condition, Ctx, RoundingMode},
    encoding::{Encoding, Special},
    fint::FastInt,
};

/// An unrounded finite result: sign, unsigned coefficient, and
/// exponent, before any precision or range enforcement.
#[derive(Clone, Debug)]
pub(crate) struct Raw {
    pub neg: bool,
    pub coeff: FastInt,
    pub exp: FastInt,
}

impl Raw {
    pub(crate) fn new(neg: bool, coeff: FastInt, exp: FastInt) -> Self {
        debug_assert!(!coeff.is_negative());
        Self { neg, coeff, exp }
    }
}

/// The digits already discarded from a result before it reached
/// the kernel: the most significant discarded digit and whether
/// anything beyond it was non-zero.
///
/// This is the minimal state any rounding mode needs; the full
/// discarded tail is never retained.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Discard {
    pub lsd: u8,
    pub sticky: bool,
}

impl Discard {
    /// Reports whether any discarded digit was non-zero.
    pub(crate) fn any(self) -> bool {
        self.lsd != 0 || self.sticky
    }

    /// Builds a record from a division remainder compared
    /// against the divisor: the true tail is `rem/den` units of
    /// the last discarded position.
    pub(crate) fn from_remainder(rem: &FastInt, den: &FastInt, radix: u32) -> Option<Self> {
        if rem.is_zero() {
            return None;
        }
        let half = (radix / 2) as u8;
        let twice = rem.mul(&FastInt::new(2));
        Some(match twice.cmp(&den.abs()) {
            core::cmp::Ordering::Less => Self {
                lsd: 0,
                sticky: true,
            },
            core::cmp::Ordering::Equal => Self {
                lsd: half,
                sticky: false,
            },
            core::cmp::Ordering::Greater => Self {
                lsd: half,
                sticky: true,
            },
        })
    }
}

/// Rounds a raw result into the context: enforces the precision
/// by discarding digits, applies the rounding mode, clamps the
/// exponent into range, synthesizes overflow and subnormal
/// results, and records every raised condition.
///
/// Every arithmetic operation funnels its finite results
/// through here.
pub(crate) fn apply<E: Encoding>(raw: Raw, discard: Option<Discard>, ctx: &mut Ctx) -> E {
    let prec = ctx.precision;
    let mode = ctx.rounding;

    // Identity fast path: no limits and nothing discarded.
    if prec == 0 && ctx.emin.is_none() && ctx.emax.is_none() && discard.is_none() {
        return E::from_parts(raw.neg, raw.coeff, raw.exp);
    }

    let neg = raw.neg;
    let mut coeff = raw.coeff;
    let mut exp = raw.exp;

    // The value's adjusted exponent; unchanged by shifting, so
    // computed once up front for the subnormal test.
    let orig_adj = if coeff.is_zero() {
        exp.clone()
    } else {
        exp.add(&FastInt::from(E::digit_length(&coeff)))
            .sub(&FastInt::ONE)
    };

    let etiny = ctx.etiny();
    let mut pending = discard;
    let mut rounded = false;
    let mut inexact = pending.map_or(false, Discard::any);
    let mut wiped = false;

    loop {
        let len = measure(&coeff, ctx, E::RADIX);

        // How many digits must go: enough to fit the precision
        // and enough to lift the exponent to etiny.
        let mut shift: u64 = if prec > 0 && len > u64::from(prec) {
            shift_for(len - u64::from(prec), ctx, E::RADIX)
        } else {
            0
        };
        if let Some(etiny) = etiny {
            let need = FastInt::new(etiny).sub(&exp);
            if need.is_positive() {
                match need.to_u64() {
                    Some(n) => shift = shift.max(n),
                    None => {
                        // The exponent is unfathomably far below
                        // etiny: everything is discarded.
                        let any = !coeff.is_zero() || inexact;
                        pending = Some(Discard {
                            lsd: 0,
                            sticky: any,
                        });
                        coeff = FastInt::ZERO;
                        exp = FastInt::new(etiny);
                        rounded = true;
                        inexact |= any;
                        wiped = true;
                        continue;
                    }
                }
            }
        }

        if shift > 0 {
            let sticky_in = pending.map_or(false, Discard::any);
            let digits = E::digit_length(&coeff);
            let (q, lsd, st) = E::shr_digits(&coeff, shift);
            if shift > digits {
                wiped = true;
            }
            pending = Some(Discard {
                lsd,
                sticky: st || sticky_in,
            });
            coeff = q;
            exp = exp.add(&FastInt::from(shift));
            rounded = true;
            inexact |= lsd != 0 || st || sticky_in;
            continue;
        }

        // In bounds. Apply the rounding decision to whatever
        // was discarded, then loop once more in case the
        // increment carried into an extra digit.
        match pending.take() {
            Some(d) => {
                if matches!(mode, RoundingMode::Exact) && d.any() {
                    ctx.raise(Condition::INVALID_OPERATION);
                    return E::special_from_parts(false, Special::QNan, FastInt::ZERO);
                }
                let last = last_digit(&coeff, E::RADIX);
                if mode.rounds_away(neg, d.lsd, d.sticky, last, E::RADIX) {
                    coeff = coeff.add(&FastInt::ONE);
                    continue;
                }
            }
            None => break,
        }
        break;
    }

    let mut flags = Condition::empty();
    if rounded {
        flags |= Condition::ROUNDED;
    }
    if inexact {
        flags |= Condition::INEXACT | Condition::ROUNDED;
    }

    // Overflow: the rounded result's adjusted exponent exceeds
    // the maximum.
    if let (Some(emax), false) = (ctx.emax, coeff.is_zero()) {
        let len = E::digit_length(&coeff);
        let adj = exp.add(&FastInt::from(len)).sub(&FastInt::ONE);
        if adj.cmp(&FastInt::new(emax)) == core::cmp::Ordering::Greater {
            flags |= Condition::OVERFLOW | Condition::INEXACT | Condition::ROUNDED;
            ctx.raise(flags);
            if mode.overflow_stays_finite(neg) && prec > 0 {
                // The largest finite value.
                let big = crate::encoding::radix_pow(E::RADIX, u64::from(prec)).sub(&FastInt::ONE);
                let exp = FastInt::new(emax.saturating_sub(i64::from(prec) - 1));
                return E::from_parts(neg, big, exp);
            }
            return E::special_from_parts(neg, Special::Inf, FastInt::ZERO);
        }
    }

    // Subnormal and underflow are judged on the value before
    // rounding.
    if let (Some(emin), false) = (ctx.emin, raw_is_zero(&coeff, inexact, wiped)) {
        if orig_adj.cmp(&FastInt::new(emin)) == core::cmp::Ordering::Less {
            flags |= Condition::SUBNORMAL;
            if inexact {
                flags |= Condition::UNDERFLOW;
            }
            if coeff.is_zero() && inexact {
                // Underflowed all the way to zero.
                flags |= Condition::CLAMPED;
            }
        }
    }

    // Zeros carry their exponent into range quietly.
    if coeff.is_zero() && !wiped {
        if let Some(emax) = ctx.emax {
            let top = if ctx.clamp && prec > 0 {
                emax.saturating_sub(i64::from(prec) - 1)
            } else {
                emax
            };
            if exp.cmp(&FastInt::new(top)) == core::cmp::Ordering::Greater {
                exp = FastInt::new(top);
                flags |= Condition::CLAMPED;
            }
        }
        if let Some(etiny) = etiny {
            if exp.cmp(&FastInt::new(etiny)) == core::cmp::Ordering::Less {
                exp = FastInt::new(etiny);
                flags |= Condition::CLAMPED;
            }
        }
    }

    // Fold down: with the clamp flag set, a normal result's
    // exponent may not exceed emax - (precision - 1); pad the
    // coefficient with zeros instead.
    if ctx.clamp && prec > 0 && !coeff.is_zero() {
        if let Some(emax) = ctx.emax {
            let top = FastInt::new(emax.saturating_sub(i64::from(prec) - 1));
            if exp.cmp(&top) == core::cmp::Ordering::Greater {
                let pad = exp.sub(&top);
                if let Some(n) = pad.to_u64() {
                    if let Some(grown) = E::mul_radix_pow(&coeff, n) {
                        coeff = grown;
                        exp = top;
                        flags |= Condition::CLAMPED;
                    }
                }
            }
        }
    }

    ctx.raise(flags);
    E::from_parts(neg, coeff, exp)
}

/// Reports whether the original value was zero, as opposed to
/// having been rounded or wiped down to a zero coefficient.
fn raw_is_zero(coeff: &FastInt, inexact: bool, wiped: bool) -> bool {
    coeff.is_zero() && !inexact && !wiped
}

/// Returns the least significant digit of `coeff`.
fn last_digit(coeff: &FastInt, radix: u32) -> u8 {
    let (_, r) = coeff.div_rem(&FastInt::from(radix));
    u8::try_from(r.to_u64().unwrap_or(0)).unwrap_or(0)
}

/// Measures a coefficient against the precision: radix digits
/// normally, bits when the context asks for bit precision.
fn measure(coeff: &FastInt, ctx: &Ctx, radix: u32) -> u64 {
    if ctx.bits_precision {
        coeff.bits().max(1)
    } else {
        crate::encoding::digit_len(coeff, radix)
    }
}

/// Converts an excess length into a digit shift. With bit
/// precision on a decimal coefficient the estimate stays low
/// and the kernel loops to a fixed point.
fn shift_for(excess: u64, ctx: &Ctx, radix: u32) -> u64 {
    if ctx.bits_precision && radix != 2 {
        (excess / 4).max(1)
    } else {
        excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::Dec;

    fn ctx(prec: u32, mode: RoundingMode) -> Ctx {
        Ctx::new().with_precision(prec).with_rounding_mode(mode)
    }

    fn raw(neg: bool, coeff: i64, exp: i64) -> Raw {
        Raw::new(neg, FastInt::new(coeff), FastInt::new(exp))
    }

    fn parts(d: &Dec) -> (bool, i64, i64) {
        (
            d.signbit(),
            d.coeff().to_i64().unwrap(),
            Encoding::exp(d).to_i64().unwrap(),
        )
    }

    #[test]
    fn test_identity_fast_path() {
        let mut c = Ctx::new();
        let d: Dec = apply(raw(false, 12345, -2), None, &mut c);
        assert_eq!(parts(&d), (false, 12345, -2));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_simple_truncation() {
        let mut c = ctx(3, RoundingMode::ToNearestEven);
        let d: Dec = apply(raw(false, 12345, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 123, 2));
        assert_eq!(c.flags(), Condition::INEXACT | Condition::ROUNDED);
    }

    #[test]
    fn test_exact_shortening_is_rounded_not_inexact() {
        let mut c = ctx(2, RoundingMode::ToNearestEven);
        let d: Dec = apply(raw(false, 100, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 10, 1));
        assert_eq!(c.flags(), Condition::ROUNDED);
    }

    #[test]
    fn test_tie_to_even() {
        // 1235 -> 124 (last digit 3 is odd, bump).
        let mut c = ctx(3, RoundingMode::ToNearestEven);
        let d: Dec = apply(raw(false, 1235, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 124, 1));

        // 1245 -> 124 (last digit 4 is even, stay).
        let mut c = ctx(3, RoundingMode::ToNearestEven);
        let d: Dec = apply(raw(false, 1245, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 124, 1));

        // 12451 -> 125 (beyond-half sticky digit).
        let mut c = ctx(3, RoundingMode::ToNearestEven);
        let d: Dec = apply(raw(false, 12451, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 125, 2));
    }

    #[test]
    fn test_carry_forces_extra_shift() {
        let mut c = ctx(2, RoundingMode::ToNearestEven);
        let d: Dec = apply(raw(false, 999, 0), None, &mut c);
        // 999 -> 99|9 -> round up -> 100 -> 10 E+2.
        assert_eq!(parts(&d), (false, 10, 2));
        assert_eq!(c.flags(), Condition::INEXACT | Condition::ROUNDED);
    }

    #[test]
    fn test_pending_discard_without_shift() {
        // Division-style: quotient already fits, remainder
        // pending.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let d: Dec = apply(
            raw(false, 33333, -5),
            Some(Discard {
                lsd: 0,
                sticky: true,
            }),
            &mut c,
        );
        assert_eq!(parts(&d), (false, 33333, -5));
        assert_eq!(c.flags(), Condition::INEXACT | Condition::ROUNDED);
    }

    #[test]
    fn test_exact_mode_rejects_inexact() {
        let mut c = ctx(3, RoundingMode::Exact);
        let d: Dec = apply(raw(false, 12345, 0), None, &mut c);
        assert!(d.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));

        // Discarding zeros is fine.
        let mut c = ctx(2, RoundingMode::Exact);
        let d: Dec = apply(raw(false, 1200, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 12, 2));
        assert_eq!(c.flags(), Condition::ROUNDED);
    }

    #[test]
    fn test_overflow_to_infinity() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-6, 6);
        let d: Dec = apply(raw(false, 9999, 4), None, &mut c);
        assert!(d.is_infinite());
        assert!(!d.signbit());
        assert!(c
            .flags()
            .contains(Condition::OVERFLOW | Condition::INEXACT | Condition::ROUNDED));
    }

    #[test]
    fn test_overflow_clamps_toward_zero_modes() {
        let mut c = ctx(3, RoundingMode::ToZero).with_exponent_range(-6, 6);
        let d: Dec = apply(raw(true, 9999, 4), None, &mut c);
        // Largest finite value, negative: -999E+4.
        assert_eq!(parts(&d), (true, 999, 4));
        assert!(c.flags().contains(Condition::OVERFLOW));

        // Ceiling clamps only negative results.
        let mut c = ctx(3, RoundingMode::ToPositiveInf).with_exponent_range(-6, 6);
        let d: Dec = apply(raw(true, 9999, 4), None, &mut c);
        assert_eq!(parts(&d), (true, 999, 4));
        let mut c = ctx(3, RoundingMode::ToPositiveInf).with_exponent_range(-6, 6);
        let d: Dec = apply(raw(false, 9999, 4), None, &mut c);
        assert!(d.is_infinite());
    }

    #[test]
    fn test_subnormal_exact() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-5, 5);
        // etiny = -7; 1E-7 is representable but subnormal.
        let d: Dec = apply(raw(false, 1, -7), None, &mut c);
        assert_eq!(parts(&d), (false, 1, -7));
        assert_eq!(c.flags(), Condition::SUBNORMAL);
    }

    #[test]
    fn test_underflow_rounds_at_etiny() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-5, 5);
        // etiny = -7; 15E-8 rounds to 2E-7.
        let d: Dec = apply(raw(false, 15, -8), None, &mut c);
        assert_eq!(parts(&d), (false, 2, -7));
        assert!(c.flags().contains(
            Condition::SUBNORMAL
                | Condition::UNDERFLOW
                | Condition::INEXACT
                | Condition::ROUNDED
        ));
    }

    #[test]
    fn test_underflow_to_zero() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-5, 5);
        let d: Dec = apply(raw(false, 1, -20), None, &mut c);
        assert_eq!(parts(&d), (false, 0, -7));
        assert!(c.flags().contains(Condition::UNDERFLOW | Condition::CLAMPED));
    }

    #[test]
    fn test_zero_exponent_clamped_into_range() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-5, 5);
        let d: Dec = apply(raw(false, 0, 9), None, &mut c);
        assert_eq!(parts(&d), (false, 0, 5));
        assert!(c.flags().contains(Condition::CLAMPED));

        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-5, 5);
        let d: Dec = apply(raw(true, 0, -20), None, &mut c);
        assert_eq!(parts(&d), (true, 0, -7));
        assert!(c.flags().contains(Condition::CLAMPED));
    }

    #[test]
    fn test_fold_down_clamp() {
        let mut c = ctx(3, RoundingMode::ToNearestEven)
            .with_exponent_range(-6, 6)
            .with_clamp(true);
        // 1E+6 with clamp: exponent may not exceed 6-(3-1)=4.
        let d: Dec = apply(raw(false, 1, 6), None, &mut c);
        assert_eq!(parts(&d), (false, 100, 4));
        assert!(c.flags().contains(Condition::CLAMPED));
    }

    #[test]
    fn test_floor_rounding_direction() {
        let mut c = ctx(3, RoundingMode::ToNegativeInf);
        let d: Dec = apply(raw(true, 10001, 0), None, &mut c);
        // -10001 floors away from zero to -101E+2.
        assert_eq!(parts(&d), (true, 101, 2));

        let mut c = ctx(3, RoundingMode::ToNegativeInf);
        let d: Dec = apply(raw(false, 10001, 0), None, &mut c);
        assert_eq!(parts(&d), (false, 100, 2));
    }

    #[test]
    fn test_remainder_discard_classes() {
        // rem/den < 1/2.
        let d = Discard::from_remainder(&FastInt::new(1), &FastInt::new(3), 10).unwrap();
        assert_eq!((d.lsd, d.sticky), (0, true));
        // rem/den == 1/2.
        let d = Discard::from_remainder(&FastInt::new(1), &FastInt::new(2), 10).unwrap();
        assert_eq!((d.lsd, d.sticky), (5, false));
        // rem/den > 1/2.
        let d = Discard::from_remainder(&FastInt::new(2), &FastInt::new(3), 10).unwrap();
        assert_eq!((d.lsd, d.sticky), (5, true));
        assert!(Discard::from_remainder(&FastInt::ZERO, &FastInt::new(3), 10).is_none());
    }

    #[test]
    fn test_bit_precision() {
        // 1000 needs 10 bits; at 8 bits of precision it must
        // shrink to at most 8 bits.
        let mut c = ctx(8, RoundingMode::ToZero).with_bits_precision(true);
        let d: Dec = apply(raw(false, 1000, 0), None, &mut c);
        assert!(d.coeff().bits() <= 8);
        assert!(c.flags().contains(Condition::ROUNDED));
    }
}
