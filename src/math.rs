use core::cmp::Ordering;

use crate::{
    ctx::{Condition, Ctx, RoundingMode},
    encoding::{Encoding, Special},
    fint::FastInt,
    round::{self, Discard, Raw},
};

pub(crate) fn qnan<E: Encoding>() -> E {
    E::special_from_parts(false, Special::QNan, FastInt::ZERO)
}

pub(crate) fn inf<E: Encoding>(neg: bool) -> E {
    E::special_from_parts(neg, Special::Inf, FastInt::ZERO)
}

/// Raises an invalid operation and returns a quiet NaN.
pub(crate) fn invalid<E: Encoding>(ctx: &mut Ctx) -> E {
    ctx.raise(Condition::INVALID_OPERATION);
    qnan()
}

/// Resolves NaN operands before a binary operation's numeric
/// path: a signaling NaN wins, raises Invalid, and quietens;
/// otherwise a quiet NaN propagates unchanged, first operand
/// preferred.
pub(crate) fn handle_nans<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> Option<E> {
    if lhs.is_signaling() {
        ctx.raise(Condition::INVALID_OPERATION);
        return Some(lhs.quieted());
    }
    if rhs.is_signaling() {
        ctx.raise(Condition::INVALID_OPERATION);
        return Some(rhs.quieted());
    }
    if lhs.is_nan() {
        return Some(lhs.clone());
    }
    if rhs.is_nan() {
        return Some(rhs.clone());
    }
    None
}

/// Unary-operand version of [`handle_nans`].
pub(crate) fn handle_nan<E: Encoding>(x: &E, ctx: &mut Ctx) -> Option<E> {
    if x.is_signaling() {
        ctx.raise(Condition::INVALID_OPERATION);
        return Some(x.quieted());
    }
    if x.is_nan() {
        return Some(x.clone());
    }
    None
}

/// Computes `lhs + rhs`.
pub(crate) fn add<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, rhs, ctx) {
        return r;
    }
    if lhs.is_infinite() || rhs.is_infinite() {
        if lhs.is_infinite() && rhs.is_infinite() {
            if lhs.signbit() != rhs.signbit() {
                // +inf + -inf
                return invalid(ctx);
            }
            return lhs.clone();
        }
        // ±inf + finite, finite + ±inf
        return if lhs.is_infinite() {
            lhs.clone()
        } else {
            rhs.clone()
        };
    }
    add_finite(lhs, rhs, ctx)
}

/// Computes `lhs - rhs` as `lhs + (-rhs)`.
pub(crate) fn sub<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    let neg = rhs.with_sign(!rhs.signbit());
    add(lhs, &neg, ctx)
}

fn add_finite<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    // `hi` has the larger exponent.
    let (mut hi, mut lo) = if lhs.exp().cmp(rhs.exp()) != Ordering::Less {
        (lhs.clone(), rhs.clone())
    } else {
        (rhs.clone(), lhs.clone())
    };

    if hi.coeff().is_zero() && lo.coeff().is_zero() {
        // The sign of an exactly zero sum follows both operands
        // if they agree; otherwise it is positive except under
        // floor.
        let neg = match (hi.signbit(), lo.signbit()) {
            (true, true) => true,
            (false, false) => false,
            _ => matches!(ctx.rounding, RoundingMode::ToNegativeInf),
        };
        return round::apply(
            Raw::new(neg, FastInt::ZERO, lo.exp().clone()),
            None,
            ctx,
        );
    }

    if lo.coeff().is_zero() || hi.coeff().is_zero() {
        // x + 0: the result is x, re-expressed toward the
        // smaller exponent as far as the precision allows.
        let (x, z) = if lo.coeff().is_zero() { (&hi, &lo) } else { (&lo, &hi) };
        let gap = x.exp().sub(z.exp());
        let pad = match gap.to_u64() {
            Some(g) if !gap.is_negative() => {
                let avail = if ctx.precision > 0 {
                    u64::from(ctx.precision).saturating_sub(E::digit_length(x.coeff()))
                } else {
                    crate::encoding::MAX_RADIX_SHIFT
                };
                g.min(avail)
            }
            _ => 0,
        };
        let (coeff, exp) = match E::mul_radix_pow(x.coeff(), pad) {
            Some(c) => (c, x.exp().sub(&FastInt::from(pad))),
            None => (x.coeff().clone(), x.exp().clone()),
        };
        return round::apply(Raw::new(x.signbit(), coeff, exp), None, ctx);
    }

    // Both operands are non-zero. If their digits cannot
    // overlap at the operative precision, the smaller one only
    // matters as a sticky nudge; substituting a one-unit tail
    // keeps the scaling bounded even when the exponent gap is
    // itself an arbitrary-precision number.
    if ctx.precision > 0 {
        let big_is_hi = hi.adjusted_exp().cmp(&lo.adjusted_exp()) != Ordering::Less;
        let (big_adj, small_adj) = if big_is_hi {
            (hi.adjusted_exp(), lo.adjusted_exp())
        } else {
            (lo.adjusted_exp(), hi.adjusted_exp())
        };
        let gap = big_adj.sub(&small_adj);
        let margin = FastInt::from(u64::from(ctx.precision) + 2);
        if gap.cmp(&margin) == Ordering::Greater {
            // Any non-zero tail below a quarter unit in the last
            // place rounds identically, so the exact position no
            // longer matters.
            let sub_exp = big_adj.sub(&FastInt::from(u64::from(ctx.precision) + 4));
            let small_neg = if big_is_hi { lo.signbit() } else { hi.signbit() };
            let tiny = E::from_parts(small_neg, FastInt::ONE, sub_exp);
            if big_is_hi {
                lo = tiny;
            } else {
                hi = tiny;
            }
            // Re-establish the exponent ordering; a wide operand
            // can put the tail on either side.
            if hi.exp().cmp(lo.exp()) == Ordering::Less {
                core::mem::swap(&mut hi, &mut lo);
            }
        }
    }

    let diff = hi.exp().sub(lo.exp());
    let shifted = match diff.to_u64().and_then(|d| E::mul_radix_pow(hi.coeff(), d)) {
        Some(c) => c,
        None => {
            // The exponent gap is too large to scale across.
            return invalid(ctx);
        }
    };

    let (neg, coeff) = if hi.signbit() == lo.signbit() {
        (hi.signbit(), shifted.add(lo.coeff()))
    } else {
        match shifted.cmp(lo.coeff()) {
            Ordering::Greater => (hi.signbit(), shifted.sub(lo.coeff())),
            Ordering::Less => (lo.signbit(), lo.coeff().sub(&shifted)),
            Ordering::Equal => (
                matches!(ctx.rounding, RoundingMode::ToNegativeInf),
                FastInt::ZERO,
            ),
        }
    };
    round::apply(Raw::new(neg, coeff, lo.exp().clone()), None, ctx)
}

/// Computes `lhs * rhs`.
pub(crate) fn mul<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, rhs, ctx) {
        return r;
    }
    let neg = lhs.signbit() ^ rhs.signbit();
    if lhs.is_infinite() || rhs.is_infinite() {
        if lhs.is_zero() || rhs.is_zero() {
            // 0 * inf
            return invalid(ctx);
        }
        return inf(neg);
    }
    let coeff = lhs.coeff().mul(rhs.coeff());
    let exp = lhs.exp().add(rhs.exp());
    round::apply(Raw::new(neg, coeff, exp), None, ctx)
}

/// Computes `lhs / rhs` with the exponent chosen to minimize
/// digits.
///
/// A non-terminating quotient at unlimited precision is an
/// invalid operation.
pub(crate) fn div<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, rhs, ctx) {
        return r;
    }
    let neg = lhs.signbit() ^ rhs.signbit();
    if lhs.is_infinite() {
        if rhs.is_infinite() {
            // inf / inf
            return invalid(ctx);
        }
        return inf(neg);
    }
    if rhs.is_infinite() {
        let exp = FastInt::new(ctx.etiny().unwrap_or(0));
        return round::apply(Raw::new(neg, FastInt::ZERO, exp), None, ctx);
    }
    if rhs.is_zero() {
        if lhs.is_zero() {
            // 0 / 0
            return invalid(ctx);
        }
        ctx.raise(Condition::DIVISION_BY_ZERO);
        return inf(neg);
    }
    let ideal = lhs.exp().sub(rhs.exp());
    if lhs.is_zero() {
        return round::apply(Raw::new(neg, FastInt::ZERO, ideal), None, ctx);
    }

    match E::division_shift(lhs.coeff(), rhs.coeff()) {
        Some(k) => {
            let num = match E::mul_radix_pow(lhs.coeff(), k) {
                Some(n) => n,
                None => return invalid(ctx),
            };
            let (q, r) = num.div_rem(rhs.coeff());
            debug_assert!(r.is_zero());
            let exp = ideal.sub(&FastInt::from(k));
            round::apply(Raw::new(neg, q, exp), None, ctx)
        }
        None => {
            if ctx.precision == 0 {
                // The exact quotient has no finite digit length.
                return invalid(ctx);
            }
            let la = E::digit_length(lhs.coeff());
            let lb = E::digit_length(rhs.coeff());
            let s = (lb + u64::from(ctx.precision) + 1).saturating_sub(la);
            let num = match E::mul_radix_pow(lhs.coeff(), s) {
                Some(n) => n,
                None => return invalid(ctx),
            };
            let (q, rem) = num.div_rem(rhs.coeff());
            let discard = Discard::from_remainder(&rem, rhs.coeff(), E::RADIX);
            let exp = ideal.sub(&FastInt::from(s));
            round::apply(Raw::new(neg, q, exp), discard, ctx)
        }
    }
}

/// Computes `lhs / rhs` at exactly the exponent `target`.
///
/// Fails with an invalid operation if the quotient needs more
/// digits than the precision allows.
pub(crate) fn div_to_exp<E: Encoding>(lhs: &E, rhs: &E, target: i64, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, rhs, ctx) {
        return r;
    }
    let neg = lhs.signbit() ^ rhs.signbit();
    if lhs.is_infinite() || rhs.is_infinite() {
        if lhs.is_infinite() && rhs.is_infinite() {
            return invalid(ctx);
        }
        if lhs.is_infinite() {
            return inf(neg);
        }
        return E::from_parts(neg, FastInt::ZERO, FastInt::new(target));
    }
    if rhs.is_zero() {
        if lhs.is_zero() {
            return invalid(ctx);
        }
        ctx.raise(Condition::DIVISION_BY_ZERO);
        return inf(neg);
    }
    if lhs.is_zero() {
        return E::from_parts(neg, FastInt::ZERO, FastInt::new(target));
    }

    let t = lhs.exp().sub(rhs.exp()).sub(&FastInt::new(target));
    let (num, den) = match t.to_u64() {
        Some(up) if !t.is_negative() => {
            match E::mul_radix_pow(lhs.coeff(), up) {
                Some(n) => (n, rhs.coeff().clone()),
                None => return invalid(ctx),
            }
        }
        _ => {
            let down = match t.neg().to_u64() {
                Some(d) => d,
                None => return invalid(ctx),
            };
            match E::mul_radix_pow(rhs.coeff(), down) {
                Some(d) => (lhs.coeff().clone(), d),
                None => return invalid(ctx),
            }
        }
    };
    let (mut q, rem) = num.div_rem(&den);

    let mut flags = Condition::empty();
    if let Some(d) = Discard::from_remainder(&rem, &den, E::RADIX) {
        if matches!(ctx.rounding, RoundingMode::Exact) {
            return invalid(ctx);
        }
        flags |= Condition::INEXACT | Condition::ROUNDED;
        let last = u8::try_from(
            q.div_rem(&FastInt::from(E::RADIX)).1.to_u64().unwrap_or(0),
        )
        .unwrap_or(0);
        if ctx.rounding.rounds_away(neg, d.lsd, d.sticky, last, E::RADIX) {
            q = q.add(&FastInt::ONE);
        }
    }
    if ctx.precision > 0 && E::digit_length(&q) > u64::from(ctx.precision) {
        return invalid(ctx);
    }
    ctx.raise(flags);
    E::from_parts(neg, q, FastInt::new(target))
}

/// Computes the integer part of `lhs / rhs`, truncated toward
/// zero, with exponent zero.
pub(crate) fn div_integer<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, rhs, ctx) {
        return r;
    }
    if lhs.is_infinite() || rhs.is_infinite() {
        return invalid(ctx);
    }
    let neg = lhs.signbit() ^ rhs.signbit();
    if rhs.is_zero() {
        if lhs.is_zero() {
            return invalid(ctx);
        }
        ctx.raise(Condition::DIVISION_BY_ZERO);
        return inf(neg);
    }
    if lhs.is_zero() {
        return E::from_parts(neg, FastInt::ZERO, FastInt::ZERO);
    }
    match int_quotient(lhs, rhs, ctx) {
        Some(q) => E::from_parts(neg, q, FastInt::ZERO),
        None => invalid(ctx),
    }
}

/// The aligned integer quotient of two finite non-zero values,
/// or `None` if it cannot be represented.
fn int_quotient<E: Encoding>(lhs: &E, rhs: &E, ctx: &Ctx) -> Option<FastInt> {
    let t = lhs.exp().sub(rhs.exp());
    let (num, den) = if !t.is_negative() {
        let up = t.to_u64()?;
        (E::mul_radix_pow(lhs.coeff(), up)?, rhs.coeff().clone())
    } else {
        let down = t.neg().to_u64()?;
        (lhs.coeff().clone(), E::mul_radix_pow(rhs.coeff(), down)?)
    };
    let (q, _) = num.div_rem(&den);
    if ctx.precision > 0 && E::digit_length(&q) > u64::from(ctx.precision) {
        return None;
    }
    Some(q)
}

/// Computes the remainder `lhs - div_integer(lhs, rhs) * rhs`.
///
/// The remainder keeps the dividend's sign.
pub(crate) fn rem<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, rhs, ctx) {
        return r;
    }
    if lhs.is_infinite() || rhs.is_zero() {
        return invalid(ctx);
    }
    if rhs.is_infinite() {
        return round::apply(
            Raw::new(lhs.signbit(), lhs.coeff().clone(), lhs.exp().clone()),
            None,
            ctx,
        );
    }
    if lhs.is_zero() {
        return round::apply(
            Raw::new(lhs.signbit(), FastInt::ZERO, lhs.exp().clone()),
            None,
            ctx,
        );
    }

    // Align both coefficients at the smaller exponent; the
    // remainder of that integer division is the remainder at
    // that exponent.
    let t = lhs.exp().sub(rhs.exp());
    let scaled = if !t.is_negative() {
        t.to_u64().and_then(|up| {
            Some((E::mul_radix_pow(lhs.coeff(), up)?, rhs.coeff().clone()))
        })
    } else {
        t.neg().to_u64().and_then(|down| {
            Some((lhs.coeff().clone(), E::mul_radix_pow(rhs.coeff(), down)?))
        })
    };
    let (num, den) = match scaled {
        Some(v) => v,
        None => return invalid(ctx),
    };
    let (q, r) = num.div_rem(&den);
    if ctx.precision > 0 && E::digit_length(&q) > u64::from(ctx.precision) {
        return invalid(ctx);
    }
    let exp = if !t.is_negative() {
        rhs.exp().clone()
    } else {
        lhs.exp().clone()
    };
    round::apply(Raw::new(lhs.signbit(), r, exp), None, ctx)
}

/// Re-expresses `lhs` with exactly the exponent of `template`.
pub(crate) fn quantize<E: Encoding>(lhs: &E, template: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(lhs, template, ctx) {
        return r;
    }
    if lhs.is_infinite() || template.is_infinite() {
        if lhs.is_infinite() && template.is_infinite() {
            return lhs.clone();
        }
        return invalid(ctx);
    }

    let target = template.exp().clone();
    if let Some(emax) = ctx.emax {
        if target.cmp(&FastInt::new(emax)) == Ordering::Greater {
            return invalid(ctx);
        }
    }
    if let Some(etiny) = ctx.etiny() {
        if target.cmp(&FastInt::new(etiny)) == Ordering::Less {
            return invalid(ctx);
        }
    }

    let neg = lhs.signbit();
    let prec = ctx.precision;
    let diff = lhs.exp().sub(&target);
    if diff.is_zero() {
        if prec > 0 && E::digit_length(lhs.coeff()) > u64::from(prec) {
            return invalid(ctx);
        }
        return E::from_parts(neg, lhs.coeff().clone(), target);
    }

    if !diff.is_negative() {
        // Pad with zeros toward the smaller exponent.
        let n = match diff.to_u64() {
            Some(n) => n,
            None => return invalid(ctx),
        };
        if prec > 0 && E::digit_length(lhs.coeff()) + n > u64::from(prec) && !lhs.is_zero() {
            return invalid(ctx);
        }
        let coeff = match E::mul_radix_pow(lhs.coeff(), n) {
            Some(c) => c,
            None => return invalid(ctx),
        };
        return E::from_parts(neg, coeff, target);
    }

    // Discard digits toward the larger exponent.
    let n = match diff.neg().to_u64() {
        Some(n) => n,
        None => {
            // The template is unimaginably coarser; everything
            // is discarded.
            u64::MAX
        }
    };
    let (mut q, lsd, sticky) = E::shr_digits(lhs.coeff(), n.min(E::digit_length(lhs.coeff()) + 1));
    let d = Discard { lsd, sticky };
    let mut flags = Condition::ROUNDED;
    if d.any() {
        if matches!(ctx.rounding, RoundingMode::Exact) {
            return invalid(ctx);
        }
        flags |= Condition::INEXACT;
        let last = u8::try_from(
            q.div_rem(&FastInt::from(E::RADIX)).1.to_u64().unwrap_or(0),
        )
        .unwrap_or(0);
        if ctx.rounding.rounds_away(neg, d.lsd, d.sticky, last, E::RADIX) {
            q = q.add(&FastInt::ONE);
        }
    }
    if prec > 0 && E::digit_length(&q) > u64::from(prec) {
        return invalid(ctx);
    }
    ctx.raise(flags);
    E::from_parts(neg, q, target)
}

/// Rounds `x` to the context's precision and range.
pub(crate) fn round_to_precision<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nan(x, ctx) {
        return r;
    }
    if x.is_infinite() {
        return x.clone();
    }
    round::apply(
        Raw::new(x.signbit(), x.coeff().clone(), x.exp().clone()),
        None,
        ctx,
    )
}

/// Rounds `x`, then removes trailing zero digits.
pub(crate) fn reduce<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    let r = round_to_precision(x, ctx);
    if !r.is_finite() {
        return r;
    }
    if r.is_zero() {
        return E::from_parts(r.signbit(), FastInt::ZERO, FastInt::ZERO);
    }
    let mut coeff = r.coeff().clone();
    let mut exp = r.exp().clone();
    let radix = FastInt::from(E::RADIX);
    loop {
        let (q, rest) = coeff.div_rem(&radix);
        if !rest.is_zero() {
            break;
        }
        coeff = q;
        exp = exp.add(&FastInt::ONE);
    }
    E::from_parts(r.signbit(), coeff, exp)
}

/// Numeric comparison. NaN compares as maximal; a signaling
/// NaN operand raises Invalid.
pub(crate) fn cmp<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> Ordering {
    if lhs.is_signaling() || rhs.is_signaling() {
        ctx.raise(Condition::INVALID_OPERATION);
    }
    match (lhs.is_nan(), rhs.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => cmp_numeric(lhs, rhs),
    }
}

/// Numeric comparison of two non-NaN values.
pub(crate) fn cmp_numeric<E: Encoding>(lhs: &E, rhs: &E) -> Ordering {
    let ls = lhs.sign();
    let rs = rhs.sign();
    if ls != rs {
        return ls.cmp(&rs);
    }
    if ls == 0 {
        return Ordering::Equal;
    }
    let neg = ls < 0;
    let mag = match (lhs.is_infinite(), rhs.is_infinite()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => cmp_abs(lhs, rhs),
    };
    if neg {
        mag.reverse()
    } else {
        mag
    }
}

/// Compares the magnitudes of two finite non-zero values.
fn cmp_abs<E: Encoding>(lhs: &E, rhs: &E) -> Ordering {
    match lhs.adjusted_exp().cmp(&rhs.adjusted_exp()) {
        Ordering::Less => Ordering::Less,
        Ordering::Greater => Ordering::Greater,
        Ordering::Equal => {
            // Same leading-digit position: align and compare
            // coefficients. The exponent gap equals the digit
            // gap, so the scaling is small.
            let diff = lhs.exp().sub(rhs.exp());
            if diff.is_zero() {
                return lhs.coeff().cmp(rhs.coeff());
            }
            if diff.is_positive() {
                match diff
                    .to_u64()
                    .and_then(|d| E::mul_radix_pow(lhs.coeff(), d))
                {
                    Some(scaled) => scaled.cmp(rhs.coeff()),
                    None => Ordering::Equal,
                }
            } else {
                match diff
                    .neg()
                    .to_u64()
                    .and_then(|d| E::mul_radix_pow(rhs.coeff(), d))
                {
                    Some(scaled) => lhs.coeff().cmp(&scaled),
                    None => Ordering::Equal,
                }
            }
        }
    }
}

/// Ranks a special class in total order, for non-negative
/// values; negatives reverse it.
fn total_rank<E: Encoding>(x: &E) -> u8 {
    match x.special() {
        Special::Finite => 0,
        Special::Inf => 1,
        Special::SNan => 2,
        Special::QNan => 3,
    }
}

/// Total ordering: every pair of values, including NaNs and
/// signed zeros, has a definite order.
///
/// `-qNaN < -sNaN < -inf < finite < +inf < +sNaN < +qNaN`, with
/// numerically equal finite values ordered by exponent and NaNs
/// by payload. Raises no conditions.
pub(crate) fn cmp_total<E: Encoding>(lhs: &E, rhs: &E) -> Ordering {
    match (lhs.signbit(), rhs.signbit()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    let neg = lhs.signbit();
    let ord = match total_rank(lhs).cmp(&total_rank(rhs)) {
        Ordering::Equal => match lhs.special() {
            Special::Inf => Ordering::Equal,
            Special::QNan | Special::SNan => lhs.coeff().cmp(rhs.coeff()),
            Special::Finite => {
                let mag = match (lhs.is_zero(), rhs.is_zero()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => cmp_abs(lhs, rhs),
                };
                // Equal magnitudes order by exponent so that
                // different scales still compare
                // deterministically.
                match mag {
                    Ordering::Equal => lhs.exp().cmp(rhs.exp()),
                    ord => ord,
                }
            }
        },
        ord => ord,
    };
    if neg {
        ord.reverse()
    } else {
        ord
    }
}

/// Total ordering of magnitudes: [`cmp_total`] with both sign
/// bits cleared.
pub(crate) fn cmp_total_mag<E: Encoding>(lhs: &E, rhs: &E) -> Ordering {
    cmp_total(&lhs.with_sign(false), &rhs.with_sign(false))
}

/// NaN handling shared by min/max: a quiet NaN loses to
/// a number, a signaling NaN is an error.
fn minmax_nans<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> Option<E> {
    if lhs.is_signaling() || rhs.is_signaling() {
        ctx.raise(Condition::INVALID_OPERATION);
        let s = if lhs.is_signaling() { lhs } else { rhs };
        return Some(s.quieted());
    }
    match (lhs.is_nan(), rhs.is_nan()) {
        (true, true) => Some(lhs.clone()),
        (true, false) => Some(round_to_precision(rhs, ctx)),
        (false, true) => Some(round_to_precision(lhs, ctx)),
        (false, false) => None,
    }
}

/// Returns the larger operand, breaking numeric ties with the
/// total order.
pub(crate) fn max<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = minmax_nans(lhs, rhs, ctx) {
        return r;
    }
    let pick = match cmp_numeric(lhs, rhs) {
        Ordering::Greater => lhs,
        Ordering::Less => rhs,
        Ordering::Equal => {
            if cmp_total(lhs, rhs) == Ordering::Greater {
                lhs
            } else {
                rhs
            }
        }
    };
    round_to_precision(pick, ctx)
}

/// Returns the smaller operand, breaking numeric ties with the
/// total order.
pub(crate) fn min<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = minmax_nans(lhs, rhs, ctx) {
        return r;
    }
    let pick = match cmp_numeric(lhs, rhs) {
        Ordering::Less => lhs,
        Ordering::Greater => rhs,
        Ordering::Equal => {
            if cmp_total(lhs, rhs) == Ordering::Less {
                lhs
            } else {
                rhs
            }
        }
    };
    round_to_precision(pick, ctx)
}

/// Returns the operand with the larger magnitude.
pub(crate) fn max_mag<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = minmax_nans(lhs, rhs, ctx) {
        return r;
    }
    match cmp_numeric(&lhs.with_sign(false), &rhs.with_sign(false)) {
        Ordering::Greater => round_to_precision(lhs, ctx),
        Ordering::Less => round_to_precision(rhs, ctx),
        Ordering::Equal => max(lhs, rhs, ctx),
    }
}

/// Returns the operand with the smaller magnitude.
pub(crate) fn min_mag<E: Encoding>(lhs: &E, rhs: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = minmax_nans(lhs, rhs, ctx) {
        return r;
    }
    match cmp_numeric(&lhs.with_sign(false), &rhs.with_sign(false)) {
        Ordering::Greater => round_to_precision(rhs, ctx),
        Ordering::Less => round_to_precision(lhs, ctx),
        Ordering::Equal => min(lhs, rhs, ctx),
    }
}

/// Returns the closest representable value above `x`.
///
/// Raises no conditions; requires a bounded context.
pub(crate) fn next_plus<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    next_adjacent(x, ctx, false)
}

/// Returns the closest representable value below `x`.
///
/// Raises no conditions; requires a bounded context.
pub(crate) fn next_minus<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    next_adjacent(x, ctx, true)
}

fn next_adjacent<E: Encoding>(x: &E, ctx: &mut Ctx, minus: bool) -> E {
    if let Some(r) = handle_nan(x, ctx) {
        return r;
    }
    debug_assert!(ctx.precision > 0 && ctx.emin.is_some() && ctx.emax.is_some());

    if x.is_infinite() {
        // Stepping inward from an infinity lands on the largest
        // finite value of the same sign.
        if x.signbit() != minus {
            let prec = u64::from(ctx.precision);
            let coeff = crate::encoding::radix_pow(E::RADIX, prec).sub(&FastInt::ONE);
            let exp = ctx
                .emax
                .map(|e| e.saturating_sub(i64::from(ctx.precision) - 1))
                .unwrap_or(0);
            return E::from_parts(x.signbit(), coeff, FastInt::new(exp));
        }
        return x.clone();
    }

    // x ± epsilon under a directed rounding, with epsilon small
    // enough to act purely as a sticky nudge. Next-adjacent
    // raises no conditions, so the flags go to a scratch
    // context.
    let eps_exp = ctx.etiny().unwrap_or(0).saturating_sub(2);
    let eps = E::from_parts(minus, FastInt::ONE, FastInt::new(eps_exp));
    let mut scratch = ctx.clone();
    scratch.flags = Condition::empty();
    scratch.traps = Condition::empty();
    scratch.rounding = if minus {
        RoundingMode::ToNegativeInf
    } else {
        RoundingMode::ToPositiveInf
    };
    add(x, &eps, &mut scratch)
}

/// Returns the closest representable value to `x` in the
/// direction of `y`.
pub(crate) fn next_toward<E: Encoding>(x: &E, y: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(x, y, ctx) {
        return r;
    }
    match cmp_numeric(x, y) {
        Ordering::Equal => x.with_sign(y.signbit()),
        Ordering::Less => next_plus(x, ctx),
        Ordering::Greater => next_minus(x, ctx),
    }
}

/// Raises `x` to the integer power `n` by repeated squaring.
pub(crate) fn pow_int<E: Encoding>(x: &E, n: i64, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nan(x, ctx) {
        return r;
    }
    if n == 0 {
        if x.is_zero() {
            // 0^0
            return invalid(ctx);
        }
        return round::apply(Raw::new(false, FastInt::ONE, FastInt::ZERO), None, ctx);
    }
    let odd = n % 2 != 0;
    if x.is_infinite() {
        let neg = x.signbit() && odd;
        if n > 0 {
            return inf(neg);
        }
        let exp = FastInt::new(ctx.etiny().unwrap_or(0));
        return round::apply(Raw::new(neg, FastInt::ZERO, exp), None, ctx);
    }
    if x.is_zero() {
        let neg = x.signbit() && odd;
        if n < 0 {
            ctx.raise(Condition::DIVISION_BY_ZERO);
            return inf(neg);
        }
        let exp = x.exp().mul(&FastInt::new(n));
        return round::apply(Raw::new(neg, FastInt::ZERO, exp), None, ctx);
    }

    if ctx.precision == 0 {
        return pow_int_exact(x, n, ctx);
    }

    // Work at an inflated precision, rounding toward odd so the
    // final rounding in the caller's mode cannot double-round.
    let extra = 64 - n.unsigned_abs().leading_zeros();
    let mut work = Ctx::new()
        .with_precision(ctx.precision + extra + 5)
        .with_bits_precision(ctx.bits_precision)
        .with_rounding_mode(RoundingMode::ToOdd);
    let r = pow_by_squaring(x, n.unsigned_abs(), &mut work);
    let r = if n < 0 {
        let one = E::value_of(1);
        div(&one, &r, &mut work)
    } else {
        r
    };
    finish_inflated(&r, &work, ctx)
}

/// Exact integer power for unlimited-precision contexts.
fn pow_int_exact<E: Encoding>(x: &E, n: i64, ctx: &mut Ctx) -> E {
    // The result would have roughly digits(x) * n digits; guard
    // against attempting the impossible.
    let digits = E::digit_length(x.coeff());
    if digits.saturating_mul(n.unsigned_abs()) > crate::encoding::MAX_RADIX_SHIFT {
        return invalid(ctx);
    }
    let mut work = Ctx::new();
    let r = pow_by_squaring(x, n.unsigned_abs(), &mut work);
    if n < 0 {
        let one = E::value_of(1);
        return div(&one, &r, ctx);
    }
    round_to_precision(&r, ctx)
}

/// Computes `x^m`, m >= 1, by binary exponentiation in the
/// given context.
pub(crate) fn pow_by_squaring<E: Encoding>(x: &E, m: u64, ctx: &mut Ctx) -> E {
    debug_assert!(m >= 1);

    let mut base = round_to_precision(x, ctx);
    let mut acc: Option<E> = None;
    let mut m = m;
    while m > 0 {
        if m & 1 == 1 {
            acc = Some(match acc {
                Some(a) => mul(&a, &base, ctx),
                None => base.clone(),
            });
        }
        m >>= 1;
        if m > 0 {
            base = mul(&base, &base, ctx);
        }
    }
    // m >= 1, so the accumulator was set.
    acc.unwrap_or(base)
}

/// Rounds a result computed at inflated precision into the
/// caller's context, carrying inflated-stage inexactness as
/// a sticky digit.
pub(crate) fn finish_inflated<E: Encoding>(r: &E, work: &Ctx, ctx: &mut Ctx) -> E {
    if !r.is_finite() {
        if r.is_nan() {
            ctx.raise(Condition::INVALID_OPERATION);
        }
        return r.clone();
    }
    let inexact = work.flags.contains(Condition::INEXACT);
    let discard = if inexact {
        Some(Discard {
            lsd: 0,
            sticky: true,
        })
    } else {
        None
    };
    round::apply(
        Raw::new(r.signbit(), r.coeff().clone(), r.exp().clone()),
        discard,
        ctx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::Dec;

    fn ctx(prec: u32, mode: RoundingMode) -> Ctx {
        Ctx::new().with_precision(prec).with_rounding_mode(mode)
    }

    fn d(coeff: i64, exp: i64) -> Dec {
        Dec::new(coeff, exp)
    }

    fn parts(x: &Dec) -> (bool, i64, i64) {
        (
            x.signbit(),
            x.coeff().to_i64().unwrap(),
            Encoding::exp(x).to_i64().unwrap(),
        )
    }

    #[test]
    fn test_add_aligned() {
        // 2.00 + 1.0 = 3.00, exact.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = add(&d(200, -2), &d(10, -1), &mut c);
        assert_eq!(parts(&r), (false, 300, -2));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_add_zero_keeps_smaller_exponent() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = add(&d(1, 0), &d(0, -2), &mut c);
        assert_eq!(parts(&r), (false, 100, -2));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_sub_to_zero_sign() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = sub(&d(1, 0), &d(1, 0), &mut c);
        assert_eq!(parts(&r), (false, 0, 0));

        let mut c = ctx(5, RoundingMode::ToNegativeInf);
        let r = sub(&d(1, 0), &d(1, 0), &mut c);
        assert_eq!(parts(&r), (true, 0, 0));
    }

    #[test]
    fn test_add_negligible_operand() {
        // 1E+20 + 1 at five digits: the one only sets sticky.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = add(&d(1, 20), &d(1, 0), &mut c);
        assert_eq!(parts(&r), (false, 10000, 16));
        assert_eq!(c.flags(), Condition::INEXACT | Condition::ROUNDED);

        // Directed rounding sees the nudge.
        let mut c = ctx(5, RoundingMode::ToPositiveInf);
        let r = add(&d(1, 20), &d(1, 0), &mut c);
        assert_eq!(parts(&r), (false, 10001, 16));
    }

    #[test]
    fn test_add_exact_when_unlimited() {
        let mut c = Ctx::new();
        let r = add(&d(1, 20), &d(1, 0), &mut c);
        assert!(!r.signbit());
        assert_eq!(Encoding::exp(&r).to_i64(), Some(0));
        let want = crate::encoding::radix_pow(10, 20).add(&FastInt::ONE);
        assert_eq!(r.coeff(), &want);
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_add_infinities() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = add(&Dec::INFINITY, &d(1, 0), &mut c);
        assert!(r.is_infinite() && !r.signbit());

        let r = add(&Dec::INFINITY, &Dec::NEG_INFINITY, &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_mul() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = mul(&d(12, -1), &d(-4, 2), &mut c);
        assert_eq!(parts(&r), (true, 48, 1));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_mul_inf_by_zero() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = mul(&Dec::INFINITY, &d(0, 0), &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_div_exact() {
        // 10 / 2 = 5, at the ideal exponent.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div(&d(10, 0), &d(2, 0), &mut c);
        assert_eq!(parts(&r), (false, 5, 0));
        assert_eq!(c.flags(), Condition::empty());

        // 2.0 / 2 keeps the fractional scale: 1.0.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div(&d(20, -1), &d(2, 0), &mut c);
        assert_eq!(parts(&r), (false, 10, -1));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_div_inexact() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div(&d(1, 0), &d(3, 0), &mut c);
        assert_eq!(parts(&r), (false, 33333, -5));
        assert_eq!(c.flags(), Condition::INEXACT | Condition::ROUNDED);

        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div(&d(2, 0), &d(3, 0), &mut c);
        assert_eq!(parts(&r), (false, 66667, -5));
    }

    #[test]
    fn test_div_nonterminating_unlimited() {
        let mut c = Ctx::new();
        let r = div(&d(1, 0), &d(3, 0), &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_div_by_zero() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div(&d(-1, 0), &d(0, 0), &mut c);
        assert!(r.is_infinite() && r.signbit());
        assert!(c.flags().contains(Condition::DIVISION_BY_ZERO));

        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div(&d(0, 0), &d(0, 0), &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_div_to_exp() {
        // 10 / 3 at two fractional digits.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = div_to_exp(&d(10, 0), &d(3, 0), -2, &mut c);
        assert_eq!(parts(&r), (false, 333, -2));
        assert_eq!(c.flags(), Condition::INEXACT | Condition::ROUNDED);

        // Needs three digits but only two fit.
        let mut c = ctx(2, RoundingMode::ToNearestEven);
        let r = div_to_exp(&d(10, 0), &d(3, 0), -2, &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_div_integer() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = div_integer(&d(7, 0), &d(2, 0), &mut c);
        assert_eq!(parts(&r), (false, 3, 0));

        // Truncation toward zero, sign from the operands.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = div_integer(&d(-7, 0), &d(2, 0), &mut c);
        assert_eq!(parts(&r), (true, 3, 0));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_rem() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = rem(&d(10, 0), &d(3, 0), &mut c);
        assert_eq!(parts(&r), (false, 1, 0));

        // The remainder keeps the dividend's sign.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = rem(&d(-10, 0), &d(3, 0), &mut c);
        assert_eq!(parts(&r), (true, 1, 0));

        // 10.5 rem 3 = 1.5 at the fractional scale.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = rem(&d(105, -1), &d(3, 0), &mut c);
        assert_eq!(parts(&r), (false, 15, -1));
    }

    #[test]
    fn test_quantize() {
        // 2.17 to three fractional digits pads.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = quantize(&d(217, -2), &d(1, -3), &mut c);
        assert_eq!(parts(&r), (false, 2170, -3));
        assert_eq!(c.flags(), Condition::empty());

        // 2.17 to one fractional digit rounds.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = quantize(&d(217, -2), &d(1, -1), &mut c);
        assert_eq!(parts(&r), (false, 22, -1));
        assert!(c.flags().contains(Condition::INEXACT | Condition::ROUNDED));

        // -0.1 to integers leaves a signed zero.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = quantize(&d(-1, -1), &d(1, 0), &mut c);
        assert_eq!(parts(&r), (true, 0, 0));
        assert!(c.flags().contains(Condition::INEXACT));
    }

    #[test]
    fn test_quantize_idempotent() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let q1 = quantize(&d(217, -2), &d(1, -1), &mut c);
        assert_eq!(parts(&q1), (false, 22, -1));

        // A second pass at the same template changes nothing and
        // discards nothing.
        let mut c2 = ctx(9, RoundingMode::ToNearestEven);
        let q2 = quantize(&q1, &d(1, -1), &mut c2);
        assert_eq!(parts(&q2), parts(&q1));
        assert_eq!(c2.flags(), Condition::empty());
    }

    #[test]
    fn test_round_to_precision_idempotent() {
        let mut c = ctx(3, RoundingMode::ToNearestEven);
        let r1 = round_to_precision(&d(123_456, -4), &mut c);
        assert!(Dec::digit_length(r1.coeff()) <= 3);
        assert!(c.flags().contains(Condition::INEXACT));

        let mut c2 = ctx(3, RoundingMode::ToNearestEven);
        let r2 = round_to_precision(&r1, &mut c2);
        assert_eq!(parts(&r2), parts(&r1));
        assert_eq!(c2.flags(), Condition::empty());
    }

    #[test]
    fn test_reciprocal_product_rounds_to_one() {
        for a in [3i64, 7, 9, 11, 13] {
            let mut c = ctx(9, RoundingMode::ToNearestEven);
            let inv = div(&d(1, 0), &d(a, 0), &mut c);
            let r = mul(&d(a, 0), &inv, &mut c);
            assert!(c.flags().contains(Condition::INEXACT), "{a}");
            // Off by at most one unit in the ninth place.
            let mut exact = Ctx::new();
            let err = sub(&r, &d(1, 0), &mut exact);
            assert!(
                err.is_zero()
                    || err.adjusted_exp().cmp(&FastInt::new(-9)) != Ordering::Greater,
                "{a}"
            );
        }

        // A terminating reciprocal round-trips exactly.
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let inv = div(&d(1, 0), &d(8, 0), &mut c);
        let r = mul(&d(8, 0), &inv, &mut c);
        assert_eq!(parts(&r), (false, 1000, -3));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_quantize_needs_too_many_digits() {
        let mut c = ctx(3, RoundingMode::ToNearestEven);
        let r = quantize(&d(12345, 0), &d(1, -2), &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_quantize_infinities() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = quantize(&Dec::INFINITY, &Dec::NEG_INFINITY, &mut c);
        assert!(r.is_infinite() && !r.signbit());

        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = quantize(&d(1, 0), &Dec::INFINITY, &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_reduce() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = reduce(&d(1200, -2), &mut c);
        assert_eq!(parts(&r), (false, 12, 0));

        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = reduce(&d(0, -5), &mut c);
        assert_eq!(parts(&r), (false, 0, 0));

        let mut c = ctx(9, RoundingMode::ToNearestEven);
        let r = reduce(&Dec::NEG_INFINITY, &mut c);
        assert!(r.is_infinite() && r.signbit());
    }

    #[test]
    fn test_cmp_numeric() {
        let mut c = Ctx::new();
        assert_eq!(cmp(&d(1, 0), &d(2, 0), &mut c), Ordering::Less);
        assert_eq!(cmp(&d(-1, 0), &d(1, 0), &mut c), Ordering::Less);
        // Different scales, same value.
        assert_eq!(cmp(&d(10, -1), &d(1, 0), &mut c), Ordering::Equal);
        // Signed zeros are numerically equal.
        assert_eq!(cmp(&d(0, 0), &d(-0, 5), &mut c), Ordering::Equal);
        assert_eq!(cmp(&Dec::INFINITY, &d(1, 99), &mut c), Ordering::Greater);
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_cmp_nan_is_maximal() {
        let mut c = Ctx::new();
        assert_eq!(cmp(&Dec::NAN, &Dec::INFINITY, &mut c), Ordering::Greater);
        assert_eq!(cmp(&d(1, 0), &Dec::NAN, &mut c), Ordering::Less);
        assert_eq!(cmp(&Dec::NAN, &Dec::NAN, &mut c), Ordering::Equal);
        assert_eq!(c.flags(), Condition::empty());

        // A signaling operand still orders, but raises.
        assert_eq!(cmp(&Dec::SNAN, &d(1, 0), &mut c), Ordering::Greater);
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }

    #[test]
    fn test_cmp_total() {
        assert_eq!(cmp_total(&d(-0, 0), &d(0, 0)), Ordering::Less);
        // Equal values order by exponent.
        assert_eq!(cmp_total(&d(10, -1), &d(1, 0)), Ordering::Less);
        assert_eq!(cmp_total(&Dec::NAN, &Dec::INFINITY), Ordering::Greater);
        assert_eq!(cmp_total(&Dec::SNAN, &Dec::NAN), Ordering::Less);
        assert_eq!(
            cmp_total(&Dec::NAN.with_sign(true), &Dec::NEG_INFINITY),
            Ordering::Less
        );
        assert_eq!(cmp_total(&d(-1, 0), &d(1, 0)), Ordering::Less);
    }

    #[test]
    fn test_cmp_total_mag() {
        assert_eq!(cmp_total_mag(&d(-2, 0), &d(1, 0)), Ordering::Greater);
        assert_eq!(cmp_total_mag(&d(-1, 0), &d(1, 0)), Ordering::Equal);
    }

    #[test]
    fn test_min_max() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        assert_eq!(parts(&max(&d(1, 0), &d(2, 0), &mut c)), (false, 2, 0));
        assert_eq!(parts(&min(&d(1, 0), &d(2, 0), &mut c)), (false, 1, 0));

        // A quiet NaN loses to a number.
        assert_eq!(parts(&max(&Dec::NAN, &d(1, 0), &mut c)), (false, 1, 0));
        assert_eq!(c.flags(), Condition::empty());

        // Ties break by total order: min prefers -0.
        assert_eq!(parts(&min(&d(0, 0), &d(-0, 0).with_sign(true), &mut c)), (true, 0, 0));
        assert_eq!(parts(&max(&d(0, 0), &d(-0, 0).with_sign(true), &mut c)), (false, 0, 0));
    }

    #[test]
    fn test_min_max_mag() {
        let mut c = ctx(9, RoundingMode::ToNearestEven);
        assert_eq!(parts(&max_mag(&d(-2, 0), &d(1, 0), &mut c)), (true, 2, 0));
        assert_eq!(parts(&min_mag(&d(-2, 0), &d(1, 0), &mut c)), (false, 1, 0));
    }

    #[test]
    fn test_next_plus_minus() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-99, 99);
        let r = next_plus(&d(1, 0), &mut c);
        assert_eq!(parts(&r), (false, 101, -2));
        assert_eq!(c.flags(), Condition::empty());

        let r = next_minus(&d(1, 0), &mut c);
        assert_eq!(parts(&r), (false, 999, -3));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_next_at_infinity() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-99, 99);
        let r = next_plus(&Dec::INFINITY, &mut c);
        assert!(r.is_infinite() && !r.signbit());

        // Stepping down from +inf lands on the largest finite
        // value.
        let r = next_minus(&Dec::INFINITY, &mut c);
        assert_eq!(parts(&r), (false, 999, 97));

        let r = next_plus(&Dec::NEG_INFINITY, &mut c);
        assert_eq!(parts(&r), (true, 999, 97));
    }

    #[test]
    fn test_next_toward() {
        let mut c = ctx(3, RoundingMode::ToNearestEven).with_exponent_range(-99, 99);
        let r = next_toward(&d(1, 0), &d(2, 0), &mut c);
        assert_eq!(parts(&r), (false, 101, -2));

        let r = next_toward(&d(1, 0), &d(-2, 0), &mut c);
        assert_eq!(parts(&r), (false, 999, -3));

        // Equal operands take the sign of the target.
        let r = next_toward(&d(0, 0), &d(-0, 0).with_sign(true), &mut c);
        assert_eq!(parts(&r), (true, 0, 0));
    }

    #[test]
    fn test_pow_int() {
        let mut c = ctx(6, RoundingMode::ToNearestEven);
        let r = pow_int(&d(2, 0), 10, &mut c);
        assert_eq!(parts(&r), (false, 1024, 0));
        assert_eq!(c.flags(), Condition::empty());

        // Negative power of an exactly invertible base.
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = pow_int(&d(2, 0), -2, &mut c);
        assert_eq!(parts(&r), (false, 25, -2));
        assert_eq!(c.flags(), Condition::empty());

        // Odd powers keep the sign.
        let mut c = ctx(6, RoundingMode::ToNearestEven);
        let r = pow_int(&d(-3, 0), 3, &mut c);
        assert_eq!(parts(&r), (true, 27, 0));
    }

    #[test]
    fn test_pow_int_inexact() {
        let mut c = ctx(4, RoundingMode::ToNearestEven);
        let r = pow_int(&d(3, 0), 10, &mut c);
        // 59049 to four digits.
        assert_eq!(parts(&r), (false, 5905, 1));
        assert!(c.flags().contains(Condition::INEXACT | Condition::ROUNDED));
    }

    #[test]
    fn test_pow_int_specials() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = pow_int(&d(0, 0), 0, &mut c);
        assert!(r.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));

        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = pow_int(&d(0, 0), -1, &mut c);
        assert!(r.is_infinite());
        assert!(c.flags().contains(Condition::DIVISION_BY_ZERO));

        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = pow_int(&Dec::NEG_INFINITY, 3, &mut c);
        assert!(r.is_infinite() && r.signbit());

        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = pow_int(&d(7, 0), 0, &mut c);
        assert_eq!(parts(&r), (false, 1, 0));
    }

    #[test]
    fn test_pow_int_exact_unlimited() {
        let mut c = Ctx::new();
        let r = pow_int(&d(3, 0), 4, &mut c);
        assert_eq!(parts(&r), (false, 81, 0));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_nan_propagation() {
        let mut c = ctx(5, RoundingMode::ToNearestEven);
        let r = add(&Dec::NAN, &d(1, 0), &mut c);
        assert!(r.is_nan());
        assert_eq!(c.flags(), Condition::empty());

        let r = mul(&d(1, 0), &Dec::SNAN, &mut c);
        assert!(r.is_nan() && !r.is_signaling());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));
    }
}
