//! Correctly rounded algebraic and transcendental functions.
//!
//! Every routine here computes at an inflated working precision
//! with [`RoundingMode::ToOdd`], then re-rounds into the
//! caller's context with the working-stage inexactness folded in
//! as a sticky digit. Rounding toward an odd digit never lands
//! on a tie of the final precision, so the two-stage rounding is
//! equivalent to rounding the true value once.
//!
//! These routines require a bounded precision; the public entry
//! points refuse unlimited-precision contexts before calling in.

use core::cmp::Ordering;

use num_bigint::BigInt;

use crate::{
    ctx::{Condition, Ctx, RoundingMode},
    encoding::Encoding,
    fint::FastInt,
    math::{self, cmp_numeric, finish_inflated, handle_nan, handle_nans, inf, invalid},
    round::{self, Discard, Raw},
};

/// Iteration ceiling for the series and fixed-point loops. The
/// loops terminate on their own convergence tests; this only
/// bounds a logic error.
const MAX_ITERS: u32 = 10_000;

/// Computes the square root of `x`.
pub(crate) fn sqrt<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    root(x, 2, ctx)
}

/// Computes the `n`th root of `x`.
///
/// Even roots of negative values are invalid; odd roots keep
/// the sign. A negative `n` takes the reciprocal of the
/// positive root.
pub(crate) fn root<E: Encoding>(x: &E, n: i64, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nan(x, ctx) {
        return r;
    }
    if n == 0 {
        return invalid(ctx);
    }
    if n < 0 {
        let m = match n.checked_neg() {
            Some(m) => m,
            None => return invalid(ctx),
        };
        // The reciprocal turns a zero into a division by zero
        // and an infinity into a zero; those conditions belong
        // to the caller's context, so settle them before
        // recursing through a work context.
        if x.is_zero() {
            ctx.raise(Condition::DIVISION_BY_ZERO);
            return inf(x.signbit());
        }
        if x.is_infinite() {
            if x.signbit() && m % 2 == 0 {
                return invalid(ctx);
            }
            let exp = FastInt::new(ctx.etiny().unwrap_or(0));
            return round::apply(Raw::new(x.signbit(), FastInt::ZERO, exp), None, ctx);
        }
        let mut work = work_ctx(ctx, 10);
        let r = root(x, m, &mut work);
        let one = E::value_of(1);
        let r = math::div(&one, &r, &mut work);
        return finish_inflated(&r, &work, ctx);
    }
    // The half-way test raises small integers to the nth power;
    // cap the degree so those powers stay computable.
    let n = match u32::try_from(n) {
        Ok(n) if n <= 0xFFFF => n,
        _ => return invalid(ctx),
    };
    if n == 1 {
        return math::round_to_precision(x, ctx);
    }
    let even = n % 2 == 0;
    if x.is_infinite() {
        if x.signbit() {
            return if even { invalid(ctx) } else { inf(true) };
        }
        return inf(false);
    }
    if x.signbit() && !x.is_zero() && even {
        return invalid(ctx);
    }
    let en = FastInt::from(n);
    if x.is_zero() {
        let exp = floor_div(x.exp(), &en);
        return round::apply(Raw::new(x.signbit(), FastInt::ZERO, exp), None, ctx);
    }

    debug_assert!(ctx.precision > 0);
    let neg = x.signbit();

    // Scale the coefficient so the truncated integer root
    // carries a couple of digits beyond the precision, choosing
    // the shift so the scaled exponent divides evenly by n.
    let p = u64::from(ctx.precision) + 2;
    let digits = E::digit_length(x.coeff());
    let t0 = (u64::from(n) * p).saturating_sub(digits);
    let residue = x.exp().sub(&FastInt::from(t0)).div_rem(&en).1;
    let residue = if residue.is_negative() {
        residue.add(&en)
    } else {
        residue
    };
    let t = t0 + residue.to_u64().unwrap_or(0);
    let m = match E::mul_radix_pow(x.coeff(), t) {
        Some(m) => m,
        None => return invalid(ctx),
    };

    let r = m.nth_root(n);
    let rn = FastInt::from_big(r.to_big().pow(n));
    let rem = m.sub(&rn);
    let res_exp = x.exp().sub(&FastInt::from(t)).div_rem(&en).0;

    if rem.is_zero() {
        // Exact: shed trailing zeros down to the ideal exponent
        // floor(e / n).
        let ideal = floor_div(x.exp(), &en);
        let radix = FastInt::from(E::RADIX);
        let mut coeff = r;
        let mut exp = res_exp;
        while exp.cmp(&ideal) == Ordering::Less {
            let (q, rest) = coeff.div_rem(&radix);
            if !rest.is_zero() {
                break;
            }
            coeff = q;
            exp = exp.add(&FastInt::ONE);
        }
        return round::apply(Raw::new(neg, coeff, exp), None, ctx);
    }

    // The true root lies strictly between r and r+1; classify
    // the tail against one half by comparing m * 2^n with
    // (2r + 1)^n.
    let half = (E::RADIX / 2) as u8;
    let lhs = m.mul(&FastInt::from_big(BigInt::from(2).pow(n)));
    let mid = FastInt::from_big((r.to_big() * BigInt::from(2) + BigInt::from(1)).pow(n));
    let d = match lhs.cmp(&mid) {
        Ordering::Less => Discard {
            lsd: 0,
            sticky: true,
        },
        Ordering::Equal => Discard {
            lsd: half,
            sticky: false,
        },
        Ordering::Greater => Discard {
            lsd: half,
            sticky: true,
        },
    };
    round::apply(Raw::new(neg, r, res_exp), Some(d), ctx)
}

/// Computes `e^x`.
pub(crate) fn exp<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nan(x, ctx) {
        return r;
    }
    if x.is_infinite() {
        if x.signbit() {
            return E::from_parts(false, FastInt::ZERO, FastInt::ZERO);
        }
        return inf(false);
    }
    if x.is_zero() {
        return round::apply(Raw::new(false, FastInt::ONE, FastInt::ZERO), None, ctx);
    }
    debug_assert!(ctx.precision > 0);

    if let Some(up) = exp_overwhelms(x) {
        return range_saturate(up, ctx);
    }
    // Beyond the machine range the operand is microscopic.
    let adj = x.adjusted_exp().to_i64().unwrap_or(-2);

    // Halve the argument k times so the Taylor series converges
    // geometrically, then square the sum k times. Halving is
    // exact in both radices.
    let lg_radix: i64 = if E::RADIX == 2 { 1 } else { 4 };
    let k = if adj >= -1 {
        u32::try_from(3 + (adj + 1).max(0) * lg_radix).unwrap_or(0)
    } else {
        0
    };
    let mut work = work_ctx(ctx, k + 10);

    let two = E::value_of(2);
    let mut exact = Ctx::new();
    let mut y = x.clone();
    for _ in 0..k {
        y = math::div(&y, &two, &mut exact);
    }

    let one = E::value_of(1);
    let mut sum = math::add(&one, &y, &mut work);
    let mut term = y.clone();
    let gap = FastInt::from(u64::from(work.precision()) + 2);
    let mut i: i64 = 2;
    for _ in 0..MAX_ITERS {
        term = math::div(&math::mul(&term, &y, &mut work), &E::value_of(i), &mut work);
        if term.is_zero() {
            break;
        }
        sum = math::add(&sum, &term, &mut work);
        let cutoff = sum.adjusted_exp().sub(&gap);
        if term.adjusted_exp().cmp(&cutoff) == Ordering::Less {
            break;
        }
        i += 1;
    }

    let mut r = sum;
    for _ in 0..k {
        r = math::mul(&r, &r, &mut work);
    }

    // e^x is irrational for any non-zero rational x.
    work.raise(Condition::INEXACT);
    finish_inflated(&r, &work, ctx)
}

/// Computes the natural logarithm of `x`.
pub(crate) fn ln<E: Encoding>(x: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nan(x, ctx) {
        return r;
    }
    if x.is_infinite() {
        if x.signbit() {
            return invalid(ctx);
        }
        return inf(false);
    }
    if x.is_zero() {
        return inf(true);
    }
    if x.signbit() {
        return invalid(ctx);
    }
    let one = E::value_of(1);
    if cmp_numeric(x, &one) == Ordering::Equal {
        return round::apply(Raw::new(false, FastInt::ZERO, FastInt::ZERO), None, ctx);
    }
    debug_assert!(ctx.precision > 0);

    // An argument already near 1 must go straight into the
    // series: x - 1 is exact, and pre-conditioning it through
    // fixed-precision square roots would wipe out a tiny offset
    // entirely. Everything else is pulled toward 1 with s square
    // roots first.
    let near = {
        let adj = x.adjusted_exp();
        let thresh = if E::RADIX == 2 { -4 } else { -2 };
        if adj.is_zero() || adj == FastInt::new(-1) {
            let mut scratch = Ctx::new();
            let z = math::sub(x, &one, &mut scratch);
            (z.is_finite() && z.adjusted_exp().cmp(&FastInt::new(thresh)) != Ordering::Greater)
                .then_some(z)
        } else {
            None
        }
    };

    let (s, t, mut work) = match near {
        Some(z) => {
            let mut work = work_ctx(ctx, 10);
            let den = math::add(x, &one, &mut work);
            let t = math::div(&z, &den, &mut work);
            (0u32, t, work)
        }
        None => {
            let abits = u32::try_from(x.adjusted_exp().abs().bits()).unwrap_or(u32::MAX);
            let s = abits.saturating_add(if E::RADIX == 2 { 3 } else { 5 });
            let mut work = work_ctx(ctx, s + 10);
            let mut y = x.clone();
            for _ in 0..s {
                y = root(&y, 2, &mut work);
            }
            let num = math::sub(&y, &one, &mut work);
            let den = math::add(&y, &one, &mut work);
            let t = math::div(&num, &den, &mut work);
            (s, t, work)
        }
    };

    let t2 = math::mul(&t, &t, &mut work);
    let mut sum = t.clone();
    let mut tp = t;
    let gap = FastInt::from(u64::from(work.precision()) + 2);
    let mut i: i64 = 3;
    for _ in 0..MAX_ITERS {
        tp = math::mul(&tp, &t2, &mut work);
        let term = math::div(&tp, &E::value_of(i), &mut work);
        if term.is_zero() {
            break;
        }
        sum = math::add(&sum, &term, &mut work);
        let cutoff = sum.adjusted_exp().sub(&gap);
        if term.adjusted_exp().cmp(&cutoff) == Ordering::Less {
            break;
        }
        i += 2;
    }

    let factor = E::from_parts(
        false,
        FastInt::from_big(BigInt::from(1) << (s + 1)),
        FastInt::ZERO,
    );
    let r = math::mul(&sum, &factor, &mut work);

    // ln(x) is irrational for any rational x other than 1.
    work.raise(Condition::INEXACT);
    finish_inflated(&r, &work, ctx)
}

/// Computes `x^y`.
///
/// An exactly integral `y` in machine range goes through
/// repeated squaring; everything else through `exp(y * ln x)`.
pub(crate) fn pow<E: Encoding>(x: &E, y: &E, ctx: &mut Ctx) -> E {
    if let Some(r) = handle_nans(x, y, ctx) {
        return r;
    }
    if y.is_zero() {
        if x.is_zero() {
            // 0^0
            return invalid(ctx);
        }
        return round::apply(Raw::new(false, FastInt::ONE, FastInt::ZERO), None, ctx);
    }
    if x.is_zero() {
        let neg = x.signbit() && is_odd_integer(y);
        if y.signbit() {
            ctx.raise(Condition::DIVISION_BY_ZERO);
            return inf(neg);
        }
        return round::apply(Raw::new(neg, FastInt::ZERO, FastInt::ZERO), None, ctx);
    }
    let one = E::value_of(1);
    if y.is_infinite() {
        if x.signbit() {
            return invalid(ctx);
        }
        let mag = cmp_numeric(x, &one);
        if mag == Ordering::Equal {
            return round::apply(Raw::new(false, FastInt::ONE, FastInt::ZERO), None, ctx);
        }
        // Growing bases diverge with +inf exponents; shrinking
        // bases with -inf.
        let diverges = (mag == Ordering::Greater) != y.signbit();
        if diverges {
            return inf(false);
        }
        return round::apply(Raw::new(false, FastInt::ZERO, FastInt::ZERO), None, ctx);
    }
    if x.is_infinite() {
        if x.signbit() && !is_integer(y) {
            return invalid(ctx);
        }
        let neg = x.signbit() && is_odd_integer(y);
        if y.signbit() {
            return round::apply(Raw::new(neg, FastInt::ZERO, FastInt::ZERO), None, ctx);
        }
        return inf(neg);
    }

    if let Some(n) = integral_value(y) {
        return math::pow_int(x, n, ctx);
    }
    if x.signbit() {
        // A non-integral power of a negative base.
        return invalid(ctx);
    }
    if cmp_numeric(x, &one) == Ordering::Equal {
        return round::apply(Raw::new(false, FastInt::ONE, FastInt::ZERO), None, ctx);
    }
    debug_assert!(ctx.precision > 0);

    // exp amplifies an absolute error in y*ln(x) into a relative
    // error of the result, so the guard grows with y's
    // magnitude. Truly huge exponents saturate inside exp.
    let yadj = y.adjusted_exp().to_i64().unwrap_or(48).clamp(0, 48);
    let extra = u32::try_from(yadj).unwrap_or(48) + 12;
    let mut work = work_ctx(ctx, extra);

    let l = ln(x, &mut work);
    let m = math::mul(y, &l, &mut work);
    // The saturation shortcut must see the caller's exponent
    // range; inside the unbounded work context it would turn an
    // overflow into Invalid.
    if let Some(up) = exp_overwhelms(&m) {
        return range_saturate(up, ctx);
    }
    let r = exp(&m, &mut work);

    work.raise(Condition::INEXACT);
    finish_inflated(&r, &work, ctx)
}

/// Computes pi by the arithmetic-geometric mean iteration.
///
/// Each pass doubles the correct digits; the loop stops once
/// two successive approximations agree at the working precision,
/// with an iteration ceiling behind it.
pub(crate) fn pi<E: Encoding>(ctx: &mut Ctx) -> E {
    debug_assert!(ctx.precision > 0);
    let mut work = work_ctx(ctx, 10);

    let one = E::value_of(1);
    let two = E::value_of(2);
    let four = E::value_of(4);

    let mut a = one.clone();
    let mut b = math::div(&one, &root(&two, 2, &mut work), &mut work);
    let mut t = math::div(&one, &four, &mut work);
    let mut p = one;

    let cap = 2 * (32 - work.precision().leading_zeros()) + 12;
    let mut prev: Option<E> = None;
    let mut settled = 0u32;
    for _ in 0..cap {
        let an = math::div(&math::add(&a, &b, &mut work), &two, &mut work);
        let bn = root(&math::mul(&a, &b, &mut work), 2, &mut work);
        let d = math::sub(&a, &an, &mut work);
        let d2 = math::mul(&d, &d, &mut work);
        t = math::sub(&t, &math::mul(&p, &d2, &mut work), &mut work);
        p = math::mul(&p, &two, &mut work);
        a = an;
        b = bn;

        let s = math::add(&a, &b, &mut work);
        let cand = math::div(
            &math::mul(&s, &s, &mut work),
            &math::mul(&four, &t, &mut work),
            &mut work,
        );
        if let Some(prev) = &prev {
            if cmp_numeric(&cand, prev) == Ordering::Equal {
                settled += 1;
            } else {
                settled = 0;
            }
        }
        prev = Some(cand);
        if settled >= 2 {
            break;
        }
    }

    match prev {
        Some(r) => {
            work.raise(Condition::INEXACT);
            finish_inflated(&r, &work, ctx)
        }
        None => invalid(ctx),
    }
}

/// A fresh context at an inflated precision, rounding toward
/// odd, with no exponent range so intermediates never overflow.
fn work_ctx(ctx: &Ctx, extra: u32) -> Ctx {
    Ctx::new()
        .with_precision(ctx.precision().saturating_add(extra))
        .with_bits_precision(ctx.bits_precision)
        .with_rounding_mode(RoundingMode::ToOdd)
}

/// Classifies an `exp` argument whose magnitude forces the
/// result out of any workable exponent range: `Some(true)`
/// overflows, `Some(false)` underflows toward zero.
fn exp_overwhelms<E: Encoding>(x: &E) -> Option<bool> {
    if !x.is_finite() || x.is_zero() {
        return None;
    }
    let adj = x.adjusted_exp();
    match adj.to_i64() {
        Some(a) if a > 32 => Some(!x.signbit()),
        Some(_) => None,
        None if adj.is_negative() => None,
        None => Some(!x.signbit()),
    }
}

/// Synthesizes the overflow or underflow that an unrepresentably
/// large or small positive result produces.
fn range_saturate<E: Encoding>(up: bool, ctx: &mut Ctx) -> E {
    if ctx.emin().is_none() || ctx.emax().is_none() {
        return invalid(ctx);
    }
    let exp = if up { i64::MAX / 4 } else { i64::MIN / 4 };
    round::apply(
        Raw::new(false, FastInt::ONE, FastInt::new(exp)),
        Some(Discard {
            lsd: 0,
            sticky: true,
        }),
        ctx,
    )
}

/// Floor division, `b` strictly positive.
fn floor_div(a: &FastInt, b: &FastInt) -> FastInt {
    debug_assert!(b.is_positive());
    let (q, r) = a.div_rem(b);
    if r.is_negative() {
        q.sub(&FastInt::ONE)
    } else {
        q
    }
}

/// Reports whether a finite value is an exact integer.
fn is_integer<E: Encoding>(y: &E) -> bool {
    if !y.is_finite() {
        return false;
    }
    if !y.exp().is_negative() {
        return true;
    }
    match y.exp().neg().to_u64() {
        Some(k) => {
            let (_, lsd, sticky) = E::shr_digits(y.coeff(), k);
            lsd == 0 && !sticky
        }
        None => y.coeff().is_zero(),
    }
}

/// Reports whether a finite value is an exact odd integer.
fn is_odd_integer<E: Encoding>(y: &E) -> bool {
    if !is_integer(y) {
        return false;
    }
    // The radix is even, so any positive exponent makes the
    // value even.
    if y.exp().is_positive() {
        return false;
    }
    if y.exp().is_zero() {
        return !y.coeff().is_even();
    }
    match y.exp().neg().to_u64() {
        Some(k) => {
            let (q, _, _) = E::shr_digits(y.coeff(), k);
            !q.is_even()
        }
        None => false,
    }
}

/// Returns the value of an exactly integral operand if it fits
/// a machine word.
fn integral_value<E: Encoding>(y: &E) -> Option<i64> {
    if !y.is_finite() {
        return None;
    }
    let e = y.exp().to_i64()?;
    let mag = if e >= 0 {
        if e > 63 && !y.coeff().is_zero() {
            return None;
        }
        E::mul_radix_pow(y.coeff(), e.unsigned_abs())?
    } else {
        let (q, lsd, sticky) = E::shr_digits(y.coeff(), e.unsigned_abs());
        if lsd != 0 || sticky {
            return None;
        }
        q
    };
    let v = mag.to_i64()?;
    if y.signbit() {
        v.checked_neg()
    } else {
        Some(v)
    }
}
