use crate::{
    encoding::{Encoding, Special},
    fint::FastInt,
    macros::arith_impl,
};

/// An arbitrary-precision radix-2 floating-point number,
/// `(-1)^sign * coefficient * 2^exponent`.
///
/// Same engine and semantics as [`Dec`][crate::Dec] with the
/// positional base changed: digits are bits, so precision counts
/// bits, half the radix is one, and a quotient terminates only
/// when the reduced divisor is a power of two.
#[derive(Clone, Debug)]
pub struct Bin {
    neg: bool,
    kind: Special,
    coeff: FastInt,
    exp: FastInt,
}

arith_impl!(Bin);

impl Encoding for Bin {
    const RADIX: u32 = 2;

    fn signbit(&self) -> bool {
        self.neg
    }

    fn coeff(&self) -> &FastInt {
        &self.coeff
    }

    fn exp(&self) -> &FastInt {
        &self.exp
    }

    fn special(&self) -> Special {
        self.kind
    }

    fn from_parts(neg: bool, coeff: FastInt, exp: FastInt) -> Self {
        debug_assert!(!coeff.is_negative());
        Self {
            neg,
            kind: Special::Finite,
            coeff,
            exp,
        }
    }

    fn special_from_parts(neg: bool, kind: Special, payload: FastInt) -> Self {
        debug_assert!(!matches!(kind, Special::Finite));
        Self {
            neg,
            kind,
            coeff: payload,
            exp: FastInt::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Condition, Ctx, RoundingMode};

    use super::*;

    fn ctx(prec: u32) -> Ctx {
        Ctx::new().with_precision(prec)
    }

    fn parts(x: &Bin) -> (bool, i64, i64) {
        (
            x.signbit(),
            x.coeff().to_i64().unwrap(),
            Encoding::exp(x).to_i64().unwrap(),
        )
    }

    #[test]
    fn test_binary_rounding_is_half_even_in_bits() {
        // 0b11011 to three bits: 110|11 -> sticky past half,
        // round up to 0b111.
        let mut c = ctx(3);
        let r = Bin::new(0b11011, 0).round(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 0b111, 2));
        assert!(c.flags().contains(Condition::INEXACT));

        // 0b1101 to three bits: tie, last kept bit even: stay.
        let mut c = ctx(3);
        let r = Bin::new(0b1101, 0).round(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 0b110, 1));
    }

    #[test]
    fn test_terminating_quotients_differ_from_decimal() {
        // 1/10 never terminates in binary.
        let mut c = Ctx::new();
        let q = Bin::new(1, 0).div(&Bin::new(10, 0), &mut c).unwrap();
        assert!(q.is_nan());
        assert!(c.flags().contains(Condition::INVALID_OPERATION));

        // 3/4 does: 0b11 * 2^-2.
        let mut c = Ctx::new();
        let q = Bin::new(3, 0).div(&Bin::new(4, 0), &mut c).unwrap();
        assert_eq!(parts(&q), (false, 0b11, -2));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_ieee_like_double_context() {
        // 1/3 in a binary64-shaped context.
        let mut c = ctx(53).with_exponent_range(-1022, 1023);
        let q = Bin::new(1, 0).div(&Bin::new(3, 0), &mut c).unwrap();
        // 2^54 / 3 rounds to 6004799503160661, exponent -54.
        assert_eq!(parts(&q), (false, 6_004_799_503_160_661, -54));
        assert!(c.flags().contains(Condition::INEXACT));
    }

    #[test]
    fn test_gradual_underflow() {
        let mut c = ctx(4).with_exponent_range(-8, 8);
        // etiny = -11; 1 * 2^-13 is below every subnormal.
        let r = Bin::new(1, -13).round(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 0, -11));
        assert!(c.flags().contains(Condition::UNDERFLOW | Condition::CLAMPED));

        let mut c = ctx(4).with_exponent_range(-8, 8);
        let r = Bin::new(1, -11).round(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 1, -11));
        assert_eq!(c.flags(), Condition::SUBNORMAL);
    }

    #[test]
    fn test_combined_mode_rounds_to_odd_in_binary() {
        let mut c = ctx(3).with_rounding_mode(RoundingMode::OddZeroFiveAway);
        // 0b1001 to three bits discards a set bit; the kept
        // 0b100 is even, so it bumps to 0b101.
        let r = Bin::new(0b1001, 0).round(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 0b101, 1));

        let mut c = ctx(3).with_rounding_mode(RoundingMode::OddZeroFiveAway);
        let r = Bin::new(0b1011, 0).round(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 0b101, 1));
    }

    #[test]
    fn test_bits_precision_matches_digits_for_radix_two() {
        let mut plain = ctx(5);
        let mut bits = ctx(5).with_bits_precision(true);
        let a = Bin::new(0b110111, 0);
        let r1 = a.round(&mut plain).unwrap();
        let r2 = a.round(&mut bits).unwrap();
        assert_eq!(parts(&r1), parts(&r2));
    }

    #[test]
    fn test_sqrt_binary() {
        // sqrt(2) to 8 bits: 1.0110101 * 2^0.
        let mut c = ctx(8);
        let r = Bin::new(2, 0).sqrt(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 0b1011_0101, -7));
        assert!(c.flags().contains(Condition::INEXACT));

        // sqrt(4) is exact.
        let mut c = ctx(8);
        let r = Bin::new(4, 0).sqrt(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 2, 0));
        assert_eq!(c.flags(), Condition::empty());
    }

    #[test]
    fn test_exp_binary() {
        // e * 2^8 = 695.88..., so e to 10 bits is 696 * 2^-8.
        let mut c = ctx(10);
        let r = Bin::new(1, 0).exp(&mut c).unwrap();
        assert_eq!(parts(&r), (false, 696, -8));
        assert!(c.flags().contains(Condition::INEXACT));
    }

    #[test]
    fn test_quantize_binary() {
        let mut c = ctx(10);
        // 5/4 at scale 2^-1: 1.25 -> 1.5 under half-even? No:
        // 0b101 * 2^-2 to exponent -1 keeps 0b10 with a bare
        // half discarded; the kept bit is even, so 0b10 * 2^-1.
        let r = Bin::new(0b101, -2)
            .quantize(&Bin::new(1, -1), &mut c)
            .unwrap();
        assert_eq!(parts(&r), (false, 0b10, -1));
        assert!(c.flags().contains(Condition::INEXACT));
    }
}
