use crate::{
    encoding::{Encoding, Special},
    fint::FastInt,
    macros::arith_impl,
};

/// An arbitrary-precision radix-10 floating-point number,
/// `(-1)^sign * coefficient * 10^exponent`.
///
/// Values are plain data: all arithmetic goes through a
/// [`Ctx`][crate::Ctx], which fixes the precision and rounding
/// and accumulates condition flags. Construction through
/// [`new`][Self::new] or [`Encoding::from_parts`] never rounds
/// and never validates range.
#[derive(Clone, Debug)]
pub struct Dec {
    neg: bool,
    kind: Special,
    coeff: FastInt,
    exp: FastInt,
}

arith_impl!(Dec);

impl Encoding for Dec {
    const RADIX: u32 = 10;

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
