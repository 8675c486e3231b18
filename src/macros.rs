/// Implements the public arithmetic surface for an
/// [`Encoding`][crate::encoding::Encoding] type.
///
/// Every operation runs under the context's trap guard: a raised
/// condition that is in the trap mask aborts with an error, and
/// otherwise the flags simply accumulate.
macro_rules! arith_impl {
    ($ty:ident) => {
        impl $ty {
            /// The value `0`.
            pub const ZERO: Self = Self {
                neg: false,
                kind: crate::encoding::Special::Finite,
                coeff: crate::fint::FastInt::ZERO,
                exp: crate::fint::FastInt::ZERO,
            };

            /// The value `1`.
            pub const ONE: Self = Self {
                neg: false,
                kind: crate::encoding::Special::Finite,
                coeff: crate::fint::FastInt::ONE,
                exp: crate::fint::FastInt::ZERO,
            };

            /// Positive infinity.
            pub const INFINITY: Self = Self {
                neg: false,
                kind: crate::encoding::Special::Inf,
                coeff: crate::fint::FastInt::ZERO,
                exp: crate::fint::FastInt::ZERO,
            };

            /// Negative infinity.
            pub const NEG_INFINITY: Self = Self {
                neg: true,
                kind: crate::encoding::Special::Inf,
                coeff: crate::fint::FastInt::ZERO,
                exp: crate::fint::FastInt::ZERO,
            };

            /// A quiet NaN with an empty payload.
            pub const NAN: Self = Self {
                neg: false,
                kind: crate::encoding::Special::QNan,
                coeff: crate::fint::FastInt::ZERO,
                exp: crate::fint::FastInt::ZERO,
            };

            /// A signaling NaN with an empty payload.
            pub const SNAN: Self = Self {
                neg: false,
                kind: crate::encoding::Special::SNan,
                coeff: crate::fint::FastInt::ZERO,
                exp: crate::fint::FastInt::ZERO,
            };

            /// Creates the finite value `coeff * radix^exp`.
            ///
            /// The sign is taken from `coeff`; use
            /// [`with_sign`][crate::Encoding::with_sign] for
            /// a negative zero.
            pub fn new(coeff: i64, exp: i64) -> Self {
                <Self as crate::encoding::Encoding>::from_parts(
                    coeff < 0,
                    crate::fint::FastInt::new(coeff).abs(),
                    crate::fint::FastInt::new(exp),
                )
            }

            /// Returns the absolute value. Quiet: no conditions,
            /// no rounding.
            #[must_use = "this returns the result of the operation \
                              without modifying the original"]
            pub fn abs(&self) -> Self {
                crate::encoding::Encoding::with_sign(self, false)
            }

            /// Returns `self` with the sign of `rhs`. Quiet: no
            /// conditions, no rounding.
            #[must_use = "this returns the result of the operation \
                              without modifying the original"]
            pub fn copy_sign(&self, rhs: &Self) -> Self {
                crate::encoding::Encoding::with_sign(
                    self,
                    crate::encoding::Encoding::signbit(rhs),
                )
            }

            /// Computes `self + rhs`, rounded into `ctx`.
            pub fn add(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::add(self, rhs, ctx))
            }

            /// Computes `self - rhs`, rounded into `ctx`.
            pub fn sub(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::sub(self, rhs, ctx))
            }

            /// Computes `self * rhs`, rounded into `ctx`.
            pub fn mul(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::mul(self, rhs, ctx))
            }

            /// Computes `self / rhs`, rounded into `ctx`.
            ///
            /// At unlimited precision a non-terminating quotient
            /// raises
            /// [`INVALID_OPERATION`][crate::Condition::INVALID_OPERATION].
            pub fn div(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::div(self, rhs, ctx))
            }

            /// Computes `self / rhs` at exactly the exponent
            /// `exp`, or raises
            /// [`INVALID_OPERATION`][crate::Condition::INVALID_OPERATION]
            /// if the quotient needs more digits than the
            /// precision allows.
            pub fn div_to_exp(
                &self,
                rhs: &Self,
                exp: i64,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::div_to_exp(self, rhs, exp, ctx))
            }

            /// Computes the integer part of `self / rhs`,
            /// truncated toward zero.
            pub fn div_integer(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::div_integer(self, rhs, ctx))
            }

            /// Computes the remainder of `self / rhs`. The
            /// result keeps the sign of `self`.
            pub fn rem(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::rem(self, rhs, ctx))
            }

            /// Re-expresses `self` with exactly the exponent of
            /// `template`.
            pub fn quantize(
                &self,
                template: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::quantize(self, template, ctx))
            }

            /// Rounds `self` into `ctx`, then removes trailing
            /// zero digits.
            pub fn reduce(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::reduce(self, ctx))
            }

            /// Rounds `self` to the context's precision and
            /// exponent range.
            pub fn round(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::round_to_precision(self, ctx))
            }

            /// Compares numerically. Any NaN compares greater
            /// than every number; a signaling NaN operand raises
            /// [`INVALID_OPERATION`][crate::Condition::INVALID_OPERATION].
            pub fn compare(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<core::cmp::Ordering, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::cmp(self, rhs, ctx))
            }

            /// Compares with the total ordering, under which
            /// every pair of values, signed zeros and NaNs
            /// included, has a definite order. Quiet.
            pub fn cmp_total(&self, rhs: &Self) -> core::cmp::Ordering {
                crate::math::cmp_total(self, rhs)
            }

            /// Compares magnitudes with the total ordering.
            /// Quiet.
            pub fn cmp_total_mag(&self, rhs: &Self) -> core::cmp::Ordering {
                crate::math::cmp_total_mag(self, rhs)
            }

            /// Returns the smaller operand, breaking numeric
            /// ties with the total order. A quiet NaN loses to
            /// a number.
            pub fn min(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::min(self, rhs, ctx))
            }

            /// Returns the larger operand, breaking numeric
            /// ties with the total order. A quiet NaN loses to
            /// a number.
            pub fn max(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::max(self, rhs, ctx))
            }

            /// Returns the operand with the smaller magnitude.
            pub fn min_mag(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::min_mag(self, rhs, ctx))
            }

            /// Returns the operand with the larger magnitude.
            pub fn max_mag(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::max_mag(self, rhs, ctx))
            }

            /// Returns the closest representable value above
            /// `self`. Raises no conditions.
            pub fn next_plus(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_bounded(ctx)?;
                ctx.guard(|ctx| crate::math::next_plus(self, ctx))
            }

            /// Returns the closest representable value below
            /// `self`. Raises no conditions.
            pub fn next_minus(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_bounded(ctx)?;
                ctx.guard(|ctx| crate::math::next_minus(self, ctx))
            }

            /// Returns the closest representable value to `self`
            /// in the direction of `rhs`.
            pub fn next_toward(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_bounded(ctx)?;
                ctx.guard(|ctx| crate::math::next_toward(self, rhs, ctx))
            }

            /// Raises `self` to the integer power `n`.
            ///
            /// Works at unlimited precision when the result has
            /// a finite digit length.
            pub fn pow_int(
                &self,
                n: i64,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                ctx.guard(|ctx| crate::math::pow_int(self, n, ctx))
            }

            /// Computes `self` raised to `rhs`.
            ///
            /// An exactly integral `rhs` in machine range uses
            /// repeated squaring; any other exponent requires
            /// a bounded precision.
            pub fn pow(
                &self,
                rhs: &Self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_precision(ctx)?;
                ctx.guard(|ctx| crate::transc::pow(self, rhs, ctx))
            }

            /// Computes `e` raised to `self`. Requires a bounded
            /// precision.
            pub fn exp(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_precision(ctx)?;
                ctx.guard(|ctx| crate::transc::exp(self, ctx))
            }

            /// Computes the natural logarithm of `self`.
            /// Requires a bounded precision.
            pub fn ln(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_precision(ctx)?;
                ctx.guard(|ctx| crate::transc::ln(self, ctx))
            }

            /// Computes the square root of `self`. Requires
            /// a bounded precision.
            pub fn sqrt(
                &self,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_precision(ctx)?;
                ctx.guard(|ctx| crate::transc::sqrt(self, ctx))
            }

            /// Computes the `n`th root of `self`. Requires
            /// a bounded precision.
            ///
            /// Even roots of negative values raise
            /// [`INVALID_OPERATION`][crate::Condition::INVALID_OPERATION];
            /// odd roots keep the sign. A negative `n` takes the
            /// reciprocal of the positive root.
            pub fn root(
                &self,
                n: i64,
                ctx: &mut crate::ctx::Ctx,
            ) -> Result<Self, crate::ctx::Error> {
                Self::require_precision(ctx)?;
                ctx.guard(|ctx| crate::transc::root(self, n, ctx))
            }

            /// Computes pi to the context's precision. Requires
            /// a bounded precision.
            pub fn pi(ctx: &mut crate::ctx::Ctx) -> Result<Self, crate::ctx::Error> {
                Self::require_precision(ctx)?;
                ctx.guard(|ctx| crate::transc::pi(ctx))
            }

            fn require_precision(ctx: &crate::ctx::Ctx) -> Result<(), crate::ctx::Error> {
                if ctx.precision() == 0 {
                    return Err(crate::ctx::Error::unlimited_precision());
                }
                Ok(())
            }

            fn require_bounded(ctx: &crate::ctx::Ctx) -> Result<(), crate::ctx::Error> {
                if ctx.precision() == 0 || ctx.emin().is_none() || ctx.emax().is_none() {
                    return Err(crate::ctx::Error::invalid_argument(
                        "next-adjacent operations require a bounded precision and exponent range",
                    ));
                }
                Ok(())
            }
        }

        impl From<i64> for $ty {
            fn from(v: i64) -> Self {
                <Self as crate::encoding::Encoding>::value_of(v)
            }
        }

        impl From<i32> for $ty {
            fn from(v: i32) -> Self {
                <Self as crate::encoding::Encoding>::value_of(i64::from(v))
            }
        }

        impl From<u32> for $ty {
            fn from(v: u32) -> Self {
                <Self as crate::encoding::Encoding>::value_of(i64::from(v))
            }
        }

        impl core::ops::Neg for $ty {
            type Output = $ty;

            fn neg(self) -> $ty {
                let neg = !crate::encoding::Encoding::signbit(&self);
                crate::encoding::Encoding::with_sign(&self, neg)
            }
        }

        impl core::ops::Neg for &$ty {
            type Output = $ty;

            fn neg(self) -> $ty {
                let neg = !crate::encoding::Encoding::signbit(self);
                crate::encoding::Encoding::with_sign(self, neg)
            }
        }

        /// Exact addition: unlimited precision, no exponent
        /// range.
        impl core::ops::Add for &$ty {
            type Output = $ty;

            fn add(self, rhs: &$ty) -> $ty {
                let mut ctx = crate::ctx::Ctx::new();
                crate::math::add(self, rhs, &mut ctx)
            }
        }

        /// Exact subtraction: unlimited precision, no exponent
        /// range.
        impl core::ops::Sub for &$ty {
            type Output = $ty;

            fn sub(self, rhs: &$ty) -> $ty {
                let mut ctx = crate::ctx::Ctx::new();
                crate::math::sub(self, rhs, &mut ctx)
            }
        }

        /// Exact multiplication: unlimited precision, no
        /// exponent range.
        impl core::ops::Mul for &$ty {
            type Output = $ty;

            fn mul(self, rhs: &$ty) -> $ty {
                let mut ctx = crate::ctx::Ctx::new();
                crate::math::mul(self, rhs, &mut ctx)
            }
        }

        /// Equality and ordering follow the total ordering:
        /// numerically equal values at different exponents are
        /// not equal, and NaNs sort above infinities.
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.cmp_total(other) == core::cmp::Ordering::Equal
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
                Some(self.cmp_total(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> core::cmp::Ordering {
                self.cmp_total(other)
            }
        }
    };
}

pub(crate) use arith_impl;
