//! `apfp` is a pure Rust implementation of arbitrary-precision
//! decimal and binary floating point arithmetic with the
//! correctly-rounded semantics of the General Decimal Arithmetic
//! specification.
//!
//! Numbers are stored as signed coefficient/exponent pairs of
//! unbounded magnitude. Every operation takes a [`Ctx`] fixing
//! the precision, rounding mode, exponent range, and trap mask,
//! and records the exceptional conditions it raises into that
//! context.
//!
//! The same engine drives both encodings: [`Dec`] (radix 10) and
//! [`Bin`] (radix 2) implement the [`Encoding`] accessor
//! contract, and the rounding kernel and arithmetic are generic
//! over it.
//!
//! String parsing and formatting are out of scope; values are
//! built from coefficient/exponent parts.

#![deny(clippy::cast_lossless)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::cast_sign_loss)]
#![deny(clippy::expect_used)]
#![deny(clippy::implicit_saturating_sub)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::wildcard_imports)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(unused_lifetimes)]
#![deny(unused_qualifications)]

mod bin;
mod ctx;
mod dec;
mod encoding;
mod fint;
mod macros;
mod math;
mod round;
mod transc;

pub use bin::Bin;
pub use ctx::{Condition, Ctx, Error, RoundingMode};
pub use dec::Dec;
pub use encoding::{Encoding, Special};
pub use fint::FastInt;

/// Simplifies importing common items.
pub mod prelude {
    pub use super::{Bin, Condition, Ctx, Dec, RoundingMode};
}
