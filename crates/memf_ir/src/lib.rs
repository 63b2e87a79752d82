//! Memf IR - scalar vocabulary shared across the memf crates.
//!
//! A probe is always decoded as one of six scalar types. This crate owns
//! those types, the typed values they decode to, and the single
//! floating-point equality rule that both the expression language and the
//! fixed comparator follow.
//!
//! # Encoding
//!
//! Probe bytes come straight out of another process on the same machine,
//! so decoding is native-endian. The persisted form of a value is a 64-bit
//! pattern: integers sign-extended to `i64`, floats widened to `f64`.

mod float;
mod scalar;

pub use float::{float_eq, Precision};
pub use scalar::{ParseScalarError, Scalar, ScalarKind};
