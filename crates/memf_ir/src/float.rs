//! Epsilon-tolerant float equality.

/// Native precision of a floating-point operand.
///
/// Values read from an `f32` probe are [`Precision::Single`]; literals,
/// constants and `f64` probes are [`Precision::Double`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    /// Machine epsilon of this precision, widened to `f64`.
    pub const fn epsilon(self) -> f64 {
        match self {
            Precision::Single => f32::EPSILON as f64,
            Precision::Double => f64::EPSILON,
        }
    }

    /// The coarser of two precisions.
    ///
    /// Comparing a single-precision value with a double-precision one
    /// can only be as exact as the single-precision side.
    #[must_use]
    pub const fn coarser(self, other: Precision) -> Precision {
        match (self, other) {
            (Precision::Double, Precision::Double) => Precision::Double,
            _ => Precision::Single,
        }
    }
}

/// Two floats are equal when their absolute difference is below the
/// machine epsilon of `precision`.
///
/// Identical values (including matching infinities) are always equal. NaN
/// is never equal to anything.
pub fn float_eq(a: f64, b: f64, precision: Precision) -> bool {
    #[expect(
        clippy::float_cmp,
        reason = "exact match short-circuits infinities, whose difference is NaN"
    )]
    let identical = a == b;
    identical || (a - b).abs() < precision.epsilon()
}
