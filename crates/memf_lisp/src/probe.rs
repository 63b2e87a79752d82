//! Access to the probe under evaluation.

use memf_ir::{Scalar, ScalarKind};

/// Source of the bytes the typed variables (`i8` .. `f64`) read.
pub trait Probe {
    /// Decode the probe as `kind`, or `None` if it cannot be read.
    fn read(&self, kind: ScalarKind) -> Option<Scalar>;
}

/// The bytes starting at the probe address.
impl Probe for [u8] {
    fn read(&self, kind: ScalarKind) -> Option<Scalar> {
        Scalar::decode(kind, self)
    }
}

/// No probe at all. Every typed variable evaluates to illegal.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoProbe;

impl Probe for NoProbe {
    fn read(&self, _kind: ScalarKind) -> Option<Scalar> {
        None
    }
}
