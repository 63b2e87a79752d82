//! Fixed-value comparison of decoded probes.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use memf_ir::{float_eq, Precision, Scalar};

/// The six relational operators accepted by `--func`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Lt,
        CompareOp::Gt,
        CompareOp::Le,
        CompareOp::Ge,
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }

    /// Does `ordering` (probe relative to reference) satisfy the operator?
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Ne => ordering.is_ne(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Le => ordering.is_le(),
            CompareOp::Ge => ordering.is_ge(),
        }
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        CompareOp::ALL
            .into_iter()
            .find(|op| op.symbol() == text)
            .ok_or_else(|| format!("unknown comparison operator {text:?}"))
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `probe <op> reference` for probes of the reference's kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Comparison {
    pub op: CompareOp,
    pub reference: Scalar,
}

impl Comparison {
    pub fn new(op: CompareOp, reference: Scalar) -> Self {
        Comparison { op, reference }
    }

    /// A probe of a different kind never matches.
    pub fn matches(&self, probe: Scalar) -> bool {
        compare(self.op, probe, self.reference)
    }
}

/// `probe <op> reference`, by the rules of the probe's kind.
///
/// Integers compare exactly. For floats, `=` and `!=` use the epsilon
/// rule of the probe's precision and the orderings use the sign of
/// `probe - reference`, so NaN satisfies only `!=`.
pub(crate) fn compare(op: CompareOp, probe: Scalar, reference: Scalar) -> bool {
    if probe.kind() != reference.kind() {
        return false;
    }
    if let (Some(a), Some(b)) = (probe.as_i64(), reference.as_i64()) {
        return op.accepts(a.cmp(&b));
    }
    let (Some(a), Some(b)) = (probe.as_f64(), reference.as_f64()) else {
        return false;
    };
    let precision = match probe {
        Scalar::F32(_) => Precision::Single,
        _ => Precision::Double,
    };
    match op {
        CompareOp::Eq => float_eq(a, b, precision),
        CompareOp::Ne => !float_eq(a, b, precision),
        // NaN orders against nothing.
        _ => (a - b)
            .partial_cmp(&0.0)
            .is_some_and(|ordering| op.accepts(ordering)),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
