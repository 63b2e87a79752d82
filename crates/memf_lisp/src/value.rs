//! Evaluation results.

use memf_ir::{Precision, Scalar};
use std::fmt;

/// The outcome of evaluating an expression, also used for arguments and
/// variable values.
///
/// [`Value::Illegal`] marks a failed sub-evaluation. It is an ordinary
/// value: it flows back to the enclosing call, whose dispatch rejects it.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float { value: f64, precision: Precision },
    Str(Box<str>),
    Illegal,
}

impl Value {
    /// A double-precision float.
    pub const fn float(value: f64) -> Value {
        Value::Float {
            value,
            precision: Precision::Double,
        }
    }

    pub fn from_scalar(scalar: Scalar) -> Value {
        match scalar {
            Scalar::F32(v) => Value::Float {
                value: f64::from(v),
                precision: Precision::Single,
            },
            Scalar::F64(v) => Value::float(v),
            int => int.as_i64().map_or(Value::Illegal, Value::Int),
        }
    }

    pub const fn is_illegal(&self) -> bool {
        matches!(self, Value::Illegal)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float { .. } => "float",
            Value::Str(_) => "string",
            Value::Illegal => "illegal",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float { value, .. } => write!(f, "{value:?}"),
            Value::Str(text) => write!(f, "\"{text}\""),
            Value::Illegal => f.write_str("<illegal>"),
        }
    }
}
