//! The builtin environment: named functions and variables.
//!
//! Both registries are built once by [`Builtins::new`] and only read
//! afterwards; the evaluator borrows them. Lookup is by exact name.
//!
//! | Name                      | Kind     | Meaning                         |
//! |---------------------------|----------|---------------------------------|
//! | `+ - * /`                 | function | left fold, int or float         |
//! | `= !=`                    | function | two-argument (in)equality       |
//! | `nan inf+ inf-`           | variable | IEEE-754 special values         |
//! | `i8 i16 i32 i64 f32 f64`  | variable | current probe decoded as a type |

use memf_ir::{float_eq, Precision, ScalarKind};
use rustc_hash::FxHashMap;

use crate::probe::Probe;
use crate::value::Value;

/// Arithmetic operator of a fold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    /// Integer step. Overflow wraps; division truncates toward zero and
    /// fails on a zero divisor.
    fn int(self, acc: i64, rhs: i64) -> Option<i64> {
        match self {
            ArithOp::Add => Some(acc.wrapping_add(rhs)),
            ArithOp::Sub => Some(acc.wrapping_sub(rhs)),
            ArithOp::Mul => Some(acc.wrapping_mul(rhs)),
            ArithOp::Div if rhs == 0 => None,
            ArithOp::Div => Some(acc.wrapping_div(rhs)),
        }
    }

    fn float(self, acc: f64, rhs: f64) -> f64 {
        match self {
            ArithOp::Add => acc + rhs,
            ArithOp::Sub => acc - rhs,
            ArithOp::Mul => acc * rhs,
            ArithOp::Div => acc / rhs,
        }
    }
}

/// A builtin function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function {
    Arith(ArithOp),
    /// `=` when `negate` is false, `!=` when it is true.
    Equality { negate: bool },
}

impl Function {
    /// Apply to already-evaluated arguments.
    ///
    /// Any illegal argument makes the whole call illegal.
    pub fn apply(self, args: &[Value]) -> Value {
        if args.iter().any(Value::is_illegal) {
            return Value::Illegal;
        }
        match self {
            Function::Arith(op) => arith(op, args),
            Function::Equality { negate } => equality(args, negate),
        }
    }
}

/// A builtin variable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Variable {
    Constant(f64),
    /// The current probe decoded as this type.
    Probe(ScalarKind),
}

/// Name-keyed function and variable registries.
#[derive(Clone, Debug)]
pub struct Builtins {
    functions: FxHashMap<&'static str, Function>,
    variables: FxHashMap<&'static str, Variable>,
}

impl Builtins {
    pub fn new() -> Self {
        let mut functions = FxHashMap::default();
        functions.insert("+", Function::Arith(ArithOp::Add));
        functions.insert("-", Function::Arith(ArithOp::Sub));
        functions.insert("*", Function::Arith(ArithOp::Mul));
        functions.insert("/", Function::Arith(ArithOp::Div));
        functions.insert("=", Function::Equality { negate: false });
        functions.insert("!=", Function::Equality { negate: true });

        let mut variables = FxHashMap::default();
        variables.insert("nan", Variable::Constant(f64::NAN));
        variables.insert("inf+", Variable::Constant(f64::INFINITY));
        variables.insert("inf-", Variable::Constant(f64::NEG_INFINITY));
        for kind in ScalarKind::ALL {
            variables.insert(kind.name(), Variable::Probe(kind));
        }

        Builtins {
            functions,
            variables,
        }
    }

    pub fn function(&self, name: &str) -> Option<Function> {
        self.functions.get(name).copied()
    }

    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.variables.get(name).copied()
    }

    /// Dispatch a call by name. Unknown names are illegal.
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        match self.function(name) {
            Some(function) => function.apply(args),
            None => {
                tracing::trace!(function = name, "call to unknown function");
                Value::Illegal
            }
        }
    }

    /// Resolve a variable reference against `probe`. Unknown names and
    /// unreadable probes are illegal.
    pub fn resolve<P: Probe + ?Sized>(&self, name: &str, probe: &P) -> Value {
        match self.variable(name) {
            Some(Variable::Constant(value)) => Value::float(value),
            Some(Variable::Probe(kind)) => probe.read(kind).map_or(Value::Illegal, Value::from_scalar),
            None => {
                tracing::trace!(variable = name, "reference to unknown variable");
                Value::Illegal
            }
        }
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Arithmetic ────────────────────────────────────────────────

/// Left fold over `args`.
///
/// The result is a float as soon as one argument is a float, in which case
/// integer operands are converted before combining. Its precision is double
/// unless every float operand is single precision.
fn arith(op: ArithOp, args: &[Value]) -> Value {
    let mut float: Option<Precision> = None;
    for arg in args {
        match arg {
            Value::Int(_) => {}
            Value::Float { precision, .. } => {
                float = Some(match (float, precision) {
                    (Some(Precision::Double), _) | (_, Precision::Double) => Precision::Double,
                    _ => Precision::Single,
                });
            }
            _ => return Value::Illegal,
        }
    }
    match float {
        None => fold_int(op, args),
        Some(precision) => fold_float(op, args, precision),
    }
}

fn fold_int(op: ArithOp, args: &[Value]) -> Value {
    let mut operands = args.iter().filter_map(|arg| match arg {
        Value::Int(v) => Some(*v),
        _ => None,
    });
    let Some(first) = operands.next() else {
        return Value::Illegal;
    };
    operands
        .try_fold(first, |acc, rhs| op.int(acc, rhs))
        .map_or(Value::Illegal, Value::Int)
}

fn fold_float(op: ArithOp, args: &[Value], precision: Precision) -> Value {
    #[expect(
        clippy::cast_precision_loss,
        reason = "integer operands are promoted to the float result type"
    )]
    let mut operands = args.iter().filter_map(|arg| match arg {
        Value::Int(v) => Some(*v as f64),
        Value::Float { value, .. } => Some(*value),
        _ => None,
    });
    let Some(first) = operands.next() else {
        return Value::Illegal;
    };
    let value = operands.fold(first, |acc, rhs| op.float(acc, rhs));
    Value::Float { value, precision }
}

// ─── Equality ──────────────────────────────────────────────────

/// Exactly two arguments of the same type. Strings are not comparable.
///
/// `!=` is the complement of `=`, so the float tolerance applies to both.
fn equality(args: &[Value], negate: bool) -> Value {
    let [lhs, rhs] = args else {
        return Value::Illegal;
    };
    let equal = match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (
            Value::Float {
                value: a,
                precision: pa,
            },
            Value::Float {
                value: b,
                precision: pb,
            },
        ) => float_eq(*a, *b, pa.coarser(*pb)),
        _ => return Value::Illegal,
    };
    Value::Bool(equal != negate)
}
