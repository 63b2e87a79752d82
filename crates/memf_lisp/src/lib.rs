//! Memf Lisp - the predicate language of memf.
//!
//! A predicate is a tiny s-expression program such as `(= i32 1337)`. It is
//! prepared once, before any memory is touched, and then evaluated once per
//! probe address.
//!
//! # Pipeline
//!
//! ```text
//! source → tokenize → Program → validate → ValidProgram → Evaluator → Value
//! ```
//!
//! - [`tokenize`]: single eager pass, never fails; malformed numbers become
//!   [`Token::Illegal`].
//! - [`Program::validate`]: rejects empty programs, illegal tokens and
//!   unbalanced parentheses. Only a [`ValidProgram`] can be evaluated.
//! - [`Evaluator`]: recursive descent over the token stream using the
//!   [`Builtins`] registry. Failures are [`Value::Illegal`], not errors.
//!
//! Typed variables (`i8` .. `f64`) read the current probe through the
//! [`Probe`] trait.

mod builtins;
mod eval;
mod probe;
mod stack;
mod token;
mod tokenizer;
mod validate;
mod value;

pub use builtins::{ArithOp, Builtins, Function, Variable};
pub use eval::{Evaluator, MAX_ARGS};
pub use probe::{NoProbe, Probe};
pub use token::{Program, Token, ValidProgram};
pub use tokenizer::tokenize;
pub use validate::SyntaxError;
pub use value::Value;

/// Tokenize and validate `source` in one step.
pub fn compile(source: &str) -> Result<ValidProgram, SyntaxError> {
    tokenize(source).validate()
}
