//! Recursive-descent evaluator over a validated token stream.
//!
//! # Grammar
//!
//! ```text
//! expr ::= '(' symbol expr* ')' | integer | float | string | symbol
//! ```
//!
//! Inside a scope the leading symbol names a function; anywhere else a
//! symbol is a variable reference. Arguments are evaluated left to right
//! and handed to [`Builtins::call`] when the scope closes.
//!
//! # Illegal values
//!
//! Nothing here returns an error. A call that cannot be made (unknown name,
//! more than [`MAX_ARGS`] arguments, a non-symbol in function position)
//! evaluates to [`Value::Illegal`], and the remainder of its scope is
//! skipped so the cursor stays in step with the token stream.

use smallvec::SmallVec;

use crate::builtins::Builtins;
use crate::probe::Probe;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, ValidProgram};
use crate::value::Value;

/// Maximum number of arguments a single call accepts.
pub const MAX_ARGS: usize = 8;

/// Evaluates validated programs against a builtin environment.
///
/// The evaluator itself holds no cursor; every [`Evaluator::evaluate`] call
/// walks the program with a fresh one, so a single program can be evaluated
/// once per probe without any state leaking between probes.
#[derive(Copy, Clone, Debug)]
pub struct Evaluator<'b> {
    builtins: &'b Builtins,
}

impl<'b> Evaluator<'b> {
    pub fn new(builtins: &'b Builtins) -> Self {
        Evaluator { builtins }
    }

    /// Evaluate the first top-level expression of `program`.
    ///
    /// Tokens after that expression are not evaluated.
    pub fn evaluate<P: Probe + ?Sized>(&self, program: &ValidProgram, probe: &P) -> Value {
        let mut walk = Walk {
            tokens: program.tokens(),
            pos: 0,
            builtins: self.builtins,
            probe,
        };
        walk.expr()
    }
}

/// One evaluation's cursor over the token stream.
struct Walk<'a, P: ?Sized> {
    tokens: &'a [Token],
    pos: usize,
    builtins: &'a Builtins,
    probe: &'a P,
}

impl<'a, P: Probe + ?Sized> Walk<'a, P> {
    #[inline]
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    #[inline]
    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn expr(&mut self) -> Value {
        let Some(token) = self.bump() else {
            return Value::Illegal;
        };
        match token {
            Token::Open => ensure_sufficient_stack(|| self.call()),
            Token::Int(v) => Value::Int(*v),
            Token::Float(v) => Value::float(*v),
            Token::Str(text) => Value::Str(text.as_str().into()),
            Token::Symbol(name) => self.builtins.resolve(name, self.probe),
            Token::Close | Token::Illegal => Value::Illegal,
        }
    }

    /// Evaluate a call whose `(` has just been consumed.
    fn call(&mut self) -> Value {
        let name = match self.peek() {
            Some(Token::Symbol(name)) => {
                self.pos += 1;
                name
            }
            _ => {
                self.skip_scope();
                return Value::Illegal;
            }
        };
        let mut args: SmallVec<[Value; MAX_ARGS]> = SmallVec::new();
        loop {
            match self.peek() {
                None => return Value::Illegal,
                Some(Token::Close) => {
                    self.pos += 1;
                    break;
                }
                Some(_) if args.len() == MAX_ARGS => {
                    tracing::trace!(function = name.as_str(), "too many arguments");
                    self.skip_scope();
                    return Value::Illegal;
                }
                Some(_) => {
                    let arg = self.expr();
                    args.push(arg);
                }
            }
        }
        self.builtins.call(name, &args)
    }

    /// Consume tokens up to and including the `)` closing the current scope.
    fn skip_scope(&mut self) {
        let mut depth = 1_usize;
        while let Some(token) = self.bump() {
            match token {
                Token::Open => depth += 1,
                Token::Close => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
