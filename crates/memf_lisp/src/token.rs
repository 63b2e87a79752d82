//! Tokens and the programs built from them.

use std::fmt;

/// One lexical unit of a predicate program.
///
/// Symbol and string tokens own their text; the text lives exactly as long
/// as the program holding the token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// `(`
    Open,
    /// `)`
    Close,
    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),
    /// A malformed token. Carries no payload.
    Illegal,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
            Token::Symbol(name) => f.write_str(name),
            Token::Str(text) => write!(f, "\"{text}\""),
            Token::Int(v) => write!(f, "{v}"),
            Token::Float(v) => write!(f, "{v:?}"),
            Token::Illegal => f.write_str("<illegal>"),
        }
    }
}

/// An ordered token sequence as produced by the tokenizer.
///
/// A `Program` has not been checked; call [`Program::validate`] to obtain
/// something the evaluator accepts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    tokens: Vec<Token>,
}

impl Program {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Program { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

/// A program that passed validation.
///
/// Only [`Program::validate`] constructs one, so holding a `ValidProgram`
/// proves the token stream is non-empty, balanced and free of illegal
/// tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidProgram {
    tokens: Vec<Token>,
}

impl ValidProgram {
    pub(crate) fn new_unchecked(tokens: Vec<Token>) -> Self {
        ValidProgram { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
