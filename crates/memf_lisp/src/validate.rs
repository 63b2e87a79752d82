//! Syntax validation of token streams.

use crate::token::{Program, Token, ValidProgram};

/// Why a program was rejected before evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("empty program")]
    Empty,
    #[error("illegal token at position {index}")]
    IllegalToken { index: usize },
    #[error("unbalanced parentheses")]
    UnbalancedScope,
}

/// Check a token stream.
///
/// Failures are reported in priority order: an empty stream first, then the
/// first illegal token, then any scope imbalance (a `)` with no matching
/// `(` or a `(` left open at the end).
pub fn check(tokens: &[Token]) -> Result<(), SyntaxError> {
    if tokens.is_empty() {
        return Err(SyntaxError::Empty);
    }
    let mut depth = 0_usize;
    let mut underflow = false;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Illegal => return Err(SyntaxError::IllegalToken { index }),
            Token::Open => depth += 1,
            Token::Close => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => underflow = true,
            },
            _ => {}
        }
    }
    if underflow || depth != 0 {
        return Err(SyntaxError::UnbalancedScope);
    }
    Ok(())
}

impl Program {
    /// Validate this program, handing its tokens over to a [`ValidProgram`].
    pub fn validate(self) -> Result<ValidProgram, SyntaxError> {
        check(self.tokens())?;
        Ok(ValidProgram::new_unchecked(self.into_tokens()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
