//! Hand-written single-pass tokenizer.
//!
//! Dispatch is on the first byte of each token. Every delimiter the grammar
//! cares about is ASCII, so token boundaries always fall on UTF-8 character
//! boundaries and symbol/string text can be sliced straight out of the
//! source.
//!
//! Tokenizing never fails. A malformed number becomes [`Token::Illegal`],
//! and the scanner still consumes it up to the next delimiter so that the
//! tokens after it line up with the source.

use crate::token::{Program, Token};

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Program {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token() {
        tokens.push(token);
    }
    Program::from_tokens(tokens)
}

#[inline]
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Bytes that end a symbol or number.
#[inline]
fn is_delimiter(byte: u8) -> bool {
    is_whitespace(byte) || byte == b'(' || byte == b')'
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner { source, pos: 0 }
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.source.as_bytes().get(pos).copied()
    }

    #[inline]
    fn current(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    /// Produce the next token, or `None` at end of input.
    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let token = match self.current()? {
            b'(' => {
                self.pos += 1;
                Token::Open
            }
            b')' => {
                self.pos += 1;
                Token::Close
            }
            b'"' => self.string(),
            b'0'..=b'9' => self.number(),
            b'+' | b'-' if self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit()) => {
                self.number()
            }
            _ => self.symbol(),
        };
        Some(token)
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat_until_delimiter(&mut self) {
        while self.current().is_some_and(|b| !is_delimiter(b)) {
            self.pos += 1;
        }
    }

    // ─── Strings ───────────────────────────────────────────────

    /// Verbatim text up to the next `"` or end of input. No escapes.
    fn string(&mut self) -> Token {
        self.pos += 1; // opening quote
        let start = self.pos;
        let rest = &self.source[start..];
        let (text, consumed) = match rest.find('"') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Token::Str(text.to_string())
    }

    // ─── Symbols ───────────────────────────────────────────────

    fn symbol(&mut self) -> Token {
        let start = self.pos;
        self.eat_until_delimiter();
        Token::Symbol(self.source[start..self.pos].to_string())
    }

    // ─── Numbers ───────────────────────────────────────────────

    /// `[+-]? (0b | 0x | 0)? digits (. digits)?`
    ///
    /// The base prefix selects the digit set. A `.` is allowed once and only
    /// in base 10; anything outside the digit set marks the token illegal
    /// but is still consumed.
    fn number(&mut self) -> Token {
        let negative = match self.current() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        let radix = self.radix_prefix();
        let digits_start = self.pos;
        let mut legal = true;
        let mut seen_dot = false;
        while let Some(byte) = self.current() {
            if is_delimiter(byte) {
                break;
            }
            if byte == b'.' {
                if radix != 10 || seen_dot {
                    legal = false;
                }
                seen_dot = true;
            } else if !char::from(byte).is_digit(radix) {
                legal = false;
            }
            self.pos += 1;
        }
        let digits = &self.source[digits_start..self.pos];
        if !legal || digits.is_empty() {
            return Token::Illegal;
        }
        if seen_dot {
            return match digits.parse::<f64>() {
                Ok(magnitude) if negative => Token::Float(-magnitude),
                Ok(magnitude) => Token::Float(magnitude),
                Err(_) => Token::Illegal,
            };
        }
        let Ok(magnitude) = u64::from_str_radix(digits, radix) else {
            return Token::Illegal;
        };
        let value = if negative {
            -i128::from(magnitude)
        } else {
            i128::from(magnitude)
        };
        i64::try_from(value).map_or(Token::Illegal, Token::Int)
    }

    /// Consume a base prefix and return the radix it selects.
    ///
    /// A lone leading `0` selects octal but stays part of the digits, unless
    /// a `.` follows it, in which case the number is decimal.
    fn radix_prefix(&mut self) -> u32 {
        if self.current() != Some(b'0') {
            return 10;
        }
        match self.byte_at(self.pos + 1) {
            Some(b'b' | b'B') => {
                self.pos += 2;
                2
            }
            Some(b'x' | b'X') => {
                self.pos += 2;
                16
            }
            Some(b'.') => 10,
            _ => 8,
        }
    }
}
