//! Positional cursor over expression text.
//!
//! The parser drives the scanner directly instead of pre-tokenizing, since
//! which tokens exist depends on [`ParserConfig`](crate::ParserConfig) and
//! on grammatical position.  Every `try_*` method leaves the cursor where
//! it was when it does not match; [`Scanner::mark`] / [`Scanner::reset`]
//! give callers multi-token backtracking.
//!
//! Positions are byte offsets internally; errors report character offsets.

use crate::error::ParseError;
use crate::value::Value;

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    /// Start at byte offset `pos` (used by the substitution layer).
    pub fn at(src: &'a str, pos: usize) -> Self {
        Scanner { src, pos }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    pub fn byte_pos(&self) -> usize {
        self.pos
    }

    /// Character offset of the cursor, for error reporting.
    pub fn char_pos(&self) -> usize {
        self.char_offset(self.pos)
    }

    pub fn char_offset(&self, byte: usize) -> usize {
        self.src[..byte].chars().count()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    pub fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    pub fn try_char(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Match `lit` exactly.  A word-like literal (ending in an identifier
    /// character) must not be followed by another identifier character, so
    /// `or` does not match the start of `order`.
    pub fn try_literal(&mut self, lit: &str) -> bool {
        if !self.rest().starts_with(lit) {
            return false;
        }
        let word_like = lit.chars().last().is_some_and(is_ident_continue);
        if word_like {
            if let Some(next) = self.rest()[lit.len()..].chars().next() {
                if is_ident_continue(next) {
                    return false;
                }
            }
        }
        self.pos += lit.len();
        true
    }

    /// Whether `lit` would match here, without consuming it.
    pub fn looking_at(&mut self, lit: &str) -> bool {
        let mark = self.mark();
        let found = self.try_literal(lit);
        self.reset(mark);
        found
    }

    pub fn try_identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        self.advance();
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        Some(&self.src[start..self.pos])
    }

    /// Match a numeric literal: optional sign, digits, optional `.digits`,
    /// optional exponent.  A fraction or exponent makes it a float.
    ///
    /// Returns `Ok(None)` when no number starts here.
    pub fn try_number(&mut self) -> Result<Option<Value>, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            if !self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                return Ok(None);
            }
            self.advance();
        }
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos = start;
            return Ok(None);
        }
        self.skip_digits();

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.skip_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let text = &self.src[start..self.pos];
        let malformed = || ParseError::MalformedNumber {
            text: text.to_owned(),
            pos: self.char_offset(start),
        };
        if is_float {
            text.parse::<f64>().map(|x| Some(Value::Float(x))).map_err(|_| malformed())
        } else {
            text.parse::<i64>().map(|n| Some(Value::Int(n))).map_err(|_| malformed())
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Match a single- or double-quoted string.  A backslash takes the next
    /// character literally; there are no named escapes.
    pub fn try_string(&mut self) -> Result<Option<String>, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Ok(None),
        };
        let start = self.pos;
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::UnterminatedString {
                        pos: self.char_offset(start),
                    })
                }
                Some('\\') => match self.advance() {
                    Some(c) => s.push(c),
                    None => {
                        return Err(ParseError::UnterminatedString {
                            pos: self.char_offset(start),
                        })
                    }
                },
                Some(c) if c == quote => return Ok(Some(s)),
                Some(c) => s.push(c),
            }
        }
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `s` would scan as exactly one identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
