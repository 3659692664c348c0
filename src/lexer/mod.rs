//! Lexer for the C subset.
//!
//! Transforms the source buffer into a token sequence terminated by an EOF
//! sentinel, so the parser never has to check for the end of input. At each
//! step the scanner tries, in order: whitespace, comments, reserved words
//! and multi-byte punctuators, string literals, single-byte punctuators,
//! identifiers, integer literals. Anything else is a lexical error.

mod token;

pub use token::*;

use std::{error::Error, fmt::Display};

use once_cell::sync::Lazy;

use crate::diagnostics::Diagnostic;

static KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "return", "if", "else", "while", "for", "sizeof", "int", "char",
    ]
});

static PUNCTUATORS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["==", "!=", "<=", ">="]);

/// Upper bound on the decoded length of a string literal.
pub const MAX_STRING_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError(Diagnostic);

pub type LexResult<T> = Result<T, LexError>;

impl LexError {
    fn at(offset: usize, message: impl ToString) -> Self {
        Self(Diagnostic::new(offset, message))
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Error for LexError {}

pub struct Lexer<'a> {
    input: &'a [u8],
    position: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            position: 0,
            tokens: vec![],
        }
    }

    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        while let Some(&byte) = self.input.get(self.position) {
            if byte.is_ascii_whitespace() {
                self.position += 1;
            } else if self.starts_with("//") {
                self.skip_line_comment();
            } else if self.starts_with("/*") {
                self.skip_block_comment()?;
            } else if let Some(word) = self.starts_with_reserved() {
                self.push_punct(word);
            } else if byte == b'"' {
                self.lex_string_literal()?;
            } else if byte.is_ascii_punctuation() {
                let value = (byte as char).to_string();
                self.push_punct(&value);
            } else if is_ident_start(byte) {
                self.lex_ident();
            } else if byte.is_ascii_digit() {
                self.lex_num()?;
            } else {
                return Err(LexError::at(self.position, "invalid token"));
            }
        }

        self.tokens.push(Token::Eof {
            span: Span::new(self.position, 0),
        });
        Ok(self.tokens)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.position..].starts_with(prefix.as_bytes())
    }

    /// Longest keyword whose following byte does not continue an
    /// identifier; failing that, the longest multi-byte punctuator.
    fn starts_with_reserved(&self) -> Option<&'static str> {
        for keyword in KEYWORDS.iter() {
            let boundary = self.position + keyword.len();
            if self.starts_with(keyword) && !self.input.get(boundary).copied().is_some_and(is_ident_continue) {
                return Some(keyword);
            }
        }

        PUNCTUATORS.iter().copied().find(|op| self.starts_with(op))
    }

    fn push_punct(&mut self, value: &str) {
        self.tokens.push(Token::Punct {
            value: value.to_string(),
            span: Span::new(self.position, value.len()),
        });
        self.position += value.len();
    }

    fn skip_line_comment(&mut self) {
        while let Some(&byte) = self.input.get(self.position) {
            self.position += 1;
            if byte == b'\n' {
                return;
            }
        }
    }

    fn skip_block_comment(&mut self) -> LexResult<()> {
        let start = self.position;
        self.position += 2;

        while self.position < self.input.len() {
            if self.starts_with("*/") {
                self.position += 2;
                return Ok(());
            }
            self.position += 1;
        }

        Err(LexError::at(start, "unterminated block comment"))
    }

    fn lex_string_literal(&mut self) -> LexResult<()> {
        let start = self.position;
        let mut buf = vec![];
        self.position += 1;

        loop {
            if buf.len() == MAX_STRING_LEN {
                return Err(LexError::at(start, "string literal too large"));
            }
            let Some(&byte) = self.input.get(self.position) else {
                return Err(LexError::at(start, "unclosed string literal"));
            };

            match byte {
                b'"' => {
                    self.position += 1;
                    break;
                }
                b'\\' => {
                    let Some(&escaped) = self.input.get(self.position + 1) else {
                        return Err(LexError::at(start, "unclosed string literal"));
                    };
                    buf.push(get_escape_char(escaped));
                    self.position += 2;
                }
                _ => {
                    buf.push(byte);
                    self.position += 1;
                }
            }
        }

        buf.push(0);
        self.tokens.push(Token::Str {
            value: buf,
            span: Span::new(start, self.position - start),
        });
        Ok(())
    }

    fn lex_ident(&mut self) {
        let start = self.position;
        while self.input.get(self.position).copied().is_some_and(is_ident_continue) {
            self.position += 1;
        }

        let value = String::from_utf8_lossy(&self.input[start..self.position]).into_owned();
        self.tokens.push(Token::Ident {
            value,
            span: Span::new(start, self.position - start),
        });
    }

    fn lex_num(&mut self) -> LexResult<()> {
        let start = self.position;
        while self.input.get(self.position).copied().is_some_and(|byte| byte.is_ascii_digit()) {
            self.position += 1;
        }

        let digits = String::from_utf8_lossy(&self.input[start..self.position]);
        let value = digits
            .parse::<i64>()
            .map_err(|_| LexError::at(start, "integer literal too large"))?;

        self.tokens.push(Token::Num {
            value,
            span: Span::new(start, self.position - start),
        });
        Ok(())
    }
}

/// Debug rendering of a token stream as a chain of kind names.
pub fn format_token_stream(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::kind_name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_continue(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

fn get_escape_char(byte: u8) -> u8 {
    match byte {
        b'a' => 0x07,
        b'b' => 0x08,
        b't' => b'\t',
        b'n' => b'\n',
        b'v' => 0x0b,
        b'f' => 0x0c,
        b'r' => b'\r',
        b'e' => 0x1b,
        b'0' => 0,
        _ => byte,
    }
}
