//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It transforms a byte slice (`&[u8]`) into a sequence of [`Token`]s, skipping
//! whitespace and comments, and emitting exactly one `EOF` token at the end.
//! Implemented as a `FusedIterator`, so it chains safely with other adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a [u8]) -> Scanner<'a>`
//! - `impl Iterator for Scanner<'a>` yielding `Result<Token, LoxError>`
//! - `Scanner::scan_tokens(sink)` collects every token, routing lexical
//!   errors into an [`ErrorSink`]; the returned list always ends in `EOF`.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=`.
//! - String literals: `"` … `"`, multi‑line allowed, unterminated is an error.
//! - Numeric literals: integer part with optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ runs, keywords via a perfect‑hash map.
//! - `//` comments are skipped with `memchr` up to the next newline.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let source = b"print 123; // example";
//! for result in Scanner::new(source) {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{ErrorSink, LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

/// Reserved words, resolved with a compile‑time perfect hash.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"break"  => TokenType::BREAK,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Streaming lexer over a source buffer.  Tokens own their lexemes, so
/// they outlive the buffer.
pub struct Scanner<'a> {
    src: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// One past the last byte examined.
    curr: usize,
    line: usize,
    /// Set once the `EOF` token has been handed out.
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            finished: false,
        }
    }

    /// Drain the scanner, reporting lexical errors to `sink`.  The returned
    /// list is always terminated by the `EOF` token.
    pub fn scan_tokens(self, sink: &mut dyn ErrorSink) -> Vec<Token> {
        let tokens: Vec<Token> = self
            .filter_map(|result| result.map_err(|e| sink.report(e)).ok())
            .collect();

        info!("Scanned {} tokens", tokens.len());

        tokens
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Consume one byte.  Callers check [`Self::is_at_end`] first.
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Byte `offset` positions ahead, `0` past the end.
    #[inline(always)]
    fn look(&self, offset: usize) -> u8 {
        self.src.get(self.curr + offset).copied().unwrap_or(0)
    }

    /// `double` if the next byte is `=` (consuming it), `single` otherwise.
    #[inline(always)]
    fn with_equals(&mut self, double: TokenType, single: TokenType) -> TokenType {
        if self.look(0) == b'=' {
            self.curr += 1;
            double
        } else {
            single
        }
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.src[self.start..self.curr]).into_owned()
    }

    /// Scan from `self.start`.  `Ok(None)` means whitespace or a comment.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind: TokenType = match self.advance() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,
            b'!' => self.with_equals(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equals(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equals(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equals(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.look(0) == b'/' => {
                // Stop before the newline; the main loop counts lines.
                self.curr = memchr(b'\n', &self.src[self.curr..])
                    .map_or(self.src.len(), |pos| self.curr + pos);
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            other => {
                // One error per character, not per UTF-8 byte.
                if other >= 0x80 {
                    while !self.is_at_end() && self.look(0) & 0xC0 == 0x80 {
                        self.curr += 1;
                    }
                }

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", self.lexeme()),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// Body of a string literal; the opening quote is already consumed.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.look(0) != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.curr += 1;

        let contents = &self.src[self.start + 1..self.curr - 1];
        let contents = std::str::from_utf8(contents)
            .map_err(|_| LoxError::lex(self.line, "Invalid UTF-8 in string literal."))?;

        Ok(TokenType::STRING(contents.to_owned()))
    }

    /// `123` or `3.14`; a trailing `.` is left for the next token.
    fn number(&mut self) -> TokenType {
        let digits = |scanner: &mut Self| {
            while scanner.look(0).is_ascii_digit() {
                scanner.curr += 1;
            }
        };

        digits(self);

        if self.look(0) == b'.' && self.look(1).is_ascii_digit() {
            self.curr += 1;
            digits(self);
        }

        // ASCII digits with at most one dot always parse.
        TokenType::NUMBER(self.lexeme().parse().unwrap_or(0.0))
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.look(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.curr += 1;
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.curr;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    debug!("Scanned {:?} on line {}", kind, self.line);
                    return Some(Ok(Token::new(kind, self.lexeme(), self.line)));
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        self.finished = true;

        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
