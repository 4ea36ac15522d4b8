//! Tokens as produced by the [lexer](crate::lexer)

use std::fmt;
use strum_macros::Display;

/// The lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    String,
    Number,
    Boolean,
    Keyword,
    Label,
    /// only used inside the scan loop, never part of the lexer output
    #[strum(serialize = "end of input")]
    EndOfInput,
}

/// 1-based line and column of a lexeme in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, col: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A single lexeme.
///
/// `text` is the raw source text: numbers keep their `0x` prefix, strings are stored without
/// the surrounding quotes but with their escape sequences untouched, booleans are lowercase.
/// Converting a token into a value happens at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub at: Location,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, at: Location) -> Self {
        Self {
            kind,
            text: text.into(),
            at,
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Number, text, Location::default())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(TokenKind::String, text, Location::default())
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(TokenKind::Boolean, value.to_string(), Location::default())
    }
}

/// renders the token the way it would appear in a program
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}
