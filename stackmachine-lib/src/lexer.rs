//! Turns program text into [Token]s.
//!
//! The token shapes live in `lexer.pest`. The scan loop skips trivia, looks at the next
//! character to decide which token rule applies, and runs that rule anchored at the current
//! offset. A rule that doesn't match is reported with the error for that token class.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::core::{Location, Token, TokenKind};

#[derive(Parser)]
#[grammar = "lexer.pest"]
struct TokenParser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("{at}: unterminated string literal")]
    UnterminatedString { at: Location },

    #[error("{at}: malformed number")]
    MalformedNumber { at: Location },

    #[error("{at}: `#` must be followed by a label name")]
    InvalidLabel { at: Location },

    #[error("{at}: unrecognized character {found:?}")]
    UnrecognizedCharacter { found: char, at: Location },
}

pub type LexResult<T> = Result<T, LexError>;

/// tokenizes the whole input, or fails at the first bad lexeme
pub fn tokenize(src: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(src);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::EndOfInput {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

struct Lexer<'a> {
    src: &'a str,
    offset: usize,
    loc: Location,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            loc: Location::default(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    /// runs `rule` at the current offset without consuming anything
    fn scan(&self, rule: Rule) -> Option<Pair<'a, Rule>> {
        TokenParser::parse(rule, self.rest())
            .ok()
            .and_then(|mut pairs| pairs.next())
    }

    fn advance(&mut self, len: usize) {
        for c in self.src[self.offset..self.offset + len].chars() {
            if c == '\n' {
                self.loc.line += 1;
                self.loc.col = 1;
            } else {
                self.loc.col += 1;
            }
        }
        self.offset += len;
    }

    fn skip_trivia(&mut self) {
        let len = self.scan(Rule::trivia).map_or(0, |p| p.as_str().len());
        self.advance(len);
    }

    fn next_token(&mut self) -> LexResult<Token> {
        self.skip_trivia();
        let at = self.loc;
        let Some(first) = self.rest().chars().next() else {
            return Ok(Token::new(TokenKind::EndOfInput, "", at));
        };

        let (kind, text, len) = match first {
            '"' => {
                let pair = self
                    .scan(Rule::string)
                    .ok_or(LexError::UnterminatedString { at })?;
                let len = pair.as_str().len();
                let body = pair.into_inner().next().map_or("", |p| p.as_str());
                (TokenKind::String, body.to_owned(), len)
            }
            '#' => {
                let pair = self.scan(Rule::label).ok_or(LexError::InvalidLabel { at })?;
                (TokenKind::Label, pair.as_str().to_owned(), pair.as_str().len())
            }
            c if c.is_ascii_digit() => {
                let pair = self
                    .scan(Rule::number)
                    .ok_or(LexError::MalformedNumber { at })?;
                (TokenKind::Number, pair.as_str().to_owned(), pair.as_str().len())
            }
            c if c.is_ascii_alphabetic() => {
                let word = self
                    .scan(Rule::identifier)
                    .map(|p| p.as_str())
                    .unwrap_or_default();
                if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
                    (TokenKind::Boolean, word.to_ascii_lowercase(), word.len())
                } else {
                    (TokenKind::Keyword, word.to_owned(), word.len())
                }
            }
            found => return Err(LexError::UnrecognizedCharacter { found, at }),
        };

        self.advance(len);
        Ok(Token::new(kind, text, at))
    }
}

/// Resolves the escape sequences of a string token's text: `\\`, `\"`, a backslash before a
/// newline, and `\z` which swallows the whitespace after it. Any other backslash is kept.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(escaped @ ('\\' | '"' | '\n')) => {
                chars.next();
                out.push(escaped);
            }
            Some('z') => {
                chars.next();
                while chars
                    .next_if(|c| matches!(*c, ' ' | '\t' | '\n' | '\r' | '\u{0C}'))
                    .is_some()
                {}
            }
            _ => out.push('\\'),
        }
    }
    out
}
