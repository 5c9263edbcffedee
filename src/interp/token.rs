use super::span::Span;

use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Single-character punctuation.
    LeftParen,
    RightParen,
    Semicolon,
    Equals,
    Dot,
    Comma,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,

    // Literals. Boolean keywords are checked before generic identifiers.
    Boolean(bool),
    Number(f64),
    Identifier(String),
    String(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

impl SpannedToken {
    pub fn new(token: Token, span: Span) -> Self {
        SpannedToken { token, span }
    }

    pub fn split(self) -> (Token, Span) {
        (self.token, self.span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::LeftParen => write!(f, "`(`"),
            Token::RightParen => write!(f, "`)`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Equals => write!(f, "`=`"),
            Token::Dot => write!(f, "`.`"),
            Token::Comma => write!(f, "`,`"),
            Token::LeftBrace => write!(f, "`{{`"),
            Token::RightBrace => write!(f, "`}}`"),
            Token::LeftBracket => write!(f, "`[`"),
            Token::RightBracket => write!(f, "`]`"),
            Token::Colon => write!(f, "`:`"),
            Token::Boolean(b) => write!(f, "boolean `{}`", b),
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::Identifier(name) => write!(f, "identifier `{}`", name),
            Token::String(s) => write!(f, "string '{}'", s),
        }
    }
}
