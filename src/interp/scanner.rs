use super::cursor::Cursor;
use super::errors::{InterpretResult, InterpreterError};
use super::span::{CodePosition, Span};
use super::token::{SpannedToken, Token};

fn is_digit_char(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Turns source text into a sequential token stream, one token per call.
/// Scanning advances an internal cursor and is not restartable; replaying a
/// token range is done by buffering tokens, not by rewinding the scanner.
pub struct Scanner<'src> {
    source: &'src str,
    cursor: Cursor<'src>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Scanner {
            source,
            cursor: Cursor::new(source),
        }
    }

    /// Returns the next token, or None at end of input. Malformed input is a
    /// distinct error, never a silent end of stream.
    pub fn next_token(&mut self) -> InterpretResult<Option<SpannedToken>> {
        self.skip_whitespace_and_comments()?;

        let start_pos = self.cursor.get_position();

        let (byte_idx, ch) = match self.cursor.take() {
            Some(t) => t,
            None => return Ok(None),
        };

        let token = match ch {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ';' => Token::Semicolon,
            '=' => Token::Equals,
            '.' => Token::Dot,
            ',' => Token::Comma,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            ':' => Token::Colon,

            '\'' => self.scan_string(start_pos)?,

            _ if is_digit_char(ch) => self.scan_number(byte_idx),

            _ if is_word_char(ch) => self.scan_identifier_or_bool(byte_idx),

            _ => return Err(InterpreterError::UnrecognizedChar(ch, start_pos)),
        };

        let span = Span::new(start_pos, self.cursor.get_position());
        Ok(Some(SpannedToken::new(token, span)))
    }

    /// Consumes whitespace and `/* ... */` block comments before a token.
    /// Comments do not nest.
    fn skip_whitespace_and_comments(&mut self) -> InterpretResult<()> {
        loop {
            self.cursor.take_while(|ch| ch.is_ascii_whitespace());

            match (self.cursor.peek(), self.cursor.peek_next()) {
                (Some((_, '/')), Some((_, '*'))) => {
                    let start_pos = self.cursor.get_position();
                    self.cursor.take();
                    self.cursor.take();
                    self.consume_comment_body(start_pos)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn consume_comment_body(&mut self, start_pos: CodePosition) -> InterpretResult<()> {
        loop {
            match self.cursor.take() {
                None => return Err(InterpreterError::UnterminatedComment(start_pos)),
                Some((_, '*')) => {
                    if self.cursor.take_if('/') {
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Scans a single-quoted string. A doubled quote (`''`) inside the
    /// literal decodes to one literal quote character.
    fn scan_string(&mut self, start_pos: CodePosition) -> InterpretResult<Token> {
        let mut decoded = String::new();

        loop {
            match self.cursor.take() {
                None => return Err(InterpreterError::UnterminatedString(start_pos)),
                Some((_, '\'')) => {
                    if self.cursor.take_if('\'') {
                        decoded.push('\'');
                    } else {
                        return Ok(Token::String(decoded));
                    }
                }
                Some((_, ch)) => decoded.push(ch),
            }
        }
    }

    /// Scans an unsigned integer literal.
    fn scan_number(&mut self, start_idx: usize) -> Token {
        self.cursor.take_while(is_digit_char);

        let end_idx = match self.cursor.peek() {
            None => self.source.len(),
            Some((i, _)) => i,
        };

        // Only digit chars in the slice, so this cannot fail.
        let value: f64 = self.source[start_idx..end_idx].parse().unwrap_or(0.0);
        Token::Number(value)
    }

    /// Scans a word and returns it as an identifier, checking the boolean
    /// literal keywords first.
    fn scan_identifier_or_bool(&mut self, start_idx: usize) -> Token {
        self.cursor.take_while(is_word_char);

        let end_idx = match self.cursor.peek() {
            None => self.source.len(),
            Some((i, _)) => i,
        };

        match &self.source[start_idx..end_idx] {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            word => Token::Identifier(word.to_owned()),
        }
    }
}
