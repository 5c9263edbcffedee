use super::span::CodePosition;
use std::iter::Peekable;
use std::str::CharIndices;

/// Character stream over source text with line/column tracking.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    char_iterator: Peekable<CharIndices<'src>>,
    position: CodePosition,
}

impl<'src> Cursor<'src> {
    /// Creates a character stream for the source string.
    pub fn new(source: &'src str) -> Self {
        Cursor {
            char_iterator: source.char_indices().peekable(),
            position: CodePosition::new(1, 1),
        }
    }

    /// Position of the cursor.
    pub fn get_position(&self) -> CodePosition {
        self.position
    }

    /// Peeks the next character without consuming it.
    pub fn peek(&mut self) -> Option<(usize, char)> {
        self.char_iterator.peek().copied()
    }

    /// Peeks the next to next character without consuming it.
    pub fn peek_next(&mut self) -> Option<(usize, char)> {
        let mut temp_cursor = self.clone();
        temp_cursor.take();
        temp_cursor.peek()
    }

    /// Consumes the next character.
    pub fn take(&mut self) -> Option<(usize, char)> {
        let (byte_idx, ch) = self.char_iterator.next()?;

        if ch == '\n' {
            self.position.line_no += 1;
            self.position.column_no = 1;
        } else {
            self.position.column_no += 1;
        }

        Some((byte_idx, ch))
    }

    /// Consumes the next character if it equals target char.
    pub fn take_if(&mut self, target: char) -> bool {
        match self.peek() {
            None => false,
            Some((_, ch)) if ch != target => false,
            _ => {
                self.take();
                true
            }
        }
    }

    /// Consumes next characters as long as they meet condition.
    /// At the end, the next character fails condition.
    pub fn take_while<F>(&mut self, condition: F)
    where
        F: Fn(char) -> bool,
    {
        loop {
            match self.peek() {
                Some((_, ch)) if condition(ch) => {
                    self.take();
                }
                _ => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::more_asserts::*;

    #[test]
    fn test_position_tracking() {
        let mut cursor = Cursor::new("ab\nc");
        let start = cursor.get_position();

        cursor.take();
        cursor.take();
        assert_gt!(cursor.get_position(), start);

        // Newline resets the column and bumps the line.
        cursor.take();
        assert_eq!(cursor.get_position(), CodePosition::new(2, 1));
    }

    #[test]
    fn test_take_while() {
        let mut cursor = Cursor::new("123abc");
        cursor.take_while(|ch| ch.is_ascii_digit());
        assert_eq!(cursor.peek(), Some((3, 'a')));
    }
}
