//! Immutable read position over raw text.
//!
//! [`Cursor`] is `Copy`; every movement returns a new cursor, so a saved copy is a complete
//! backtracking mark. The lexer drives one of these, and the character-level parsers in
//! [`crate::analyzer::text`] take one by value.

use crate::source::{SourceLocation, SourceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    input: &'a str,
    byte: usize,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            byte: 0,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Unread remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.byte..]
    }

    pub fn byte_offset(&self) -> usize {
        self.byte
    }

    /// Offset in characters from the start of the input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    pub fn is_at_end(&self) -> bool {
        self.byte >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Moves past one character. At the end of input the cursor is returned unchanged.
    pub fn advance(self) -> Self {
        match self.peek() {
            Some(c) => self.step(c),
            None => self,
        }
    }

    pub fn advance_by(self, count: usize) -> Self {
        (0..count).fold(self, |cursor, _| cursor.advance())
    }

    /// Moves past `len` bytes, as reported by a reader that consumed a prefix of [`Self::rest`].
    pub fn advance_bytes(self, len: usize) -> Self {
        let target = (self.byte + len).min(self.input.len());
        let mut cursor = self;
        while cursor.byte < target {
            cursor = cursor.advance();
        }
        cursor
    }

    pub fn advance_while(self, predicate: impl Fn(char) -> bool) -> Self {
        let mut cursor = self;
        while let Some(c) = cursor.peek() {
            if !predicate(c) {
                break;
            }
            cursor = cursor.step(c);
        }
        cursor
    }

    pub fn skip_whitespace(self) -> Self {
        self.advance_while(char::is_whitespace)
    }

    /// Text between an earlier cursor and this one.
    pub fn slice_from(&self, start: &Cursor<'a>) -> &'a str {
        &self.input[start.byte.min(self.byte)..self.byte]
    }

    /// Character-offset range between an earlier cursor and this one.
    pub fn range_from(&self, start: &Cursor<'a>) -> SourceRange {
        SourceRange::new(start.offset, self.offset)
    }

    fn step(self, c: char) -> Self {
        let mut next = self;
        next.byte += c.len_utf8();
        next.offset += 1;
        // a CR ends a line unless it is the first half of CRLF
        let ends_line = c == '\n' || (c == '\r' && next.peek() != Some('\n'));
        if ends_line {
            next.line += 1;
            next.column = 1;
        } else {
            next.column += 1;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines() {
        let cursor = Cursor::new("ab\ncd");
        let cursor = cursor.advance_by(3);
        assert_eq!(cursor.peek(), Some('c'));
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn test_crlf_counts_once() {
        let cursor = Cursor::new("a\r\nb\rc").advance_by(4);
        assert_eq!(cursor.peek(), Some('\r'));
        assert_eq!(cursor.line(), 2);
        let cursor = cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (3, 1));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let start = Cursor::new("hello world");
        let moved = start.advance_while(|c| c.is_alphabetic());
        assert_eq!(start.offset(), 0);
        assert_eq!(moved.slice_from(&start), "hello");
        assert_eq!(moved.range_from(&start), SourceRange::new(0, 5));
        assert_eq!(moved.skip_whitespace().rest(), "world");
    }

    #[test]
    fn test_multibyte_offsets() {
        let cursor = Cursor::new("é1").advance();
        assert_eq!(cursor.byte_offset(), 2);
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.advance_bytes(1).rest(), "");
    }

    #[test]
    fn test_advance_at_end_is_noop() {
        let end = Cursor::new("").advance();
        assert!(end.is_at_end());
        assert_eq!(end.peek(), None);
    }
}
