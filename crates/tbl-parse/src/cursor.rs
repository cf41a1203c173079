//! Byte cursor over processed table text.
//!
//! The cursor knows nothing about diagnostics or recovery; it only moves.
//! [`crate::Parser`] and [`crate::ExternalParser`] each own one.

use std::sync::Arc;

/// Space, tab or newline.
pub fn is_white(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n')
}

/// Space or tab.
pub fn is_gray(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t')
}

/// A forward-moving position in a shared byte buffer.
#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Arc<[u8]>,
    current: usize,
}

impl Cursor {
    /// Creates a cursor over a copy of `input`.
    pub fn new(input: &[u8]) -> Self {
        Self::with_arc(Arc::from(input))
    }

    /// Creates a cursor from an existing shared buffer.
    pub fn with_arc(buffer: Arc<[u8]>) -> Self {
        Self { buffer, current: 0 }
    }

    pub fn offset(&self) -> usize {
        self.current
    }

    /// Moves to `offset`, clamped to the end of the buffer.
    pub fn set_offset(&mut self, offset: usize) {
        self.current = offset.min(self.buffer.len());
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_eof(&self) -> bool {
        self.current >= self.buffer.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.buffer.get(self.current).copied()
    }

    /// Byte `n` positions ahead of the cursor.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.buffer.get(self.current + n).copied()
    }

    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.current += 1;
        Some(byte)
    }

    /// Advances by up to `n` bytes, returning how many were skipped.
    pub fn advance_by(&mut self, n: usize) -> usize {
        let step = n.min(self.buffer.len() - self.current);
        self.current += step;
        step
    }

    /// Unconsumed input.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer[self.current..]
    }

    /// Bytes between two absolute offsets.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        let end = end.min(self.buffer.len());
        &self.buffer[start.min(end)..end]
    }

    /// Consumes bytes while `predicate` holds.
    pub fn consume_while<F>(&mut self, mut predicate: F) -> &[u8]
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.current;
        while let Some(byte) = self.peek() {
            if !predicate(byte) {
                break;
            }
            self.current += 1;
        }
        &self.buffer[start..self.current]
    }

    pub fn skip_white(&mut self) {
        self.consume_while(is_white);
    }

    pub fn skip_gray(&mut self) {
        self.consume_while(is_gray);
    }

    /// Case-insensitive prefix test at the cursor.
    pub fn starts_with_ci(&self, literal: &str) -> bool {
        let literal = literal.as_bytes();
        let rest = self.remaining();
        rest.len() >= literal.len() && rest[..literal.len()].eq_ignore_ascii_case(literal)
    }

    /// Absolute offset of the first case-insensitive match at or after the
    /// cursor.
    pub fn find_ci(&self, literal: &str) -> Option<usize> {
        crate::text::stristr(self.remaining(), literal.as_bytes()).map(|i| self.current + i)
    }

    /// Absolute offset of the end of the current line: the next `\n`, one of
    /// `terminators`, or the end of input.
    pub fn line_end(&self, terminators: &[u8]) -> usize {
        self.remaining()
            .iter()
            .position(|&b| b == b'\n' || terminators.contains(&b))
            .map_or(self.buffer.len(), |i| self.current + i)
    }

    /// Moves to the end of the current line without consuming the newline.
    pub fn advance_to_eoln(&mut self, terminators: &[u8]) {
        self.current = self.line_end(terminators);
    }

    /// Moves to the next whitespace that is not inside double quotes.
    ///
    /// A newline always stops the scan, quoted or not.
    pub fn advance_to_next_white(&mut self) {
        let mut in_quotes = false;
        while let Some(byte) = self.peek() {
            if byte == b'"' {
                in_quotes = !in_quotes;
            } else if byte == b'\n' || (!in_quotes && is_gray(byte)) {
                break;
            }
            self.current += 1;
        }
    }

    /// Skips whitespace, then one run of non-whitespace.
    pub fn skip_token(&mut self) {
        self.skip_white();
        self.consume_while(|b| !is_white(b));
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.set_offset(checkpoint.current);
    }

    /// Back to the start of the buffer.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    current: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_white_and_gray() {
        let mut cursor = Cursor::new(b" \t\n x");
        cursor.skip_gray();
        assert_eq!(cursor.peek(), Some(b'\n'));
        cursor.skip_white();
        assert_eq!(cursor.peek(), Some(b'x'));
    }

    #[test]
    fn test_starts_with_ci() {
        let cursor = Cursor::new(b"$PROFILE name:");
        assert!(cursor.starts_with_ci("$Profile Name:"));
        assert!(!cursor.starts_with_ci("$Profile Name: extra"));
    }

    #[test]
    fn test_advance_to_eoln_stops_at_terminator() {
        let mut cursor = Cursor::new(b"abc,def\nxyz");
        cursor.advance_to_eoln(b",");
        assert_eq!(cursor.offset(), 3);
        cursor.advance();
        cursor.advance_to_eoln(&[]);
        assert_eq!(cursor.peek(), Some(b'\n'));
        cursor.advance();
        cursor.advance_to_eoln(&[]);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_advance_to_next_white_respects_quotes() {
        let mut cursor = Cursor::new(b"\"ita vero\" rest");
        cursor.advance_to_next_white();
        assert_eq!(cursor.remaining(), b" rest");
    }

    #[test]
    fn test_find_ci_is_absolute() {
        let mut cursor = Cursor::new(b"abc $End Notes: x");
        cursor.advance_by(2);
        assert_eq!(cursor.find_ci("$end notes:"), Some(4));
        assert_eq!(cursor.find_ci("missing"), None);
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut cursor = Cursor::new(b"one two");
        let mark = cursor.checkpoint();
        cursor.skip_token();
        assert_eq!(cursor.offset(), 3);
        cursor.restore(mark);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_advance_by_clamps() {
        let mut cursor = Cursor::new(b"ab");
        assert_eq!(cursor.advance_by(5), 2);
        assert!(cursor.is_eof());
        assert_eq!(cursor.advance(), None);
    }
}
