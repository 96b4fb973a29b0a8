//! Source location tracking for error reporting and debug info.
//!
//! Provides [`Span`] to track where syntax nodes and errors occur in source code.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// The code generator uses `line` and `col` for `dbg` instructions, so both
/// are kept as the parser reported them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Position of the last byte covered by this span.
    ///
    /// Used to point debug info at a closing `]` or the end of a body.
    #[inline]
    pub fn end(&self) -> Span {
        Span::point(self.line, self.col + self.len.saturating_sub(1))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());

        let empty = Span::point(1, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn span_display() {
        let span = Span::new(3, 15, 5);
        assert_eq!(format!("{}", span), "3:15");
    }

    #[test]
    fn span_end_points_at_last_byte() {
        let span = Span::new(2, 4, 3);
        assert_eq!(span.end(), Span::point(2, 6));

        // Zero-length spans stay put
        assert_eq!(Span::point(7, 9).end(), Span::point(7, 9));
    }
}
