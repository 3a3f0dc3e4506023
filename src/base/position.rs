//! Position tracking for syntax nodes and symbols
//!
//! Stores the source location (line/column) of grammar elements for
//! diagnostics, symbol spans, and the caret-position feature surface.

use text_size::{TextRange, TextSize};

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A span representing a range in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }
}

/// Maps byte offsets to line/column positions.
///
/// Built once per text; line starts are byte offsets of the first
/// character after each newline.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new("")
    }
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset into a line/column position.
    ///
    /// Columns are byte columns within the line; offsets past the end
    /// clamp to the last line.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = u32::from(offset);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let column = (offset - self.line_starts[line]) as usize;
        Position::new(line, column)
    }

    /// Convert a byte range into a span.
    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }

    /// Byte offset of a line/column position, clamped to the text shape.
    pub fn offset(&self, position: Position) -> TextSize {
        let line = position.line.min(self.line_starts.len() - 1);
        TextSize::new(self.line_starts[line] + position.column as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let span = Span::from_coords(1, 4, 3, 2);
        assert!(span.contains(Position::new(2, 0)));
        assert!(span.contains(Position::new(1, 4)));
        assert!(span.contains(Position::new(3, 2)));
        assert!(!span.contains(Position::new(1, 3)));
        assert!(!span.contains(Position::new(3, 3)));
        assert!(!span.contains(Position::new(0, 10)));
    }

    #[test]
    fn test_line_index_positions() {
        let index = LineIndex::new("grammar T;\nr: 'a';\n");
        assert_eq!(index.position(TextSize::new(0)), Position::new(0, 0));
        assert_eq!(index.position(TextSize::new(8)), Position::new(0, 8));
        assert_eq!(index.position(TextSize::new(11)), Position::new(1, 0));
        assert_eq!(index.position(TextSize::new(14)), Position::new(1, 3));
    }

    #[test]
    fn test_line_index_roundtrip() {
        let index = LineIndex::new("a\nbb\nccc");
        let pos = Position::new(2, 1);
        assert_eq!(index.position(index.offset(pos)), pos);
    }
}
