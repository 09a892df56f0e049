//! Line and column tracking.
//!
//! Offsets are character indices into the input. The tracker only learns
//! about newlines; columns are derived from the offset of the current line.

/// Current line and the offset at which it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// One-based line number.
    pub line: usize,
    /// Offset of the first character of `line`.
    pub line_start: usize,
}

/// A resolved, 1-based location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub position: usize,
}

impl Position {
    pub fn new() -> Self {
        Self {
            line: 1,
            line_start: 0,
        }
    }

    /// Record a newline; `next` is the offset just past it.
    pub fn newline(&mut self, next: usize) {
        self.line += 1;
        self.line_start = next;
    }

    /// Resolve an offset on the current line.
    pub fn locate(&self, offset: usize) -> Location {
        Location {
            line: self.line,
            column: offset.saturating_sub(self.line_start) + 1,
            position: offset + 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}
