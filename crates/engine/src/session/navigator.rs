/// Bounds-checked cursor over the question catalog.
///
/// Movement is clamped, never wrapping: stepping past either end is a no-op,
/// and `jump_to` ignores out-of-range targets. The navigator only tracks
/// position; it never gates answer writes to other questions, which is what
/// makes a "jump to flagged question" flow possible.
#[derive(Debug, Clone)]
pub struct Navigator {
    cursor: usize,
    len: usize,
}

impl Navigator {
    /// `len` is the catalog length; catalogs are never empty.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { cursor: 0, len }
    }

    /// Restores a persisted cursor, clamping it into range.
    #[must_use]
    pub fn resume(len: usize, cursor: usize) -> Self {
        Self {
            cursor: cursor.min(len.saturating_sub(1)),
            len,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves forward one question. Returns false (and stays put) at the end.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.len {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one question. Returns false (and stays put) at the start.
    pub fn prev(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to an absolute position. Out-of-range targets are ignored.
    pub fn jump_to(&mut self, position: usize) -> bool {
        if position < self.len {
            self.cursor = position;
            true
        } else {
            false
        }
    }
}
