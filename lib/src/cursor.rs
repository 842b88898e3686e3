/// Forward-only position in a sequence of output lines
///
/// The cursor is `Copy` so a position can be saved and restored when a probe fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Index of the next line to examine
    next: usize,
}

/// A line that satisfied some search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch<'a> {
    /// Index of the line in the output
    pub index: usize,
    pub line: &'a str,
}

impl Cursor {
    pub fn new() -> Cursor {
        Cursor::default()
    }

    /// Cursor positioned at a given line index
    pub fn at(next: usize) -> Cursor {
        Cursor { next }
    }

    pub fn position(&self) -> usize {
        self.next
    }

    /// Advance to the first line (at or after the cursor) satisfying the predicate, leaving the
    /// cursor just after it
    ///
    /// If no line matches, the cursor is left at the end of the lines.
    pub fn skip_to<'a, F>(&mut self, lines: &[&'a str], mut predicate: F) -> Option<LineMatch<'a>>
    where
        F: FnMut(&str) -> bool,
    {
        while let Some(line) = lines.get(self.next) {
            let index = self.next;
            self.next += 1;
            if predicate(line) {
                return Some(LineMatch { index, line });
            }
        }
        None
    }
}
