//! Secondary cursor set.
//!
//! The primary cursor is `EditorState::cursor_x/cursor_y`; secondaries live
//! here. After any edit every cursor must land in buffer bounds, and after
//! dedup no two cursors share a position; the exception: when
//! `allow_primary_overlap` is set (cursor dropped in place, waiting for the
//! next movement to separate it) at most one secondary may sit on the
//! primary.

use crate::EditorState;
use core_text::Buffer;

/// One secondary cursor, chars coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CursorPos {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug)]
pub struct CursorSet {
    secondaries: Vec<CursorPos>,
    /// When true, movement applied to the primary is mirrored onto every
    /// secondary; dropped cursors freeze in place until re-linked.
    pub follow_primary: bool,
    pub allow_primary_overlap: bool,
}

impl Default for CursorSet {
    fn default() -> Self {
        Self {
            secondaries: Vec::new(),
            follow_primary: true,
            allow_primary_overlap: false,
        }
    }
}

impl CursorSet {
    pub fn count(&self) -> usize {
        self.secondaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secondaries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CursorPos> {
        self.secondaries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CursorPos> {
        self.secondaries.iter_mut()
    }

    pub fn positions(&self) -> &[CursorPos] {
        &self.secondaries
    }

    pub fn clear(&mut self) {
        self.secondaries.clear();
    }

    /// Add a secondary unless one (or the primary) already sits there.
    pub fn add(&mut self, primary: (usize, usize), line: usize, column: usize) -> bool {
        if primary == (line, column) {
            return false;
        }
        if self.at_position(line, column) {
            return false;
        }
        self.secondaries.push(CursorPos { line, column });
        true
    }

    /// Add at the given position even if it equals the primary (manual
    /// cursor drop). Duplicate secondaries are still refused.
    pub fn add_allow_primary(&mut self, line: usize, column: usize) -> bool {
        if self.at_position(line, column) {
            return false;
        }
        self.secondaries.push(CursorPos { line, column });
        true
    }

    pub fn at_position(&self, line: usize, column: usize) -> bool {
        self.secondaries
            .iter()
            .any(|c| c.line == line && c.column == column)
    }

    /// All cursors (primary first in the unsorted sense) ordered by
    /// document position; `reverse` yields end-of-file first, the order
    /// edits are applied in so earlier positions stay valid.
    pub fn collect_all(&self, primary: (usize, usize), reverse: bool) -> Vec<CursorPos> {
        let mut all = Vec::with_capacity(1 + self.secondaries.len());
        all.push(CursorPos {
            line: primary.0,
            column: primary.1,
        });
        all.extend_from_slice(&self.secondaries);
        all.sort();
        if reverse {
            all.reverse();
        }
        all
    }

    /// Drop secondaries that collide with the primary (keeping one when
    /// overlap is allowed), then sort and collapse adjacent duplicates.
    pub fn remove_duplicates(&mut self, primary: (usize, usize)) {
        let mut kept_overlap = false;
        let allow = self.allow_primary_overlap;
        self.secondaries.retain(|c| {
            if (c.line, c.column) == primary {
                if allow && !kept_overlap {
                    kept_overlap = true;
                    true
                } else {
                    false
                }
            } else {
                true
            }
        });
        self.secondaries.sort();
        self.secondaries.dedup();
    }

    // --- positional adjustment after single-point edits -----------------

    /// A byte was inserted at `(line, col)`: same-line cursors at or past
    /// it shift right.
    pub fn adjust_after_insert(&mut self, line: usize, col: usize) {
        for c in &mut self.secondaries {
            if c.line == line && c.column >= col {
                c.column += 1;
            }
        }
    }

    /// A byte was deleted at `(line, col)`: same-line cursors past it
    /// shift left.
    pub fn adjust_after_delete(&mut self, line: usize, col: usize) {
        for c in &mut self.secondaries {
            if c.line == line && c.column > col {
                c.column -= 1;
            }
        }
    }

    /// A newline was spliced at `(line, col)`.
    pub fn adjust_after_newline(&mut self, line: usize, col: usize) {
        for c in &mut self.secondaries {
            if c.line > line {
                c.line += 1;
            } else if c.line == line && c.column >= col {
                c.line += 1;
                c.column -= col;
            }
        }
    }

    /// Row `line` merged into `line - 1` at `merge_col`.
    pub fn adjust_after_line_merge(&mut self, line: usize, merge_col: usize) {
        for c in &mut self.secondaries {
            if c.line == line {
                c.line -= 1;
                c.column += merge_col;
            } else if c.line > line {
                c.line -= 1;
            }
        }
    }
}

impl EditorState {
    /// Add a secondary one line above the primary, column clamped.
    pub fn add_cursor_above(&mut self) {
        if self.cursor_y == 0 {
            return;
        }
        let line = self.cursor_y - 1;
        let column = self.cursor_x.min(self.buffer.row_len(line));
        if self
            .cursors
            .add((self.cursor_y, self.cursor_x), line, column)
        {
            let total = self.cursors.count() + 1;
            self.set_status(format!("Added cursor at line {} (total: {total})", line + 1));
        }
        self.cursors.follow_primary = true;
        self.cursors.allow_primary_overlap = false;
    }

    /// Add a secondary one line below the primary, column clamped.
    pub fn add_cursor_below(&mut self) {
        if self.buffer.row_count() == 0 || self.cursor_y + 1 >= self.buffer.row_count() {
            return;
        }
        let line = self.cursor_y + 1;
        let column = self.cursor_x.min(self.buffer.row_len(line));
        if self
            .cursors
            .add((self.cursor_y, self.cursor_x), line, column)
        {
            let total = self.cursors.count() + 1;
            self.set_status(format!("Added cursor at line {} (total: {total})", line + 1));
        }
        self.cursors.follow_primary = true;
        self.cursors.allow_primary_overlap = false;
    }

    /// Drop a secondary at the primary position. The set freezes in place
    /// and the overlap survives until the next movement re-links it.
    pub fn add_cursor_at_primary(&mut self) {
        if !self.cursors.add_allow_primary(self.cursor_y, self.cursor_x) {
            self.set_status("Cursor already placed here");
            return;
        }
        let total = self.cursors.count() + 1;
        self.set_status(format!(
            "Placed cursor at line {} (total: {total})",
            self.cursor_y + 1
        ));
        self.cursors.follow_primary = false;
        self.cursors.allow_primary_overlap = true;
    }

    /// Drop a cursor at the primary and advance the primary one line down.
    pub fn add_cursor_at_primary_and_advance(&mut self) {
        self.add_cursor_at_primary();
        if self.cursor_y + 1 < self.buffer.row_count() {
            self.cursor_y += 1;
            let len = self.buffer.row_len(self.cursor_y);
            if self.cursor_x > len {
                self.cursor_x = len;
            }
        }
        self.dedup_cursors();
        let total = self.cursors.count() + 1;
        self.set_status(format!(
            "Placed and moved to line {} (total: {total})",
            self.cursor_y + 1
        ));
        self.cursors.follow_primary = true;
        self.cursors.allow_primary_overlap = false;
    }

    /// Clear all secondaries, reporting how many were dropped.
    pub fn clear_cursors(&mut self) {
        let cleared = self.cursors.count();
        if cleared > 0 {
            self.cursors.clear();
            self.set_status(format!("Cleared {cleared} secondary cursor(s)"));
        }
    }

    pub fn dedup_cursors(&mut self) {
        self.cursors
            .remove_duplicates((self.cursor_y, self.cursor_x));
    }

    /// Match collected originals back to the primary: exactly one slot is
    /// flagged, the first equal to the primary position.
    pub(crate) fn mark_primary(&self, all: &[CursorPos]) -> Vec<bool> {
        let mut flags = vec![false; all.len()];
        let mut marked = false;
        for (i, c) in all.iter().enumerate() {
            if !marked && c.line == self.cursor_y && c.column == self.cursor_x {
                flags[i] = true;
                marked = true;
            }
        }
        if !marked && !flags.is_empty() {
            flags[0] = true;
        }
        flags
    }

    /// Write rebased positions back: the flagged slot becomes the primary,
    /// the rest refill the secondary set in order.
    pub(crate) fn restore_cursors(&mut self, all: &[CursorPos], is_primary: &[bool]) {
        let mut sec = 0;
        let count = self.cursors.count();
        for (i, pos) in all.iter().enumerate() {
            if is_primary[i] {
                self.cursor_y = pos.line;
                self.cursor_x = pos.column;
            } else if sec < count {
                self.cursors.secondaries[sec] = *pos;
                sec += 1;
            }
        }
    }

    /// Clamp every secondary into buffer bounds.
    pub(crate) fn clamp_secondaries(&mut self) {
        let buffer: &Buffer = &self.buffer;
        let count = buffer.row_count();
        for c in self.cursors.iter_mut() {
            if count == 0 {
                *c = CursorPos { line: 0, column: 0 };
                continue;
            }
            if c.line >= count {
                c.line = count - 1;
            }
            let len = buffer.row_len(c.line);
            if c.column > len {
                c.column = len;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorState;

    #[test]
    fn add_refuses_duplicates_and_primary() {
        let mut set = CursorSet::default();
        assert!(set.add((0, 0), 1, 2));
        assert!(!set.add((0, 0), 1, 2)); // duplicate secondary
        assert!(!set.add((3, 3), 3, 3)); // primary collision
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn collect_all_orders_both_ways() {
        let mut set = CursorSet::default();
        set.add((1, 1), 0, 5);
        set.add((1, 1), 2, 0);
        let fwd = set.collect_all((1, 1), false);
        assert_eq!(
            fwd,
            vec![
                CursorPos { line: 0, column: 5 },
                CursorPos { line: 1, column: 1 },
                CursorPos { line: 2, column: 0 },
            ]
        );
        let rev = set.collect_all((1, 1), true);
        assert_eq!(rev[0], CursorPos { line: 2, column: 0 });
    }

    #[test]
    fn dedup_drops_primary_overlap_unless_allowed() {
        let mut state = EditorState::with_rows(&["abc", "def"]);
        state.cursor_y = 0;
        state.cursor_x = 1;
        state.cursors.add_allow_primary(0, 1);
        state.cursors.add_allow_primary(1, 1);
        state.dedup_cursors();
        assert_eq!(state.cursors.count(), 1); // overlap dropped

        state.cursors.allow_primary_overlap = true;
        state.cursors.add_allow_primary(0, 1);
        state.cursors.add_allow_primary(0, 1); // refused: duplicate secondary
        state.dedup_cursors();
        assert_eq!(state.cursors.count(), 2); // one overlap kept
    }

    #[test]
    fn adjustments_shift_expected_cursors() {
        let mut set = CursorSet::default();
        set.add((9, 9), 0, 4);
        set.add((9, 9), 1, 2);
        set.add((9, 9), 2, 0);

        set.adjust_after_insert(0, 2);
        assert_eq!(set.positions()[0], CursorPos { line: 0, column: 5 });

        set.adjust_after_delete(0, 2);
        assert_eq!(set.positions()[0], CursorPos { line: 0, column: 4 });

        set.adjust_after_newline(0, 3);
        assert_eq!(set.positions()[0], CursorPos { line: 1, column: 1 });
        assert_eq!(set.positions()[1], CursorPos { line: 2, column: 2 });

        set.adjust_after_line_merge(1, 7);
        assert_eq!(set.positions()[0], CursorPos { line: 0, column: 8 });
        assert_eq!(set.positions()[1], CursorPos { line: 1, column: 2 });
    }

    #[test]
    fn mark_primary_flags_exactly_one() {
        let mut state = EditorState::with_rows(&["aaaa"]);
        state.cursor_x = 2;
        let all = vec![
            CursorPos { line: 0, column: 2 },
            CursorPos { line: 0, column: 2 },
            CursorPos { line: 0, column: 3 },
        ];
        let flags = state.mark_primary(&all);
        assert_eq!(flags, vec![true, false, false]);
    }
}
