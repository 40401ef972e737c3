//! Selection model: an anchor/cursor pair in file coordinates.
//!
//! Containment uses the normalized half-open range `[start, end)` with
//! lexicographic comparison on `(row, col)`. Click bookkeeping lives here
//! too because double/triple-click promotion is a selection concern.

use crate::{EditorState, UndoOp};
use std::time::{Duration, Instant};

/// Double/triple-click window.
const MULTI_CLICK_WINDOW: Duration = Duration::from_millis(400);
/// Maximum column drift between clicks that still counts as the same spot.
const MULTI_CLICK_SLOP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Char,
    Word,
    Line,
}

/// File position used by the selection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SelPos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug)]
pub struct Selection {
    pub active: bool,
    pub anchor: SelPos,
    pub cursor: SelPos,
    pub mode: SelectionMode,
    pub click_count: u8,
    last_click_at: Option<Instant>,
    last_click_pos: SelPos,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            active: false,
            anchor: SelPos::default(),
            cursor: SelPos::default(),
            mode: SelectionMode::Char,
            click_count: 0,
            last_click_at: None,
            last_click_pos: SelPos::default(),
        }
    }
}

impl Selection {
    /// Endpoints in document order.
    pub fn normalized(&self) -> (SelPos, SelPos) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    /// True when `(row, col)` falls inside the selected range.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        if !self.active {
            return false;
        }
        let (start, end) = self.normalized();
        let pos = SelPos { row, col };
        pos >= start && pos < end
    }
}

impl EditorState {
    /// Begin a character selection at the file cursor.
    pub fn selection_start(&mut self) {
        self.selection.active = true;
        self.selection.anchor = SelPos {
            row: self.cursor_y,
            col: self.cursor_x,
        };
        self.selection.cursor = self.selection.anchor;
        self.selection.mode = SelectionMode::Char;
    }

    /// Move the selection's cursor end to the file cursor, promoting an
    /// inactive selection to active first.
    pub fn selection_extend(&mut self) {
        if !self.selection.active {
            self.selection_start();
            return;
        }
        self.selection.cursor = SelPos {
            row: self.cursor_y,
            col: self.cursor_x,
        };
    }

    /// Deactivate. Click state persists across clear/start cycles so the
    /// multi-click counter keeps working.
    pub fn selection_clear(&mut self) {
        self.selection.active = false;
    }

    /// Expand to the word around `(row, col)`: both directions stop at
    /// whitespace or punctuation.
    pub fn select_word(&mut self, row: usize, col: usize) {
        let Some(target) = self.buffer.row(row) else {
            return;
        };
        let chars = target.chars();
        let boundary = |b: u8| b.is_ascii_whitespace() || b.is_ascii_punctuation();

        let mut start = col.min(chars.len());
        while start > 0 && !boundary(chars[start - 1]) {
            start -= 1;
        }
        let mut end = col.min(chars.len());
        while end < chars.len() && !boundary(chars[end]) {
            end += 1;
        }

        self.selection.active = true;
        self.selection.anchor = SelPos { row, col: start };
        self.selection.cursor = SelPos { row, col: end };
        self.selection.mode = SelectionMode::Word;
    }

    /// Select the whole of row `row`.
    pub fn select_line(&mut self, row: usize) {
        if row >= self.buffer.row_count() {
            return;
        }
        self.selection.active = true;
        self.selection.anchor = SelPos { row, col: 0 };
        self.selection.cursor = SelPos {
            row,
            col: self.buffer.row_len(row),
        };
        self.selection.mode = SelectionMode::Line;
    }

    /// Select the entire buffer and park the cursor at its end.
    pub fn select_all(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let last = self.buffer.row_count() - 1;
        self.selection.anchor = SelPos { row: 0, col: 0 };
        self.selection.cursor = SelPos {
            row: last,
            col: self.buffer.row_len(last),
        };
        self.selection.active = true;
        self.selection.mode = SelectionMode::Char;
        self.cursor_y = last;
        self.cursor_x = self.buffer.row_len(last);
    }

    /// Cycle the click counter: a follow-up click within 400 ms and two
    /// columns advances 1→2→3→1; anything else resets to 1.
    pub fn detect_multi_click(&mut self, row: usize, col: usize) {
        self.detect_multi_click_at(row, col, Instant::now());
    }

    pub fn detect_multi_click_at(&mut self, row: usize, col: usize, now: Instant) {
        let close_in_time = self
            .selection
            .last_click_at
            .is_some_and(|at| now.duration_since(at) < MULTI_CLICK_WINDOW);
        let close_in_space = row == self.selection.last_click_pos.row
            && col.abs_diff(self.selection.last_click_pos.col) <= MULTI_CLICK_SLOP;

        if close_in_time && close_in_space {
            self.selection.click_count = (self.selection.click_count % 3) + 1;
        } else {
            self.selection.click_count = 1;
        }
        self.selection.last_click_at = Some(now);
        self.selection.last_click_pos = SelPos { row, col };
    }

    /// Extract the selection as row slices joined by single newlines.
    /// An empty or inactive selection extracts `""`.
    pub fn selected_text(&self) -> Vec<u8> {
        if !self.selection.active {
            return Vec::new();
        }
        let (start, end) = self.selection.normalized();
        let mut out = Vec::new();
        for row in start.row..=end.row.min(self.buffer.row_count().saturating_sub(1)) {
            let Some(r) = self.buffer.row(row) else { break };
            let from = if row == start.row { start.col.min(r.len()) } else { 0 };
            let to = if row == end.row { end.col.min(r.len()) } else { r.len() };
            if from < to {
                out.extend_from_slice(&r.chars()[from..to]);
            }
            if row < end.row {
                out.push(b'\n');
            }
        }
        out
    }

    /// Delete the selected range as one journaled `selection-delete`,
    /// collapse the endpoint rows, and leave the cursor at the start.
    pub fn delete_selection(&mut self) {
        if !self.selection.active {
            return;
        }
        let (start, end) = self.selection.normalized();
        let payload = self.selected_text();

        let mut entry = self.undo_entry(UndoOp::SelectionDelete, start.row, start.col);
        entry.cursor = (start.row, start.col);
        entry.end = (end.row, end.col);
        entry.multi_line = Some(payload);
        self.undo.log(entry);

        self.cursor_y = start.row;
        self.cursor_x = start.col;
        self.delete_range((start.row, start.col), (end.row, end.col));
        self.selection_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorState;

    #[test]
    fn empty_selection_contains_nothing_and_extracts_nothing() {
        let mut state = EditorState::with_rows(&["hello"]);
        state.cursor_x = 2;
        state.selection_start();
        assert!(!state.selection.contains(0, 2));
        assert!(state.selected_text().is_empty());
    }

    #[test]
    fn containment_is_half_open_lexicographic() {
        let mut state = EditorState::with_rows(&["abcdef", "ghijkl"]);
        state.cursor_x = 4;
        state.selection_start();
        state.cursor_y = 1;
        state.cursor_x = 2;
        state.selection_extend();
        assert!(state.selection.contains(0, 4));
        assert!(state.selection.contains(0, 5));
        assert!(state.selection.contains(1, 1));
        assert!(!state.selection.contains(1, 2));
        assert!(!state.selection.contains(0, 3));
    }

    #[test]
    fn normalization_orders_backwards_selection() {
        let mut state = EditorState::with_rows(&["abcdef"]);
        state.cursor_x = 5;
        state.selection_start();
        state.cursor_x = 1;
        state.selection_extend();
        let (start, end) = state.selection.normalized();
        assert_eq!((start.col, end.col), (1, 5));
        assert_eq!(state.selected_text(), b"bcde");
    }

    #[test]
    fn word_selection_stops_at_punctuation() {
        let mut state = EditorState::with_rows(&["foo(bar_baz)"]);
        state.select_word(0, 6);
        let (start, end) = state.selection.normalized();
        assert_eq!((start.col, end.col), (4, 11));
        assert_eq!(state.selected_text(), b"bar_baz");
    }

    #[test]
    fn line_selection_spans_the_row() {
        let mut state = EditorState::with_rows(&["alpha", "beta"]);
        state.select_line(1);
        assert_eq!(state.selected_text(), b"beta");
        assert_eq!(state.selection.mode, SelectionMode::Line);
    }

    #[test]
    fn select_all_covers_buffer() {
        let mut state = EditorState::with_rows(&["one", "two"]);
        state.select_all();
        assert_eq!(state.selected_text(), b"one\ntwo");
        assert_eq!((state.cursor_y, state.cursor_x), (1, 3));
    }

    #[test]
    fn multi_click_cycles_and_resets() {
        let mut state = EditorState::with_rows(&["text"]);
        let t0 = Instant::now();
        state.detect_multi_click_at(0, 1, t0);
        assert_eq!(state.selection.click_count, 1);
        state.detect_multi_click_at(0, 2, t0 + Duration::from_millis(100));
        assert_eq!(state.selection.click_count, 2);
        state.detect_multi_click_at(0, 2, t0 + Duration::from_millis(200));
        assert_eq!(state.selection.click_count, 3);
        // Too slow: back to a single click.
        state.detect_multi_click_at(0, 2, t0 + Duration::from_millis(900));
        assert_eq!(state.selection.click_count, 1);
        // Too far away in columns: also a single click.
        state.detect_multi_click_at(0, 7, t0 + Duration::from_millis(950));
        assert_eq!(state.selection.click_count, 1);
    }

    #[test]
    fn delete_selection_collapses_rows() {
        let mut state = EditorState::with_rows(&["hello world", "middle", "goodbye"]);
        state.cursor_x = 5;
        state.selection_start();
        state.cursor_y = 2;
        state.cursor_x = 4;
        state.selection_extend();
        state.delete_selection();
        assert_eq!(state.buffer.row_count(), 1);
        assert_eq!(state.buffer.row(0).unwrap().chars(), b"hellobye");
        assert_eq!((state.cursor_y, state.cursor_x), (0, 5));
        assert!(!state.selection.active);
    }
}
