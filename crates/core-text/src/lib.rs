//! Row-store text buffer.
//!
//! The buffer is an ordered sequence of [`Row`]s. Each row owns its derived
//! render/highlight/wrap state; the buffer coordinates the one piece of
//! derived state that crosses rows, the `open_comment` bit, by re-scanning
//! forward iteratively whenever a row's bit flips.

use core_syntax::{CompiledPattern, Highlight, Language, compile_patterns, scan_row};

mod paragraph;
mod row;

pub use paragraph::{LinePrefix, ParagraphRange, detect_paragraph, detect_prefix};
pub use row::{Row, TAB_STOP, is_whitespace, is_word_char};

/// The row store. `dirty` counts every mutation since load/save.
#[derive(Default)]
pub struct Buffer {
    rows: Vec<Row>,
    language: Option<&'static Language>,
    patterns: Vec<CompiledPattern>,
    pub dirty: usize,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from file content: one row per line, trailing CR/LF
    /// trimmed.
    pub fn from_bytes(content: &[u8]) -> Self {
        let mut buffer = Self::new();
        for line in content.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            buffer.rows.push(Row::new(line.to_vec()));
        }
        // A trailing newline produces one phantom empty last line; drop it
        // so save(open(x)) == x modulo trailing-newline normalization.
        if buffer.rows.len() > 1 && buffer.rows.last().is_some_and(Row::is_empty) {
            buffer.rows.pop();
        }
        buffer.rescan_all();
        buffer.dirty = 0;
        buffer
    }

    /// Join all rows with `\n`; every row is followed by exactly one.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Mutable row access for derived-state maintenance (wrap caching,
    /// transient highlight repaints, UI dirty flags). Content edits go
    /// through the buffer-level operations below so render and highlight
    /// state stay in sync.
    pub fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.rows.get_mut(at)
    }

    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    pub fn language(&self) -> Option<&'static Language> {
        self.language
    }

    /// Install language rules (compiling its patterns) and re-highlight.
    pub fn set_language(&mut self, language: Option<&'static Language>) {
        self.language = language;
        self.patterns = language.map(compile_patterns).unwrap_or_default();
        self.rescan_all();
    }

    /// Pick language rules from a filename.
    pub fn select_language_for(&mut self, filename: &str) {
        self.set_language(core_syntax::detect(filename));
    }

    // --- row store operations -------------------------------------------

    /// Insert a row at `at` with the given raw chars.
    pub fn insert_row(&mut self, at: usize, chars: impl Into<Vec<u8>>) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(chars));
        self.rescan_from(at);
        self.dirty += 1;
    }

    /// Delete the row at `at`. The buffer may become empty.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        // The row now at `at` may inherit a different comment state.
        if at < self.rows.len() {
            self.rescan_from(at);
        }
        self.dirty += 1;
    }

    /// Insert one byte within a row.
    pub fn row_insert_byte(&mut self, at: usize, col: usize, byte: u8) {
        if let Some(row) = self.rows.get_mut(at) {
            row.insert_byte(col, byte);
            self.refresh_row(at);
            self.dirty += 1;
        }
    }

    /// Insert a byte string within a row.
    pub fn row_insert_bytes(&mut self, at: usize, col: usize, bytes: &[u8]) {
        if let Some(row) = self.rows.get_mut(at) {
            row.insert_bytes(col, bytes);
            self.refresh_row(at);
            self.dirty += 1;
        }
    }

    /// Delete one byte within a row.
    pub fn row_delete_byte(&mut self, at: usize, col: usize) {
        if let Some(row) = self.rows.get_mut(at) {
            row.delete_byte(col);
            self.refresh_row(at);
            self.dirty += 1;
        }
    }

    /// Remove `[start, end)` within a row.
    pub fn row_remove_span(&mut self, at: usize, start: usize, end: usize) {
        if let Some(row) = self.rows.get_mut(at) {
            row.remove_span(start, end);
            self.refresh_row(at);
            self.dirty += 1;
        }
    }

    /// Append a byte string to a row (line joins).
    pub fn row_append(&mut self, at: usize, bytes: &[u8]) {
        if let Some(row) = self.rows.get_mut(at) {
            row.append_bytes(bytes);
            self.refresh_row(at);
            self.dirty += 1;
        }
    }

    /// Truncate a row at `col` (row splits).
    pub fn row_truncate(&mut self, at: usize, col: usize) {
        if let Some(row) = self.rows.get_mut(at) {
            row.truncate(col);
            self.refresh_row(at);
            self.dirty += 1;
        }
    }

    /// Swap two adjacent rows (line move). Re-derives comment state from
    /// the upper of the two.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a < self.rows.len() && b < self.rows.len() && a != b {
            self.rows.swap(a, b);
            self.rescan_forced(a.min(b));
            self.dirty += 1;
        }
    }

    /// Re-derive render and highlight state after a raw `row_mut` edit.
    pub fn refresh_row(&mut self, at: usize) {
        if at < self.rows.len() {
            self.rows[at].rebuild_render();
            self.rescan_from(at);
        }
    }

    // --- syntax propagation ---------------------------------------------

    fn scan_one(&self, i: usize) -> (Vec<Highlight>, bool) {
        let starts_in_comment = i > 0 && self.rows[i - 1].open_comment();
        match self.language {
            Some(language) => scan_row(
                self.rows[i].render(),
                language,
                &self.patterns,
                starts_in_comment,
            ),
            None => (vec![Highlight::Normal; self.rows[i].render_len()], false),
        }
    }

    /// Re-scan row `at`, then keep walking forward while the `open_comment`
    /// bit flips. Iterative on purpose: a pathological file alternating
    /// comment state on every row walks the tail without recursion.
    fn rescan_from(&mut self, at: usize) {
        let mut i = at;
        while i < self.rows.len() {
            let (hl, open) = self.scan_one(i);
            let changed = self.rows[i].open_comment() != open;
            self.rows[i].set_highlight(hl, open);
            if changed && i + 1 < self.rows.len() {
                i += 1;
            } else {
                break;
            }
        }
    }

    /// Like [`Self::rescan_from`] but always re-scans the row after `at` as
    /// well, for operations (row swaps) that move content without editing
    /// either row.
    fn rescan_forced(&mut self, at: usize) {
        if at < self.rows.len() {
            let (hl, open) = self.scan_one(at);
            self.rows[at].set_highlight(hl, open);
        }
        if at + 1 < self.rows.len() {
            self.rescan_from(at + 1);
        }
    }

    fn rescan_all(&mut self) {
        for i in 0..self.rows.len() {
            let (hl, open) = self.scan_one(i);
            self.rows[i].set_highlight(hl, open);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_syntax::C_LANGUAGE;

    fn c_buffer(lines: &[&str]) -> Buffer {
        let mut buffer = Buffer::new();
        for (i, line) in lines.iter().enumerate() {
            buffer.insert_row(i, line.as_bytes().to_vec());
        }
        buffer.set_language(Some(&C_LANGUAGE));
        buffer
    }

    #[test]
    fn file_round_trip_normalizes_trailing_newline() {
        let buffer = Buffer::from_bytes(b"one\ntwo\r\nthree");
        assert_eq!(buffer.row_count(), 3);
        assert_eq!(buffer.row(1).unwrap().chars(), b"two");
        assert_eq!(buffer.to_bytes(), b"one\ntwo\nthree\n");

        let again = Buffer::from_bytes(&buffer.to_bytes());
        assert_eq!(again.to_bytes(), buffer.to_bytes());
    }

    #[test]
    fn render_and_highlight_lengths_match_everywhere() {
        let buffer = c_buffer(&["int\tx; // c", "\"s\\\"t\"", ""]);
        for i in 0..buffer.row_count() {
            let row = buffer.row(i).unwrap();
            assert_eq!(row.render_len(), row.highlight().len());
        }
    }

    #[test]
    fn open_comment_propagates_forward() {
        let mut buffer = c_buffer(&["int a;", "int b;", "int c;"]);
        assert!(!buffer.row(1).unwrap().open_comment());

        // Opening a comment on row 0 flips rows 0..=2.
        buffer.row_insert_bytes(0, 6, b" /*");
        assert!(buffer.row(0).unwrap().open_comment());
        assert!(buffer.row(1).unwrap().open_comment());
        assert!(buffer.row(2).unwrap().open_comment());
        assert_eq!(
            buffer.row(1).unwrap().highlight()[0],
            Highlight::MultilineComment
        );

        // Closing it on row 1 releases row 2.
        buffer.row_insert_bytes(1, 6, b" */");
        assert!(!buffer.row(1).unwrap().open_comment());
        assert!(!buffer.row(2).unwrap().open_comment());
        assert_eq!(buffer.row(2).unwrap().highlight()[0], Highlight::Keyword2);
    }

    #[test]
    fn deleting_the_comment_opener_row_releases_successors() {
        let mut buffer = c_buffer(&["/* open", "inside", "int x;"]);
        assert!(buffer.row(2).unwrap().open_comment());
        buffer.delete_row(0);
        assert!(!buffer.row(0).unwrap().open_comment());
        assert_eq!(buffer.row(1).unwrap().highlight()[0], Highlight::Keyword2);
    }

    #[test]
    fn swapping_rows_rescans_both() {
        let mut buffer = c_buffer(&["/* a", "int x; */", "int y;"]);
        buffer.swap_rows(0, 1);
        // "int x; */" now leads and closes nothing; "/* a" re-opens below it.
        assert!(!buffer.row(0).unwrap().open_comment());
        assert!(buffer.row(1).unwrap().open_comment());
        assert_eq!(
            buffer.row(2).unwrap().highlight()[0],
            Highlight::MultilineComment
        );
    }

    #[test]
    fn buffer_may_become_empty() {
        let mut buffer = c_buffer(&["only"]);
        buffer.delete_row(0);
        assert_eq!(buffer.row_count(), 0);
        assert_eq!(buffer.to_bytes(), b"");
    }

    #[test]
    fn dirty_counts_mutations() {
        let mut buffer = c_buffer(&["ab"]);
        let before = buffer.dirty;
        buffer.row_insert_byte(0, 0, b'x');
        buffer.row_delete_byte(0, 0);
        buffer.row_append(0, b"cd");
        assert_eq!(buffer.dirty, before + 3);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn render_mapping_round_trips(chars in proptest::collection::vec(
            prop_oneof![Just(b'\t'), 0x20u8..0x7f], 0..40)) {
            let row = Row::new(chars.clone());
            for cx in 0..=chars.len() {
                let rx = row.cursor_to_render(cx);
                prop_assert_eq!(row.render_to_cursor(rx), cx);
            }
        }

        #[test]
        fn wrap_breaks_strictly_increase_within_bounds(
            chars in proptest::collection::vec(
                prop_oneof![Just(b' '), 0x21u8..0x7f], 0..300),
            width in 1usize..60)
        {
            let mut row = Row::new(chars);
            row.ensure_wrap(width);
            for pair in row.wrap_breaks().windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for &brk in row.wrap_breaks() {
                prop_assert!(brk < row.render_len());
            }
        }
    }
}
