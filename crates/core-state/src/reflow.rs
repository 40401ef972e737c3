//! Paragraph reflow (hard wrap) and unwrap.
//!
//! A paragraph is the contiguous run of non-blank rows around the cursor.
//! The first line's prefix (indent plus optional comment marker) carries to
//! every emitted line; per-line prefixes are stripped before joining, and
//! the joined text re-wraps at `wrap_column - prefix_len` choosing the
//! latest whitespace within a 20-byte lookback window.

use crate::{EditorState, UndoOp};
use core_text::{detect_paragraph, detect_prefix, is_whitespace};

/// How far back from the wrap limit to look for a whitespace break.
const WORD_BREAK_SEARCH_WINDOW: usize = 20;

impl EditorState {
    /// Rewrap the paragraph under the cursor at `wrap_column`.
    pub fn reflow_paragraph(&mut self) {
        if self.wrap_column == 0 {
            return;
        }
        let range = detect_paragraph(&self.buffer, self.cursor_y.min(
            self.buffer.row_count().saturating_sub(1),
        ));
        if range.start_line > range.end_line || range.start_line >= self.buffer.row_count() {
            return;
        }

        let prefix = detect_prefix(self.buffer.row(range.start_line).expect("row exists"));
        let wrap_width = self.wrap_column.saturating_sub(prefix.len()).max(1);

        if range.start_line == range.end_line
            && self.buffer.row_len(range.start_line) <= self.wrap_column.saturating_sub(prefix.len())
        {
            let column = self.wrap_column;
            self.set_status(format!("Line already fits within wrap column {column}"));
            return;
        }

        let joined = self.join_paragraph_text(range.start_line, range.end_line);

        self.undo.begin_batch();
        self.remove_paragraph_rows(range.start_line, range.end_line);

        // Re-emit wrapped rows, prefix first.
        let mut line = range.start_line;
        let mut pos = 0;
        while pos < joined.len() {
            while pos < joined.len() && is_whitespace(joined[pos]) {
                pos += 1;
            }
            if pos >= joined.len() {
                break;
            }

            let remaining = joined.len() - pos;
            let mut take = remaining.min(wrap_width);
            if take < remaining {
                for i in (take.saturating_sub(WORD_BREAK_SEARCH_WINDOW) + 1..=take).rev() {
                    if is_whitespace(joined[pos + i]) {
                        take = i;
                        break;
                    }
                }
            }

            let mut content = prefix.bytes.clone();
            content.extend_from_slice(&joined[pos..pos + take]);
            self.log_reflow_row_insert(line, &content);
            self.buffer.insert_row(line, content);
            line += 1;
            pos += take;
        }
        self.undo.end_batch();

        self.clamp_cursor();
        self.update_gutter_width();
        let column = self.wrap_column;
        self.set_status(format!("Reflowed paragraph at column {column}"));
    }

    /// Collapse the paragraph under the cursor to a single line with the
    /// first line's prefix.
    pub fn join_paragraph(&mut self) {
        let range = detect_paragraph(&self.buffer, self.cursor_y.min(
            self.buffer.row_count().saturating_sub(1),
        ));
        if range.start_line > range.end_line || range.start_line >= self.buffer.row_count() {
            return;
        }
        if range.start_line == range.end_line {
            self.set_status("Already a single line");
            return;
        }

        let prefix = detect_prefix(self.buffer.row(range.start_line).expect("row exists"));
        let joined = self.join_paragraph_text(range.start_line, range.end_line);

        self.undo.begin_batch();
        self.remove_paragraph_rows(range.start_line, range.end_line);

        let mut content = prefix.bytes.clone();
        content.extend_from_slice(&joined);
        self.log_reflow_row_insert(range.start_line, &content);
        self.buffer.insert_row(range.start_line, content);
        self.undo.end_batch();

        self.clamp_cursor();
        self.update_gutter_width();
        let joined_rows = range.end_line - range.start_line + 1;
        self.set_status(format!("Joined {joined_rows} lines into 1"));
    }

    /// Strip each row's prefix and concatenate with single spaces.
    fn join_paragraph_text(&self, start_line: usize, end_line: usize) -> Vec<u8> {
        let mut joined: Vec<u8> = Vec::new();
        for line in start_line..=end_line {
            let Some(row) = self.buffer.row(line) else { break };
            let mut from = detect_prefix(row).len();
            while from < row.len() && is_whitespace(row.chars()[from]) {
                from += 1;
            }
            if from >= row.len() {
                continue;
            }
            if !joined.is_empty() && !is_whitespace(*joined.last().expect("non-empty")) {
                joined.push(b' ');
            }
            joined.extend_from_slice(&row.chars()[from..]);
        }
        joined
    }

    fn remove_paragraph_rows(&mut self, start_line: usize, end_line: usize) {
        for line in (start_line..=end_line).rev() {
            let content = self
                .buffer
                .row(line)
                .map(|r| r.chars().to_vec())
                .unwrap_or_default();
            let mut entry = self.undo_entry(UndoOp::RowDelete, line, 0);
            entry.row_content = Some(content);
            self.undo.log(entry);
            self.buffer.delete_row(line);
        }
    }

    fn log_reflow_row_insert(&mut self, line: usize, content: &[u8]) {
        let mut entry = self.undo_entry(UndoOp::RowInsert, line, 0);
        entry.row_content = Some(content.to_vec());
        self.undo.log(entry);
    }
}
