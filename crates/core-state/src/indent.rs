//! Indent and unindent. One level is four spaces; unindent removes up to
//! four leading spaces. With multiple cursors each unique row shifts once
//! and cursor columns move with the text.

use crate::{EditorState, INDENT_WIDTH};

impl EditorState {
    /// Indent the cursor row (or every unique cursor row) by one level.
    pub fn indent_line(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_indent(true);
            return;
        }
        self.undo.begin_batch();
        let added = self.indent_line_apply(self.cursor_y);
        self.undo.end_batch();
        self.cursor_x += added;
    }

    /// Remove up to one level of leading spaces from the cursor row(s).
    pub fn unindent_line(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_indent(false);
            return;
        }
        self.undo.begin_batch();
        let removed = self.unindent_line_apply(self.cursor_y);
        self.undo.end_batch();
        self.cursor_x = self.cursor_x.saturating_sub(removed);
    }

    /// Prepend one indent level, journaling each space. Returns spaces
    /// added.
    pub(crate) fn indent_line_apply(&mut self, line: usize) -> usize {
        if line >= self.buffer.row_count() {
            return 0;
        }
        self.insert_span_logged(line, 0, &[b' '; INDENT_WIDTH]);
        INDENT_WIDTH
    }

    /// Strip up to one indent level of leading spaces, journaling each.
    /// Returns spaces removed.
    pub(crate) fn unindent_line_apply(&mut self, line: usize) -> usize {
        let Some(row) = self.buffer.row(line) else {
            return 0;
        };
        let remove = row
            .chars()
            .iter()
            .take(INDENT_WIDTH)
            .take_while(|&&b| b == b' ')
            .count();
        if remove > 0 {
            self.delete_span_logged(line, 0, remove);
        }
        remove
    }

    fn multicursor_indent(&mut self, indent: bool) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), false);
        let is_primary = self.mark_primary(&all);
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        let mut last_delta = 0usize;
        for i in 0..all.len() {
            let line = targets[i];
            if line >= self.buffer.row_count() {
                continue;
            }
            if line != last_line {
                last_delta = if indent {
                    self.indent_line_apply(line)
                } else {
                    self.unindent_line_apply(line)
                };
                last_line = line;
            }
            if indent {
                all[i].column += last_delta;
            } else {
                all[i].column = all[i].column.saturating_sub(last_delta);
            }
            all[i].column = all[i].column.min(self.buffer.row_len(line));
        }
        self.undo.end_batch();

        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
    }
}
