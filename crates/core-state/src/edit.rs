//! Character, newline, and word edits, single cursor and multi-cursor.
//!
//! Multi-cursor edits use snapshot-and-rebase: collect every cursor, take a
//! copy of the original positions, apply the edits in reverse document
//! order (end of file first, so earlier positions stay valid), then compute
//! each cursor's new position from its original and the other originals.
//! The whole batch shares one undo group.

use crate::{EditorState, INDENT_WIDTH, UndoOp};
use core_text::is_word_char;

impl EditorState {
    // --- single-point primitives ----------------------------------------

    /// Insert a byte at an explicit position without moving the primary
    /// cursor. Creates the trailing empty row when `line == row_count`.
    pub(crate) fn insert_char_at(&mut self, line: usize, col: usize, byte: u8) {
        if line > self.buffer.row_count() {
            return;
        }
        if line == self.buffer.row_count() {
            self.buffer.insert_row(line, Vec::new());
        }
        self.buffer.row_insert_byte(line, col, byte);
        self.update_gutter_width();
    }

    /// Splice a newline at an explicit position, applying auto-indent to
    /// the new row. Returns the indent width actually applied.
    pub(crate) fn insert_newline_at(&mut self, line: usize, col: usize) -> usize {
        if line > self.buffer.row_count() {
            return 0;
        }
        if line == self.buffer.row_count() {
            self.buffer.insert_row(line, Vec::new());
            self.update_gutter_width();
            return 0;
        }

        let (indent_bytes, extra) = {
            let row = self.buffer.row(line).expect("row exists");
            let indent: Vec<u8> = row.chars()[..row.indentation()].to_vec();
            let extra = if row.ends_with_opening_brace() {
                INDENT_WIDTH
            } else {
                0
            };
            (indent, extra)
        };

        if col == 0 {
            self.buffer.insert_row(line, Vec::new());
        } else {
            let tail = {
                let row = self.buffer.row(line).expect("row exists");
                row.chars()[col.min(row.len())..].to_vec()
            };
            self.buffer.insert_row(line + 1, tail);
            self.buffer.row_truncate(line, col);
        }

        let total = indent_bytes.len() + extra;
        if total > 0 {
            let mut prefix = indent_bytes;
            prefix.extend(std::iter::repeat_n(b' ', extra));
            self.buffer.row_insert_bytes(line + 1, 0, &prefix);
        }
        self.update_gutter_width();
        total
    }

    /// Remove `[start, end)` across rows: collapse the endpoint rows into
    /// one, dropping the rows between. No journaling; callers log.
    pub(crate) fn delete_range(&mut self, start: (usize, usize), end: (usize, usize)) {
        let count = self.buffer.row_count();
        if count == 0 || start.0 >= count {
            return;
        }
        let end_row = end.0.min(count - 1);
        if start.0 == end_row {
            let limit = self.buffer.row_len(start.0);
            self.buffer
                .row_remove_span(start.0, start.1.min(limit), end.1.min(limit));
        } else {
            let tail = {
                let row = self.buffer.row(end_row).expect("row exists");
                row.chars()[end.1.min(row.len())..].to_vec()
            };
            self.buffer.row_truncate(start.0, start.1);
            self.buffer.row_append(start.0, &tail);
            for row in ((start.0 + 1)..=end_row).rev() {
                self.buffer.delete_row(row);
            }
        }
        self.update_gutter_width();
    }

    /// Literal multi-line splice at `at`; no auto-indent, no journaling.
    /// Returns the position just past the inserted text.
    pub(crate) fn insert_text_raw(&mut self, at: (usize, usize), text: &[u8]) -> (usize, usize) {
        let (line, col) = at;
        if line >= self.buffer.row_count() {
            self.buffer.insert_row(self.buffer.row_count(), Vec::new());
        }
        let line = line.min(self.buffer.row_count() - 1);
        let col = col.min(self.buffer.row_len(line));

        let segments: Vec<&[u8]> = text.split(|&b| b == b'\n').collect();
        if segments.len() == 1 {
            self.buffer.row_insert_bytes(line, col, segments[0]);
            self.update_gutter_width();
            return (line, col + segments[0].len());
        }

        let tail = {
            let row = self.buffer.row(line).expect("row exists");
            row.chars()[col..].to_vec()
        };
        self.buffer.row_truncate(line, col);
        self.buffer.row_append(line, segments[0]);

        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate().skip(1) {
            let mut content = segment.to_vec();
            if i == last {
                content.extend_from_slice(&tail);
            }
            self.buffer.insert_row(line + i, content);
        }
        self.update_gutter_width();
        (line + last, segments[last].len())
    }

    // --- character insert ------------------------------------------------

    /// Insert a character at the cursor (or at every cursor). Typing over
    /// an active selection replaces it. A `}` that lands as the line's
    /// first non-whitespace auto-unindents by one level.
    pub fn insert_char(&mut self, byte: u8) {
        if !self.cursors.is_empty() {
            self.multicursor_insert_char(byte);
            return;
        }
        if self.selection.active {
            self.delete_selection();
        }
        if self.cursor_y == self.buffer.row_count() {
            self.buffer.insert_row(self.cursor_y, Vec::new());
            self.update_gutter_width();
        }

        let mut entry = self.undo_entry(UndoOp::CharInsert, self.cursor_y, self.cursor_x);
        entry.char_data = Some(byte);
        self.undo.log(entry);

        self.buffer
            .row_insert_byte(self.cursor_y, self.cursor_x, byte);
        self.cursor_x += 1;

        if byte == b'}' {
            let removed = self.auto_unindent_closing_brace(self.cursor_y);
            self.cursor_x = self.cursor_x.saturating_sub(removed);
        }
    }

    /// Remove one indent level from a line that starts with `}`. Returns
    /// the number of spaces removed. Journals into the current group.
    pub(crate) fn auto_unindent_closing_brace(&mut self, line: usize) -> usize {
        let starts_closing = self
            .buffer
            .row(line)
            .is_some_and(|r| r.starts_with_closing_brace());
        if !starts_closing {
            return 0;
        }
        self.unindent_line_apply(line)
    }

    // --- newline ---------------------------------------------------------

    /// Split the current row at the cursor. The new row inherits the old
    /// row's leading whitespace, plus one extra level when the text before
    /// the cursor ends with `{`.
    pub fn insert_newline(&mut self) {
        if !self.cursors.is_empty() {
            self.multicursor_insert_newline();
            return;
        }
        if self.selection.active {
            self.delete_selection();
        }

        let (indent_bytes, extra) = self.newline_indent(self.cursor_y, self.cursor_x);
        let total = indent_bytes.len() + extra;

        if self.cursor_x == 0 {
            let mut entry = self.undo_entry(UndoOp::RowInsert, self.cursor_y, 0);
            entry.row_content = Some(Vec::new());
            entry.indent = total;
            self.undo.log(entry);
            self.buffer.insert_row(self.cursor_y, Vec::new());
        } else {
            let mut entry = self.undo_entry(UndoOp::RowSplit, self.cursor_y, self.cursor_x);
            entry.indent = total;
            self.undo.log(entry);

            let tail = {
                let row = self.buffer.row(self.cursor_y).expect("row exists");
                row.chars()[self.cursor_x.min(row.len())..].to_vec()
            };
            self.buffer.insert_row(self.cursor_y + 1, tail);
            self.buffer.row_truncate(self.cursor_y, self.cursor_x);
        }
        self.cursor_y += 1;
        self.cursor_x = 0;

        if total > 0 {
            let mut prefix = indent_bytes;
            prefix.extend(std::iter::repeat_n(b' ', extra));
            self.buffer.row_insert_bytes(self.cursor_y, 0, &prefix);
            self.cursor_x = total;
        }
        self.update_gutter_width();
    }

    /// Leading whitespace of `line` plus the brace bonus: an opening brace
    /// immediately before `col` (skipping whitespace) earns one level.
    fn newline_indent(&self, line: usize, col: usize) -> (Vec<u8>, usize) {
        let Some(row) = self.buffer.row(line) else {
            return (Vec::new(), 0);
        };
        let chars = row.chars();
        let indent: Vec<u8> = chars[..row.indentation()].to_vec();

        let mut check = col.min(chars.len()).saturating_sub(1);
        while check > 0 && chars[check].is_ascii_whitespace() {
            check -= 1;
        }
        let extra = if chars.get(check) == Some(&b'{') {
            INDENT_WIDTH
        } else {
            0
        };
        (indent, extra)
    }

    // --- backspace -------------------------------------------------------

    /// Delete the byte left of the cursor, or merge into the previous row
    /// at column 0. A no-op at `(0, 0)`.
    pub fn delete_char(&mut self) {
        if !self.cursors.is_empty() {
            self.multicursor_delete_char();
            return;
        }
        if self.selection.active {
            self.delete_selection();
            return;
        }
        if self.cursor_y == self.buffer.row_count() {
            return;
        }
        if self.cursor_x == 0 && self.cursor_y == 0 {
            return;
        }

        if self.cursor_x > 0 {
            let byte = self.buffer.row(self.cursor_y).expect("row exists").chars()
                [self.cursor_x - 1];
            let mut entry = self.undo_entry(UndoOp::CharDelete, self.cursor_y, self.cursor_x - 1);
            entry.char_data = Some(byte);
            self.undo.log(entry);

            self.buffer.row_delete_byte(self.cursor_y, self.cursor_x - 1);
            self.cursor_x -= 1;
        } else {
            let prev_len = self.buffer.row_len(self.cursor_y - 1);
            let content = self
                .buffer
                .row(self.cursor_y)
                .expect("row exists")
                .chars()
                .to_vec();

            let mut entry = self.undo_entry(UndoOp::RowDelete, self.cursor_y, prev_len);
            entry.merged = true;
            entry.row_content = Some(content.clone());
            self.undo.log(entry);

            self.cursor_x = prev_len;
            self.buffer.row_append(self.cursor_y - 1, &content);
            self.buffer.delete_row(self.cursor_y);
            self.cursor_y -= 1;
            self.update_gutter_width();
        }
    }

    // --- word deletion ---------------------------------------------------

    /// Backspace a word: skip non-word bytes, then word bytes, delete the
    /// span. At column 0 this degrades to a plain line merge.
    pub fn delete_word_backward(&mut self) {
        if !self.cursors.is_empty() {
            self.multicursor_delete_word_backward();
            return;
        }
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if self.cursor_x == 0 {
            if self.cursor_y > 0 {
                self.delete_char();
            }
            return;
        }

        let target = {
            let chars = self.buffer.row(self.cursor_y).expect("row exists").chars();
            let mut x = self.cursor_x;
            while x > 0 && !is_word_char(chars[x - 1]) {
                x -= 1;
            }
            while x > 0 && is_word_char(chars[x - 1]) {
                x -= 1;
            }
            x
        };
        let span = self.cursor_x - target;
        if span == 0 {
            return;
        }

        self.undo.begin_batch();
        self.delete_span_logged(self.cursor_y, target, span);
        self.undo.end_batch();
        self.cursor_x = target;
    }

    /// Forward-delete a word: skip word bytes, then non-word bytes. At end
    /// of line, merge the next row up.
    pub fn delete_word_forward(&mut self) {
        if !self.cursors.is_empty() {
            self.multicursor_delete_word_forward();
            return;
        }
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        let len = self.current_row_len();
        if self.cursor_x >= len {
            if self.cursor_y + 1 < self.buffer.row_count() {
                self.move_cursor(crate::Move::Right);
                self.delete_char();
            }
            return;
        }

        let target = {
            let chars = self.buffer.row(self.cursor_y).expect("row exists").chars();
            let mut x = self.cursor_x;
            while x < chars.len() && is_word_char(chars[x]) {
                x += 1;
            }
            while x < chars.len() && !is_word_char(chars[x]) {
                x += 1;
            }
            x
        };
        let span = target - self.cursor_x;
        if span == 0 {
            return;
        }

        self.undo.begin_batch();
        self.delete_span_logged(self.cursor_y, self.cursor_x, span);
        self.undo.end_batch();
    }

    /// Delete `span` bytes at `(line, col)`, journaling each one.
    pub(crate) fn delete_span_logged(&mut self, line: usize, col: usize, span: usize) {
        for _ in 0..span {
            let Some(row) = self.buffer.row(line) else { return };
            if col >= row.len() {
                return;
            }
            let byte = row.chars()[col];
            let mut entry = self.undo_entry(UndoOp::CharDelete, line, col);
            entry.char_data = Some(byte);
            self.undo.log(entry);
            self.buffer.row_delete_byte(line, col);
        }
    }

    /// Insert `bytes` at `(line, col)`, journaling each byte as if typed
    /// left to right.
    pub(crate) fn insert_span_logged(&mut self, line: usize, col: usize, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let mut entry = self.undo_entry(UndoOp::CharInsert, line, col + i);
            entry.char_data = Some(byte);
            self.undo.log(entry);
        }
        self.buffer.row_insert_bytes(line, col, bytes);
    }

    // --- multi-cursor batches -------------------------------------------

    fn multicursor_insert_char(&mut self, byte: u8) {
        if self.selection.active {
            self.delete_selection();
        }
        let all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let orig = all.clone();
        let is_primary = self.mark_primary(&all);
        let mut all = all;

        self.undo.begin_batch();
        for cursor in &orig {
            let mut entry = self.undo_entry(UndoOp::CharInsert, cursor.line, cursor.column);
            entry.cursor = (cursor.line, cursor.column);
            entry.char_data = Some(byte);
            self.undo.log(entry);
            self.insert_char_at(cursor.line, cursor.column, byte);
        }

        // Rebase from originals: each cursor advances by the number of
        // same-line insertions at or before its original column.
        for (i, pos) in all.iter_mut().enumerate() {
            let before = orig
                .iter()
                .filter(|o| o.line == orig[i].line && o.column <= orig[i].column)
                .count();
            pos.column = orig[i].column + before;
        }

        // Closing braces unindent each affected line once; cursors on the
        // line shift with the removal.
        if byte == b'}' {
            let mut done: Vec<usize> = Vec::new();
            for i in 0..orig.len() {
                let line = orig[i].line;
                if done.contains(&line) {
                    continue;
                }
                done.push(line);
                let removed = self.auto_unindent_closing_brace(line);
                if removed > 0 {
                    for pos in all.iter_mut().filter(|p| p.line == line) {
                        pos.column = pos.column.saturating_sub(removed);
                    }
                }
            }
        }

        self.undo.end_batch();
        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
    }

    fn multicursor_delete_char(&mut self) {
        if self.selection.active {
            self.delete_selection();
            return;
        }
        let all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let orig = all.clone();
        let is_primary = self.mark_primary(&all);
        let mut all = all;

        let mut line_merged = vec![false; orig.len()];
        let mut prev_line_len = vec![0usize; orig.len()];

        self.undo.begin_batch();
        for i in 0..orig.len() {
            let line = all[i].line;
            let col = all[i].column;
            if line == 0 && col == 0 {
                continue;
            }
            if line >= self.buffer.row_count() {
                continue;
            }

            if col > 0 {
                if col <= self.buffer.row_len(line) {
                    let byte = self.buffer.row(line).expect("row exists").chars()[col - 1];
                    let mut entry = self.undo_entry(UndoOp::CharDelete, line, col - 1);
                    entry.cursor = (line, col);
                    entry.char_data = Some(byte);
                    self.undo.log(entry);
                    self.buffer.row_delete_byte(line, col - 1);
                }
            } else {
                let prev_len = self.buffer.row_len(line - 1);
                prev_line_len[i] = prev_len;
                let content = self
                    .buffer
                    .row(line)
                    .expect("row exists")
                    .chars()
                    .to_vec();

                let mut entry = self.undo_entry(UndoOp::RowDelete, line, prev_len);
                entry.cursor = (line, 0);
                entry.merged = true;
                entry.row_content = Some(content.clone());
                self.undo.log(entry);

                self.buffer.row_append(line - 1, &content);
                self.buffer.delete_row(line);
                line_merged[i] = true;
                all[i].line = line - 1;
                all[i].column = prev_len;

                // Cursors already settled by earlier merges sit at final
                // coordinates, so this merge must shift them directly;
                // unprocessed ones are rebased from their originals below.
                for j in 0..i {
                    if line_merged[j] {
                        if all[j].line == line {
                            all[j].line = line - 1;
                            all[j].column += prev_len;
                        } else if all[j].line > line {
                            all[j].line -= 1;
                        }
                    }
                }
            }
        }
        self.undo.end_batch();
        self.update_gutter_width();

        // Rebase the in-line deletions from originals; merged cursors were
        // already placed above.
        for i in 0..orig.len() {
            let (orig_line, orig_col) = (orig[i].line, orig[i].column);
            if orig_line == 0 && orig_col == 0 {
                continue;
            }
            if line_merged[i] {
                continue;
            }

            let mut deletions_before = 0;
            let mut lines_removed_before = 0;
            for (j, other) in orig.iter().enumerate() {
                if j == i {
                    continue;
                }
                if line_merged[j] {
                    if other.line < orig_line
                        || (other.line == orig_line && other.column < orig_col)
                    {
                        lines_removed_before += 1;
                    }
                } else if other.line == orig_line
                    && other.column > 0
                    && other.column <= orig_col
                {
                    deletions_before += 1;
                }
            }

            all[i].line = orig_line - lines_removed_before;
            all[i].column = orig_col.saturating_sub(1 + deletions_before);
        }

        self.restore_cursors(&all, &is_primary);
        self.clamp_secondaries();
        self.clamp_cursor();
        self.dedup_cursors();
    }

    fn multicursor_insert_newline(&mut self) {
        if self.selection.active {
            self.delete_selection();
        }
        let all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let orig = all.clone();
        let is_primary = self.mark_primary(&all);
        let mut all = all;

        // Indentation is decided from the original rows before any splice
        // changes them.
        let new_indents: Vec<usize> = orig
            .iter()
            .map(|c| {
                if c.line >= self.buffer.row_count() {
                    0
                } else {
                    let row = self.buffer.row(c.line).expect("row exists");
                    let extra = if row.ends_with_opening_brace() {
                        INDENT_WIDTH
                    } else {
                        0
                    };
                    row.indentation() + extra
                }
            })
            .collect();

        self.undo.begin_batch();
        for cursor in &orig {
            let applied = self.insert_newline_at(cursor.line, cursor.column);
            let mut entry = if cursor.column == 0 {
                let mut e = self.undo_entry(UndoOp::RowInsert, cursor.line, 0);
                e.row_content = Some(Vec::new());
                e
            } else {
                self.undo_entry(UndoOp::RowSplit, cursor.line, cursor.column)
            };
            entry.cursor = (cursor.line, cursor.column);
            entry.indent = applied;
            self.undo.log(entry);
        }
        self.undo.end_batch();

        // Rebase: every earlier newline pushes this cursor one row down;
        // the cursor itself lands on its new row at the indent column.
        for i in 0..orig.len() {
            let (orig_line, orig_col) = (orig[i].line, orig[i].column);
            let lines_inserted_before = orig
                .iter()
                .filter(|o| {
                    o.line < orig_line || (o.line == orig_line && o.column < orig_col)
                })
                .count();
            all[i].line = orig_line + 1 + lines_inserted_before;
            all[i].column = new_indents[i];
        }

        self.restore_cursors(&all, &is_primary);
        self.clamp_secondaries();
        self.clamp_cursor();
        self.dedup_cursors();
    }

    fn multicursor_delete_word_backward(&mut self) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let is_primary = self.mark_primary(&all);

        self.undo.begin_batch();
        for i in 0..all.len() {
            let line = all[i].line;
            let col = all[i].column;
            if line >= self.buffer.row_count() {
                continue;
            }

            if col == 0 {
                if line == 0 {
                    continue;
                }
                let prev_len = self.buffer.row_len(line - 1);
                let content = self
                    .buffer
                    .row(line)
                    .expect("row exists")
                    .chars()
                    .to_vec();
                let mut entry = self.undo_entry(UndoOp::RowDelete, line, prev_len);
                entry.cursor = (line, 0);
                entry.merged = true;
                entry.row_content = Some(content.clone());
                self.undo.log(entry);

                self.buffer.row_append(line - 1, &content);
                self.buffer.delete_row(line);
                all[i].line = line - 1;
                all[i].column = prev_len;
                for (j, other) in all.iter_mut().enumerate() {
                    if j != i && other.line > line {
                        other.line -= 1;
                    }
                }
                continue;
            }

            let target = {
                let chars = self.buffer.row(line).expect("row exists").chars();
                let mut x = col;
                while x > 0 && !is_word_char(chars[x - 1]) {
                    x -= 1;
                }
                while x > 0 && is_word_char(chars[x - 1]) {
                    x -= 1;
                }
                x
            };
            let span = col - target;
            if span == 0 {
                continue;
            }
            self.delete_span_logged(line, target, span);
            all[i].column = target;
        }
        self.undo.end_batch();
        self.update_gutter_width();

        self.restore_cursors(&all, &is_primary);
        self.clamp_secondaries();
        self.clamp_cursor();
        self.dedup_cursors();
    }

    fn multicursor_delete_word_forward(&mut self) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let is_primary = self.mark_primary(&all);

        self.undo.begin_batch();
        for i in 0..all.len() {
            let line = all[i].line;
            let col = all[i].column;
            if line >= self.buffer.row_count() {
                continue;
            }

            let len = self.buffer.row_len(line);
            if col >= len {
                if line + 1 < self.buffer.row_count() {
                    let prev_len = len;
                    let content = self
                        .buffer
                        .row(line + 1)
                        .expect("row exists")
                        .chars()
                        .to_vec();
                    let mut entry = self.undo_entry(UndoOp::RowDelete, line + 1, prev_len);
                    entry.cursor = (line, col);
                    entry.merged = true;
                    entry.row_content = Some(content.clone());
                    self.undo.log(entry);

                    self.buffer.row_append(line, &content);
                    self.buffer.delete_row(line + 1);
                    all[i].column = prev_len;
                    for (j, other) in all.iter_mut().enumerate() {
                        if j == i {
                            continue;
                        }
                        if other.line > line + 1 {
                            other.line -= 1;
                        } else if other.line == line + 1 {
                            other.line = line;
                            other.column += prev_len;
                        }
                    }
                }
                continue;
            }

            let target = {
                let chars = self.buffer.row(line).expect("row exists").chars();
                let mut x = col;
                while x < chars.len() && is_word_char(chars[x]) {
                    x += 1;
                }
                while x < chars.len() && !is_word_char(chars[x]) {
                    x += 1;
                }
                x
            };
            let span = target - col;
            if span == 0 {
                continue;
            }
            self.delete_span_logged(line, col, span);
            // Column stays put; bytes vanished to the right.
        }
        self.undo.end_batch();
        self.update_gutter_width();

        self.restore_cursors(&all, &is_primary);
        self.clamp_secondaries();
        self.clamp_cursor();
        self.dedup_cursors();
    }
}
