//! Whole-line operations: duplicate, delete, move, join.
//!
//! With multiple cursors each unique row is operated on once; cursors on an
//! affected row move with it (clamped to its length) and cursors below
//! shift by the row delta. Every operation journals as one batch.

use crate::{EditorState, UndoOp};

impl EditorState {
    /// Copy the current row in below itself; the cursor follows down.
    pub fn duplicate_line(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_duplicate_line();
            return;
        }

        let content = self
            .buffer
            .row(self.cursor_y)
            .expect("row exists")
            .chars()
            .to_vec();
        let mut entry = self.undo_entry(UndoOp::RowInsert, self.cursor_y + 1, 0);
        entry.row_content = Some(content.clone());
        self.undo.log(entry);

        self.buffer.insert_row(self.cursor_y + 1, content);
        self.cursor_y += 1;
        self.update_gutter_width();
    }

    /// Remove the current row outright; the cursor clamps to what remains.
    pub fn delete_line(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_delete_line();
            return;
        }

        self.log_plain_row_delete(self.cursor_y);
        self.buffer.delete_row(self.cursor_y);
        self.clamp_cursor();
        if self.buffer.is_empty() {
            self.cursor_x = 0;
        }
        self.update_gutter_width();
    }

    /// Append the next row to this one, inserting a single separating
    /// space unless either side already provides one. Cursor lands on the
    /// join point.
    pub fn join_lines(&mut self) {
        if self.buffer.row_count() < 2 || self.cursor_y >= self.buffer.row_count() - 1 {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_join_lines();
            return;
        }

        self.undo.begin_batch();
        let join_pos = self.join_one_line(self.cursor_y);
        self.undo.end_batch();
        self.cursor_x = join_pos;
        self.update_gutter_width();
    }

    /// Swap the current row with the one above; the cursor follows.
    pub fn move_line_up(&mut self) {
        if self.cursor_y == 0 || self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_move_line(true);
            return;
        }

        self.undo.begin_batch();
        self.log_row_move(self.cursor_y, self.cursor_y - 1);
        self.undo.end_batch();
        self.buffer.swap_rows(self.cursor_y, self.cursor_y - 1);
        self.cursor_y -= 1;
    }

    /// Swap the current row with the one below; the cursor follows.
    pub fn move_line_down(&mut self) {
        if self.buffer.row_count() == 0 || self.cursor_y >= self.buffer.row_count() - 1 {
            return;
        }
        if !self.cursors.is_empty() {
            self.multicursor_move_line(false);
            return;
        }

        self.undo.begin_batch();
        self.log_row_move(self.cursor_y, self.cursor_y + 1);
        self.undo.end_batch();
        self.buffer.swap_rows(self.cursor_y, self.cursor_y + 1);
        self.cursor_y += 1;
    }

    // --- shared pieces ---------------------------------------------------

    fn log_plain_row_delete(&mut self, line: usize) {
        let content = self
            .buffer
            .row(line)
            .map(|r| r.chars().to_vec())
            .unwrap_or_default();
        let mut entry = self.undo_entry(UndoOp::RowDelete, line, 0);
        entry.row_content = Some(content);
        self.undo.log(entry);
    }

    /// A row move is journaled as remove-at-`from` plus insert-at-`to`.
    fn log_row_move(&mut self, from: usize, to: usize) {
        let content = self
            .buffer
            .row(from)
            .map(|r| r.chars().to_vec())
            .unwrap_or_default();
        let mut remove = self.undo_entry(UndoOp::RowDelete, from, 0);
        remove.row_content = Some(content.clone());
        self.undo.log(remove);
        let mut insert = self.undo_entry(UndoOp::RowInsert, to, 0);
        insert.row_content = Some(content);
        self.undo.log(insert);
    }

    /// Join `line` with its successor. Returns the join column (where the
    /// appended text begins, after any inserted space). Journals into the
    /// current batch.
    fn join_one_line(&mut self, line: usize) -> usize {
        let mut join_pos = self.buffer.row_len(line);
        let needs_space = {
            let current = self.buffer.row(line).expect("row exists");
            let next = self.buffer.row(line + 1).expect("row exists");
            !current.is_empty()
                && !next.is_empty()
                && current.chars()[current.len() - 1] != b' '
                && next.chars()[0] != b' '
        };
        if needs_space {
            let mut entry = self.undo_entry(UndoOp::CharInsert, line, join_pos);
            entry.char_data = Some(b' ');
            self.undo.log(entry);
            self.buffer.row_append(line, b" ");
            join_pos += 1;
        }

        let content = self
            .buffer
            .row(line + 1)
            .expect("row exists")
            .chars()
            .to_vec();
        let mut entry = self.undo_entry(UndoOp::RowDelete, line + 1, join_pos);
        entry.merged = true;
        entry.row_content = Some(content.clone());
        self.undo.log(entry);

        self.buffer.row_append(line, &content);
        self.buffer.delete_row(line + 1);
        join_pos
    }

    // --- multi-cursor variants ------------------------------------------

    fn multicursor_duplicate_line(&mut self) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let is_primary = self.mark_primary(&all);
        // Unique rows come from the pre-edit snapshot so a row with two
        // cursors on it is still duplicated only once.
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        for i in 0..all.len() {
            let line = targets[i];
            if line == last_line || line >= self.buffer.row_count() {
                continue;
            }

            let content = self
                .buffer
                .row(line)
                .expect("row exists")
                .chars()
                .to_vec();
            let len = content.len();
            let mut entry = self.undo_entry(UndoOp::RowInsert, line + 1, 0);
            entry.cursor = (line, all[i].column);
            entry.row_content = Some(content.clone());
            self.undo.log(entry);
            self.buffer.insert_row(line + 1, content);

            for pos in all.iter_mut() {
                if pos.line > line {
                    pos.line += 1;
                }
            }
            for pos in all.iter_mut() {
                if pos.line == line {
                    pos.line = line + 1;
                    pos.column = pos.column.min(len);
                }
            }
            last_line = line;
        }
        self.undo.end_batch();
        self.update_gutter_width();

        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
    }

    fn multicursor_delete_line(&mut self) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let is_primary = self.mark_primary(&all);
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        for i in 0..all.len() {
            let line = targets[i];
            if line == last_line || line >= self.buffer.row_count() {
                continue;
            }
            self.log_plain_row_delete(line);
            self.buffer.delete_row(line);

            let count = self.buffer.row_count();
            for pos in all.iter_mut() {
                if pos.line > line {
                    pos.line -= 1;
                } else if pos.line == line {
                    let target = line.min(count.saturating_sub(1));
                    pos.line = target;
                    let len = if count == 0 { 0 } else { self.buffer.row_len(target) };
                    pos.column = pos.column.min(len);
                }
            }
            last_line = line;
        }
        self.undo.end_batch();
        self.update_gutter_width();

        self.restore_cursors(&all, &is_primary);
        self.clamp_secondaries();
        self.clamp_cursor();
        self.dedup_cursors();
    }

    fn multicursor_join_lines(&mut self) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let is_primary = self.mark_primary(&all);
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        for i in 0..all.len() {
            let line = targets[i];
            if line == last_line {
                continue;
            }
            if self.buffer.row_count() < 2 || line >= self.buffer.row_count() - 1 {
                continue;
            }

            let join_pos = self.join_one_line(line);
            let new_len = self.buffer.row_len(line);

            for pos in all.iter_mut() {
                if pos.line == line {
                    pos.column = pos.column.min(new_len);
                } else if pos.line == line + 1 {
                    pos.line = line;
                    pos.column = (join_pos + pos.column).min(new_len);
                } else if pos.line > line + 1 {
                    pos.line -= 1;
                }
            }
            last_line = line;
        }
        self.undo.end_batch();
        self.update_gutter_width();

        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
    }

    /// Move every unique cursor row one step up or down. Rows are visited
    /// top-first when moving up and bottom-first when moving down so a
    /// block of cursors shifts coherently.
    fn multicursor_move_line(&mut self, up: bool) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), !up);
        let is_primary = self.mark_primary(&all);
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        for i in 0..all.len() {
            let line = targets[i];
            if line == last_line || line >= self.buffer.row_count() {
                continue;
            }
            let neighbor = if up {
                if line == 0 {
                    continue;
                }
                line - 1
            } else {
                if line + 1 >= self.buffer.row_count() {
                    continue;
                }
                line + 1
            };

            self.log_row_move(line, neighbor);
            self.buffer.swap_rows(line, neighbor);

            for pos in all.iter_mut() {
                if pos.line == line {
                    pos.line = neighbor;
                } else if pos.line == neighbor {
                    pos.line = line;
                }
            }
            last_line = line;
        }
        self.undo.end_batch();

        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
    }
}
