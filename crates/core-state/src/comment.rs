//! Comment toggles.
//!
//! Multi-cursor toggles decide once for the whole batch: if every affected
//! line is already commented the batch uncomments, otherwise it comments,
//! so mixed selections converge instead of flapping per line. Toggling the
//! same line twice is the identity.

use crate::EditorState;
use core_text::Row;

/// Is `row` line-commented? Returns `(first_nonws, remove_len)` where
/// `remove_len` covers the marker plus one following space when present.
fn line_comment_shape(row: &Row, marker: &[u8]) -> (usize, Option<usize>) {
    let chars = row.chars();
    let mut fnw = 0;
    while fnw < chars.len() && chars[fnw].is_ascii_whitespace() {
        fnw += 1;
    }
    if chars[fnw..].starts_with(marker) {
        let mut remove = marker.len();
        if chars.get(fnw + marker.len()) == Some(&b' ') {
            remove += 1;
        }
        (fnw, Some(remove))
    } else {
        (fnw, None)
    }
}

/// Is `row` wrapped in block markers? Returns start/end removal spans
/// (`position`, `length`), each swallowing one adjacent space.
fn block_comment_shape(
    row: &Row,
    start: &[u8],
    end: &[u8],
) -> Option<((usize, usize), (usize, usize))> {
    let chars = row.chars();
    let mut fnw = 0;
    while fnw < chars.len() && chars[fnw].is_ascii_whitespace() {
        fnw += 1;
    }
    if !chars[fnw..].starts_with(start) {
        return None;
    }
    let start_space = usize::from(chars.get(fnw + start.len()) == Some(&b' '));

    // Walk back over trailing whitespace to find the end marker.
    let mut end_pos = chars.len();
    while end_pos > 0 && chars[end_pos - 1].is_ascii_whitespace() {
        end_pos -= 1;
    }
    if end_pos < end.len() {
        return None;
    }
    let end_start = end_pos - end.len();
    if end_start < fnw + start.len() || !chars[end_start..].starts_with(end) {
        return None;
    }
    let end_space = usize::from(end_start > 0 && chars[end_start - 1] == b' ');

    Some((
        (fnw, start.len() + start_space),
        (end_start - end_space, end.len() + end_space),
    ))
}

impl EditorState {
    /// Toggle the single-line comment marker on the cursor row(s).
    pub fn toggle_line_comment(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        let Some(marker) = self.buffer.language().and_then(|l| l.line_comment) else {
            return;
        };
        let marker = marker.as_bytes().to_vec();

        if !self.cursors.is_empty() {
            self.multicursor_toggle_line_comment(&marker);
            return;
        }

        let (fnw, commented) = line_comment_shape(
            self.buffer.row(self.cursor_y).expect("row exists"),
            &marker,
        );
        self.undo.begin_batch();
        if let Some(remove) = commented {
            self.delete_span_logged(self.cursor_y, fnw, remove);
            if self.cursor_x > fnw {
                self.cursor_x = if self.cursor_x >= fnw + remove {
                    self.cursor_x - remove
                } else {
                    fnw
                };
            }
        } else {
            let mut insert = marker.clone();
            insert.push(b' ');
            self.insert_span_logged(self.cursor_y, fnw, &insert);
            if self.cursor_x >= fnw {
                self.cursor_x += insert.len();
            }
        }
        self.undo.end_batch();
    }

    /// Toggle block-comment markers around the cursor row(s)' content.
    pub fn toggle_block_comment(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        let Some((start, end)) = self.buffer.language().and_then(|l| l.block_comment) else {
            return;
        };
        let (start, end) = (start.as_bytes().to_vec(), end.as_bytes().to_vec());

        if !self.cursors.is_empty() {
            self.multicursor_toggle_block_comment(&start, &end);
            return;
        }

        self.undo.begin_batch();
        self.toggle_block_on_line(self.cursor_y, &start, &end, None);
        self.undo.end_batch();
        self.clamp_cursor();
    }

    /// Comment or uncomment one line. `force` overrides the per-line
    /// decision with the batch decision; cursors in `adjust` shift with
    /// the inserted/removed markers.
    fn toggle_block_on_line(
        &mut self,
        line: usize,
        start: &[u8],
        end: &[u8],
        force_comment: Option<bool>,
    ) -> (usize, usize, usize, usize) {
        let shape = block_comment_shape(self.buffer.row(line).expect("row exists"), start, end);
        let uncomment = match force_comment {
            Some(comment) => !comment && shape.is_some(),
            None => shape.is_some(),
        };

        if uncomment {
            let ((start_pos, start_len), (end_pos, end_len)) = shape.expect("shape present");
            // End marker first so the start span's position stays valid.
            self.delete_span_logged(line, end_pos, end_len);
            self.delete_span_logged(line, start_pos, start_len);
            (start_pos, start_len, end_pos, end_len)
        } else {
            let chars = self.buffer.row(line).expect("row exists").chars();
            let mut fnw = 0;
            while fnw < chars.len() && chars[fnw].is_ascii_whitespace() {
                fnw += 1;
            }
            let mut content_end = chars.len();
            while content_end > fnw && chars[content_end - 1].is_ascii_whitespace() {
                content_end -= 1;
            }

            let mut opener = start.to_vec();
            opener.push(b' ');
            self.insert_span_logged(line, fnw, &opener);

            let mut closer = vec![b' '];
            closer.extend_from_slice(end);
            let insert_at = content_end + opener.len();
            self.insert_span_logged(line, insert_at, &closer);
            (fnw, opener.len(), insert_at, closer.len())
        }
    }

    fn multicursor_toggle_line_comment(&mut self, marker: &[u8]) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), false);
        let is_primary = self.mark_primary(&all);
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        // Batch decision: uncomment only when every line is commented.
        let mut shapes = Vec::with_capacity(all.len());
        let mut all_commented = true;
        for &line in &targets {
            match self.buffer.row(line) {
                Some(row) => {
                    let shape = line_comment_shape(row, marker);
                    if shape.1.is_none() {
                        all_commented = false;
                    }
                    shapes.push(shape);
                }
                None => {
                    all_commented = false;
                    shapes.push((0, None));
                }
            }
        }

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        let mut delta = 0isize;
        for i in 0..all.len() {
            let line = targets[i];
            if line >= self.buffer.row_count() {
                continue;
            }
            let (fnw, commented) = shapes[i];

            if line != last_line {
                delta = 0;
                if all_commented {
                    if let Some(remove) = commented {
                        self.delete_span_logged(line, fnw, remove);
                        delta = -(remove as isize);
                    }
                } else {
                    let mut insert = marker.to_vec();
                    insert.push(b' ');
                    self.insert_span_logged(line, fnw, &insert);
                    delta = insert.len() as isize;
                }
                last_line = line;
            }

            if delta > 0 {
                if all[i].column >= fnw {
                    all[i].column += delta as usize;
                }
            } else if delta < 0 {
                let removed = (-delta) as usize;
                if all[i].column > fnw {
                    all[i].column = if all[i].column >= fnw + removed {
                        all[i].column - removed
                    } else {
                        fnw
                    };
                }
            }
            all[i].column = all[i].column.min(self.buffer.row_len(line));
        }
        self.undo.end_batch();

        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
        self.clamp_cursor();
    }

    fn multicursor_toggle_block_comment(&mut self, start: &[u8], end: &[u8]) {
        let mut all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), false);
        let is_primary = self.mark_primary(&all);
        let targets: Vec<usize> = all.iter().map(|c| c.line).collect();

        let mut all_commented = true;
        for &line in &targets {
            let commented = self
                .buffer
                .row(line)
                .and_then(|r| block_comment_shape(r, start, end))
                .is_some();
            if !commented {
                all_commented = false;
            }
        }

        self.undo.begin_batch();
        let mut last_line = usize::MAX;
        for i in 0..all.len() {
            let line = targets[i];
            if line >= self.buffer.row_count() || line == last_line {
                continue;
            }
            last_line = line;

            let (start_pos, start_len, end_pos, end_len) =
                self.toggle_block_on_line(line, start, end, Some(!all_commented));
            let line_len = self.buffer.row_len(line);

            for pos in all.iter_mut().filter(|p| p.line == line) {
                if all_commented {
                    // Markers removed.
                    if pos.column > end_pos {
                        pos.column = pos.column.saturating_sub(end_len);
                    }
                    if pos.column > start_pos {
                        pos.column = pos.column.saturating_sub(start_len).max(start_pos);
                    }
                } else {
                    // Markers inserted.
                    if pos.column >= start_pos {
                        pos.column += start_len;
                    }
                    if pos.column >= end_pos {
                        pos.column += end_len;
                    }
                }
                pos.column = pos.column.min(line_len);
            }
        }
        self.undo.end_batch();

        self.restore_cursors(&all, &is_primary);
        self.dedup_cursors();
        self.clamp_cursor();
    }
}
