//! Grouped, bounded undo journal.
//!
//! Every mutating operation appends entries describing enough of the
//! pre-edit state to invert it exactly. Entries belong to *groups*: a group
//! is what one undo or redo press peels. Grouping policy:
//! * entries within 500 ms of the previous log join the current group;
//! * row-insert, row-delete, row-split, selection-delete and paste entries
//!   force a fresh group;
//! * a *batch* (multi-cursor edit, line operation, comment toggle, reflow)
//!   forces a fresh group once up front and suppresses the per-kind force
//!   for the entries it contains, so the whole batch undoes atomically.
//!
//! The journal is bounded: past [`UNDO_MAX_ENTRIES`] the oldest quarter is
//! dropped, rounded up to a group boundary so no group is ever split.

use crate::EditorState;
use std::time::{Duration, Instant};
use tracing::trace;

pub const UNDO_MAX_ENTRIES: usize = 10_000;
pub const UNDO_GROUP_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOp {
    CharInsert,
    CharDelete,
    CharDeleteForward,
    RowInsert,
    RowDelete,
    RowSplit,
    SelectionDelete,
    Paste,
}

impl UndoOp {
    /// Structural edits always open a fresh group (outside a batch).
    fn forces_group(self) -> bool {
        matches!(
            self,
            UndoOp::RowInsert
                | UndoOp::RowDelete
                | UndoOp::RowSplit
                | UndoOp::SelectionDelete
                | UndoOp::Paste
        )
    }
}

/// One journal entry. Field use by kind:
/// * char ops: `row_idx`/`char_pos` locate the byte, `char_data` holds it;
/// * row-insert: `row_content` is the inserted row, `indent` the bytes
///   prepended to the row below it (newline auto-indent);
/// * row-split: `char_pos` is the split column, `indent` as above;
/// * row-delete: `row_content` is the removed row; `merged` distinguishes a
///   line merge (`char_pos` = merge column on the surviving row) from a
///   plain deletion;
/// * selection-delete / paste: `cursor`..`end` span the range, `multi_line`
///   the payload.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub group: u64,
    pub op: UndoOp,
    pub cursor: (usize, usize),
    pub row_idx: usize,
    pub char_pos: usize,
    pub char_data: Option<u8>,
    pub row_content: Option<Vec<u8>>,
    pub indent: usize,
    pub merged: bool,
    pub end: (usize, usize),
    pub multi_line: Option<Vec<u8>>,
}

impl UndoEntry {
    fn new(op: UndoOp, cursor: (usize, usize), row_idx: usize, char_pos: usize) -> Self {
        Self {
            group: 0,
            op,
            cursor,
            row_idx,
            char_pos,
            char_data: None,
            row_content: None,
            indent: 0,
            merged: false,
            end: (0, 0),
            multi_line: None,
        }
    }
}

pub struct UndoLog {
    entries: Vec<UndoEntry>,
    group_id: u64,
    /// Redo position: groups above it are redoable, at or below undoable.
    position: u64,
    last_edit: Instant,
    /// True while undo/redo replays edits, so they do not log themselves.
    suspended: bool,
    batch: bool,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            group_id: 0,
            position: 0,
            last_edit: Instant::now(),
            suspended: false,
            batch: false,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn top_group(&self) -> u64 {
        self.group_id
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub(crate) fn suspend(&mut self) {
        self.suspended = true;
    }

    pub(crate) fn resume(&mut self) {
        self.suspended = false;
    }

    /// Open a batch: one forced group for a compound operation.
    pub fn begin_batch(&mut self) {
        if self.suspended {
            return;
        }
        self.clear_redo();
        self.group_id += 1;
        self.position = self.group_id;
        self.batch = true;
        self.last_edit = Instant::now();
    }

    pub fn end_batch(&mut self) {
        self.batch = false;
    }

    /// Classic redo truncation: any edit while redoable groups exist
    /// discards every entry above the redo position.
    fn clear_redo(&mut self) {
        if self.position >= self.group_id {
            return;
        }
        let cutoff = self.position;
        self.entries.retain(|e| e.group <= cutoff);
        self.group_id = self.position;
        trace!(target: "state.undo", position = self.position, "redo_truncated");
    }

    fn maybe_start_group(&mut self, force: bool, now: Instant) {
        if force
            || self.group_id == 0
            || now.duration_since(self.last_edit) > UNDO_GROUP_TIMEOUT
        {
            self.group_id += 1;
            self.position = self.group_id;
        }
        self.last_edit = now;
    }

    pub fn log(&mut self, entry: UndoEntry) {
        self.log_at(entry, Instant::now());
    }

    /// Timestamped variant so tests can drive the grouping clock.
    pub fn log_at(&mut self, mut entry: UndoEntry, now: Instant) {
        if self.suspended {
            return;
        }
        self.clear_redo();
        if self.batch {
            self.last_edit = now;
        } else {
            self.maybe_start_group(entry.op.forces_group(), now);
        }

        if self.entries.len() >= UNDO_MAX_ENTRIES {
            // Drop the oldest quarter, extended to a whole group.
            let mut cut = self.entries.len() / 4;
            while cut < self.entries.len()
                && self.entries[cut].group == self.entries[cut - 1].group
            {
                cut += 1;
            }
            self.entries.drain(..cut);
            trace!(target: "state.undo", dropped = cut, "journal_trimmed");
        }

        entry.group = self.group_id;
        self.position = self.group_id;
        trace!(target: "state.undo", group = entry.group, op = ?entry.op, depth = self.entries.len() + 1, "log");
        self.entries.push(entry);
    }

    fn group_entries(&self, group: u64) -> Vec<UndoEntry> {
        self.entries
            .iter()
            .filter(|e| e.group == group)
            .cloned()
            .collect()
    }
}

impl EditorState {
    /// Convenience constructor used by the editing operations.
    pub(crate) fn undo_entry(
        &self,
        op: UndoOp,
        row_idx: usize,
        char_pos: usize,
    ) -> UndoEntry {
        UndoEntry::new(op, (self.cursor_y, self.cursor_x), row_idx, char_pos)
    }

    /// Peel the top group, applying the inverse of each entry in reverse
    /// order. Reports "Nothing to undo" past the origin.
    pub fn undo(&mut self) {
        // Batches that ended up logging nothing leave empty groups; skip
        // them so one keypress always peels a real edit.
        let mut target = self.undo.position;
        let mut group: Vec<UndoEntry> = Vec::new();
        while target > 0 {
            group = self.undo.group_entries(target);
            if !group.is_empty() {
                break;
            }
            target -= 1;
            self.undo.position = target;
        }
        if target == 0 || group.is_empty() {
            self.set_status("Nothing to undo");
            return;
        }

        self.undo.suspend();
        let mut restore: Option<(usize, usize)> = None;
        for entry in group.iter().rev() {
            if restore.is_none() {
                restore = Some(entry.cursor);
            }
            self.apply_inverse(entry);
        }
        self.undo.resume();

        if let Some((row, col)) = restore {
            self.cursor_y = row;
            self.cursor_x = col;
            self.clamp_cursor();
        }
        self.undo.position -= 1;
        let n = group.len();
        trace!(target: "state.undo", group = target, ops = n, "undo");
        self.set_status(format!(
            "Undo ({n} operation{})",
            if n == 1 { "" } else { "s" }
        ));
    }

    /// Replay the next group forward.
    pub fn redo(&mut self) {
        let mut group: Vec<UndoEntry> = Vec::new();
        while self.undo.position < self.undo.group_id {
            self.undo.position += 1;
            group = self.undo.group_entries(self.undo.position);
            if !group.is_empty() {
                break;
            }
        }
        if group.is_empty() {
            self.set_status("Nothing to redo");
            return;
        }
        let target = self.undo.position;

        self.undo.suspend();
        let mut last: Option<(usize, usize)> = None;
        for entry in &group {
            last = Some(self.apply_forward(entry));
        }
        self.undo.resume();

        if let Some((row, col)) = last {
            self.cursor_y = row;
            self.cursor_x = col;
            self.clamp_cursor();
        }
        let n = group.len();
        trace!(target: "state.undo", group = target, ops = n, "redo");
        self.set_status(format!(
            "Redo ({n} operation{})",
            if n == 1 { "" } else { "s" }
        ));
    }

    fn apply_inverse(&mut self, entry: &UndoEntry) {
        match entry.op {
            UndoOp::CharInsert => {
                if entry.char_pos < self.buffer.row_len(entry.row_idx) {
                    self.buffer.row_delete_byte(entry.row_idx, entry.char_pos);
                }
            }
            UndoOp::CharDelete | UndoOp::CharDeleteForward => {
                if let Some(byte) = entry.char_data {
                    self.buffer
                        .row_insert_byte(entry.row_idx, entry.char_pos, byte);
                }
            }
            UndoOp::RowInsert => {
                if entry.indent > 0 {
                    self.buffer
                        .row_remove_span(entry.row_idx + 1, 0, entry.indent);
                }
                self.buffer.delete_row(entry.row_idx);
            }
            UndoOp::RowSplit => {
                let successor = entry.row_idx + 1;
                if successor < self.buffer.row_count() {
                    if entry.indent > 0 {
                        self.buffer.row_remove_span(successor, 0, entry.indent);
                    }
                    let tail = self
                        .buffer
                        .row(successor)
                        .map(|r| r.chars().to_vec())
                        .unwrap_or_default();
                    self.buffer.row_append(entry.row_idx, &tail);
                    self.buffer.delete_row(successor);
                }
            }
            UndoOp::RowDelete => {
                if entry.merged {
                    // Restore by splitting the surviving row at the
                    // recorded merge column; the payload is the tail.
                    let prev = entry.row_idx.saturating_sub(1);
                    self.buffer.row_truncate(prev, entry.char_pos);
                    self.buffer.insert_row(
                        entry.row_idx,
                        entry.row_content.clone().unwrap_or_default(),
                    );
                } else {
                    self.buffer.insert_row(
                        entry.row_idx,
                        entry.row_content.clone().unwrap_or_default(),
                    );
                }
            }
            UndoOp::SelectionDelete => {
                if let Some(payload) = &entry.multi_line {
                    let payload = payload.clone();
                    self.insert_text_raw(entry.cursor, &payload);
                }
            }
            UndoOp::Paste => {
                self.delete_range(entry.cursor, entry.end);
            }
        }
    }

    /// Re-apply one entry; returns the cursor position after it.
    fn apply_forward(&mut self, entry: &UndoEntry) -> (usize, usize) {
        match entry.op {
            UndoOp::CharInsert => {
                if let Some(byte) = entry.char_data {
                    self.buffer
                        .row_insert_byte(entry.row_idx, entry.char_pos, byte);
                }
                (entry.row_idx, entry.char_pos + 1)
            }
            UndoOp::CharDelete | UndoOp::CharDeleteForward => {
                if entry.char_pos < self.buffer.row_len(entry.row_idx) {
                    self.buffer.row_delete_byte(entry.row_idx, entry.char_pos);
                }
                (entry.row_idx, entry.char_pos)
            }
            UndoOp::RowInsert => {
                self.buffer.insert_row(
                    entry.row_idx,
                    entry.row_content.clone().unwrap_or_default(),
                );
                if entry.indent > 0 {
                    let indent = vec![b' '; entry.indent];
                    self.buffer.row_insert_bytes(entry.row_idx + 1, 0, &indent);
                    return (entry.row_idx + 1, entry.indent);
                }
                entry.cursor
            }
            UndoOp::RowSplit => {
                let tail = self
                    .buffer
                    .row(entry.row_idx)
                    .map(|r| r.chars().get(entry.char_pos.min(r.len())..).unwrap_or_default().to_vec())
                    .unwrap_or_default();
                self.buffer.insert_row(entry.row_idx + 1, tail);
                self.buffer.row_truncate(entry.row_idx, entry.char_pos);
                if entry.indent > 0 {
                    let indent = vec![b' '; entry.indent];
                    self.buffer.row_insert_bytes(entry.row_idx + 1, 0, &indent);
                }
                (entry.row_idx + 1, entry.indent)
            }
            UndoOp::RowDelete => {
                if entry.merged {
                    let prev = entry.row_idx.saturating_sub(1);
                    let content = self
                        .buffer
                        .row(entry.row_idx)
                        .map(|r| r.chars().to_vec())
                        .unwrap_or_default();
                    self.buffer.row_append(prev, &content);
                    self.buffer.delete_row(entry.row_idx);
                    (prev, entry.char_pos)
                } else {
                    self.buffer.delete_row(entry.row_idx);
                    entry.cursor
                }
            }
            UndoOp::SelectionDelete => {
                self.delete_range(entry.cursor, entry.end);
                entry.cursor
            }
            UndoOp::Paste => {
                if let Some(payload) = &entry.multi_line {
                    let payload = payload.clone();
                    self.insert_text_raw(entry.cursor, &payload);
                }
                entry.end
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(op: UndoOp) -> UndoEntry {
        UndoEntry::new(op, (0, 0), 0, 0)
    }

    #[test]
    fn close_edits_share_a_group() {
        let mut log = UndoLog::new();
        let t0 = Instant::now();
        log.log_at(entry(UndoOp::CharInsert), t0);
        log.log_at(entry(UndoOp::CharInsert), t0 + Duration::from_millis(100));
        log.log_at(entry(UndoOp::CharInsert), t0 + Duration::from_millis(200));
        assert_eq!(log.top_group(), 1);

        // A one-second pause opens a second group.
        log.log_at(entry(UndoOp::CharInsert), t0 + Duration::from_millis(1300));
        assert_eq!(log.top_group(), 2);
        assert_eq!(log.entries()[2].group, 1);
        assert_eq!(log.entries()[3].group, 2);
    }

    #[test]
    fn structural_ops_force_groups() {
        let mut log = UndoLog::new();
        let t0 = Instant::now();
        log.log_at(entry(UndoOp::CharInsert), t0);
        log.log_at(entry(UndoOp::RowSplit), t0);
        log.log_at(entry(UndoOp::CharInsert), t0);
        assert_eq!(log.entries()[0].group, 1);
        assert_eq!(log.entries()[1].group, 2);
        assert_eq!(log.entries()[2].group, 2); // rejoins within 500 ms
    }

    #[test]
    fn batch_suppresses_structural_forcing() {
        let mut log = UndoLog::new();
        let t0 = Instant::now();
        log.begin_batch();
        log.log_at(entry(UndoOp::RowSplit), t0);
        log.log_at(entry(UndoOp::RowSplit), t0);
        log.log_at(entry(UndoOp::CharInsert), t0);
        log.end_batch();
        let groups: Vec<u64> = log.entries().iter().map(|e| e.group).collect();
        assert_eq!(groups, vec![1, 1, 1]);
    }

    #[test]
    fn redo_truncation_discards_future_groups() {
        let mut log = UndoLog::new();
        let t0 = Instant::now();
        log.log_at(entry(UndoOp::CharInsert), t0);
        log.log_at(entry(UndoOp::CharInsert), t0 + Duration::from_secs(1));
        assert_eq!(log.top_group(), 2);

        // Rewind both groups, then log a fresh edit.
        log.position = 0;
        log.log_at(entry(UndoOp::CharInsert), t0 + Duration::from_secs(2));
        assert_eq!(log.entry_count(), 1);
        assert_eq!(log.top_group(), 1);
        assert_eq!(log.position(), 1);
    }

    #[test]
    fn journal_trim_respects_group_boundaries() {
        let mut log = UndoLog::new();
        let t0 = Instant::now();
        for i in 0..UNDO_MAX_ENTRIES {
            // Two entries per group via 1 s spacing every other entry.
            log.log_at(
                entry(UndoOp::CharInsert),
                t0 + Duration::from_secs((i / 2) as u64 * 2),
            );
        }
        log.log_at(entry(UndoOp::CharInsert), t0 + Duration::from_secs(20_000));
        assert!(log.entry_count() < UNDO_MAX_ENTRIES);
        // The first surviving group kept both of its entries.
        let first = log.entries()[0].group;
        let kept = log.entries().iter().filter(|e| e.group == first).count();
        assert_eq!(kept, 2);
    }

    #[test]
    fn suspended_log_drops_entries() {
        let mut log = UndoLog::new();
        log.suspend();
        log.log(entry(UndoOp::CharInsert));
        assert_eq!(log.entry_count(), 0);
        log.resume();
        log.log(entry(UndoOp::CharInsert));
        assert_eq!(log.entry_count(), 1);
    }
}
