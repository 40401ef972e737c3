//! Clipboard: one internal string plus the external program bridge.
//!
//! Copy pipes through `xsel --clipboard --input`, falling back to
//! `xclip -selection clipboard`; paste reads the inverse direction. A
//! missing bridge is silent; the internal clipboard keeps working. The
//! last synced content is remembered so an externally-changed system
//! clipboard is imported before paste (smart merge).

use crate::{EditorState, SelectionMode, UndoOp};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Default)]
pub struct Clipboard {
    content: Option<Vec<u8>>,
    mode: SelectionMode,
    last_system_sync: Option<Vec<u8>>,
}

impl Clipboard {
    pub fn store(&mut self, content: Vec<u8>, mode: SelectionMode) {
        self.sync_to_system(&content);
        self.content = Some(content);
        self.mode = mode;
    }

    pub fn latest(&self) -> Option<(&[u8], SelectionMode)> {
        self.content.as_deref().map(|c| (c, self.mode))
    }

    /// Push `content` out through xsel/xclip; failures are silent.
    fn sync_to_system(&mut self, content: &[u8]) {
        if write_to_bridge("xsel", &["--clipboard", "--input"], content).is_err()
            && write_to_bridge("xclip", &["-selection", "clipboard"], content).is_err()
        {
            debug!(target: "clipboard", "system_bridge_unavailable");
        }
        self.last_system_sync = Some(content.to_vec());
    }

    /// Read the system clipboard; `None` when empty or unavailable.
    fn read_from_system(&self) -> Option<Vec<u8>> {
        let out = read_from_bridge("xsel", &["--clipboard", "--output"])
            .or_else(|| read_from_bridge("xclip", &["-selection", "clipboard", "-o"]))?;
        if out.is_empty() { None } else { Some(out) }
    }

    /// If the system clipboard changed since our last sync, import it as
    /// the current content.
    pub fn smart_merge(&mut self) {
        let Some(system) = self.read_from_system() else {
            return;
        };
        if self.last_system_sync.as_deref() != Some(&system[..]) {
            self.last_system_sync = Some(system.clone());
            self.content = Some(system);
            self.mode = SelectionMode::Char;
        }
    }
}

fn write_to_bridge(program: &str, args: &[&str], content: &[u8]) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(content)?;
    }
    child.wait()?;
    Ok(())
}

fn read_from_bridge(program: &str, args: &[&str]) -> Option<Vec<u8>> {
    let output = Command::new(program)
        .args(args)
        .stderr(Stdio::null())
        .output()
        .ok()?;
    output.status.success().then_some(output.stdout)
}

impl EditorState {
    /// Copy the selection to the clipboard (internal and system).
    pub fn copy(&mut self) {
        if !self.selection.active {
            return;
        }
        let text = self.selected_text();
        if text.is_empty() {
            return;
        }
        let length = text.len();
        self.clipboard.store(text, self.selection.mode);
        self.set_status(format!("Copied {length} chars"));
    }

    /// Copy then delete the selection.
    pub fn cut(&mut self) {
        if !self.selection.active {
            return;
        }
        self.copy();
        self.delete_selection();
        self.set_status("Cut to clipboard");
    }

    /// Paste the clipboard at the cursor (or at every cursor) as a literal
    /// splice; no auto-indent is applied to pasted text. A selection is
    /// replaced first.
    pub fn paste(&mut self) {
        self.clipboard.smart_merge();
        let Some((text, _)) = self.clipboard.latest() else {
            self.set_status("Clipboard empty");
            return;
        };
        let text = text.to_vec();

        if self.selection.active {
            self.delete_selection();
        }

        if self.cursors.is_empty() {
            let start = (self.cursor_y, self.cursor_x);
            let end = self.insert_text_raw(start, &text);

            let mut entry = self.undo_entry(UndoOp::Paste, start.0, start.1);
            entry.cursor = start;
            entry.end = end;
            entry.multi_line = Some(text);
            self.undo.log(entry);

            self.cursor_y = end.0;
            self.cursor_x = end.1;
        } else {
            self.multicursor_paste(&text);
        }
        self.set_status("Pasted");
    }

    /// Splice the text at every cursor, end of file first, one `paste`
    /// entry per cursor inside a single batch. Cursors rebase from their
    /// originals: each lands at the end of its own copy, shifted by the
    /// rows and columns earlier copies added.
    fn multicursor_paste(&mut self, text: &[u8]) {
        let all = self
            .cursors
            .collect_all((self.cursor_y, self.cursor_x), true);
        let orig = all.clone();
        let is_primary = self.mark_primary(&all);
        let mut all = all;

        let added_lines = text.iter().filter(|&&b| b == b'\n').count();
        let last_segment_len = text
            .rsplit(|&b| b == b'\n')
            .next()
            .map_or(0, <[u8]>::len);

        self.undo.begin_batch();
        for cursor in &orig {
            let start = (cursor.line, cursor.column);
            let end = self.insert_text_raw(start, text);
            let mut entry = self.undo_entry(UndoOp::Paste, start.0, start.1);
            entry.cursor = start;
            entry.end = end;
            entry.multi_line = Some(text.to_vec());
            self.undo.log(entry);
        }
        self.undo.end_batch();

        for i in 0..orig.len() {
            let earlier = orig
                .iter()
                .filter(|o| {
                    o.line < orig[i].line
                        || (o.line == orig[i].line && o.column < orig[i].column)
                })
                .count();
            let same_line_earlier = orig
                .iter()
                .filter(|o| o.line == orig[i].line && o.column < orig[i].column)
                .count();

            if added_lines == 0 {
                all[i].line = orig[i].line;
                all[i].column =
                    orig[i].column + last_segment_len * (same_line_earlier + 1);
            } else {
                // Each copy at or before this cursor, its own included,
                // pushes it down; its column restarts on its own last
                // pasted segment.
                all[i].line = orig[i].line + added_lines * (earlier + 1);
                all[i].column = last_segment_len;
            }
        }

        self.restore_cursors(&all, &is_primary);
        self.clamp_secondaries();
        self.clamp_cursor();
        self.dedup_cursors();
    }
}
