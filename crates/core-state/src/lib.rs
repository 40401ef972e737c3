//! Editor state: the buffer, its cursors, and every editing operation.
//!
//! One `EditorState` instance exists per process. It is created at startup,
//! optionally populated from a file, mutated by dispatched actions, and torn
//! down on exit; nothing else mutates it. All state transitions for one key
//! event complete before the next event is read, so no method here needs to
//! defend against reentrancy.
//!
//! Module map:
//! * [`selection`]: anchor/cursor pair, multi-click detection.
//! * [`cursors`]: secondary cursor set, dedup, positional adjustment.
//! * [`undo`]: grouped, bounded journal of inverse operations.
//! * [`edit`]: char/newline/word edits with multi-cursor rebasing.
//! * [`lines`]: duplicate/delete/move/join line operations.
//! * [`indent`], [`comment`]: indentation and comment toggles.
//! * [`reflow`]: paragraph reflow and unwrap.
//! * [`search`], [`bracket`]: transient match index, pair matcher.
//! * [`view`]: viewport scrolling, resize, tactile scroll speed.
//! * [`clipboard`]: internal clipboard plus the xsel/xclip bridge.

use anyhow::{Context, Result};
use core_text::Buffer;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod bracket;
pub mod clipboard;
pub mod comment;
pub mod cursors;
pub mod edit;
pub mod indent;
pub mod lines;
pub mod reflow;
pub mod search;
pub mod selection;
pub mod undo;
pub mod view;

pub use bracket::BracketState;
pub use clipboard::Clipboard;
pub use cursors::{CursorPos, CursorSet};
pub use search::SearchMatch;
pub use selection::{Selection, SelectionMode};
pub use undo::{UndoLog, UndoOp};
pub use view::{Move, ScrollSpeed};

/// Rows reserved below the text area for the status and message bars.
pub const RESERVED_ROWS: usize = 2;
/// Seconds before a status message fades.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
/// Spaces per indent level.
pub const INDENT_WIDTH: usize = 4;
/// Default column for paragraph reflow.
pub const DEFAULT_WRAP_COLUMN: usize = 80;

/// Message-bar text with its fade timestamp.
#[derive(Debug, Default)]
pub struct StatusMessage {
    pub text: String,
    set_at: Option<Instant>,
}

impl StatusMessage {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Some(Instant::now());
    }

    pub fn visible(&self) -> Option<&str> {
        match self.set_at {
            Some(at) if at.elapsed() < STATUS_TIMEOUT && !self.text.is_empty() => {
                Some(&self.text)
            }
            _ => None,
        }
    }
}

pub struct EditorState {
    pub buffer: Buffer,
    /// File cursor, chars coordinates. `cursor_y == row_count` means one
    /// past the last row; `cursor_x` is clamped on every row transition.
    pub cursor_x: usize,
    pub cursor_y: usize,
    /// Render column of the cursor, refreshed by [`EditorState::scroll`].
    pub render_x: usize,
    /// First visible visual row / render column.
    pub row_offset: usize,
    pub column_offset: usize,
    /// Text-area dimensions (status rows already subtracted).
    pub screen_rows: usize,
    pub screen_columns: usize,
    pub filename: Option<PathBuf>,
    pub status: StatusMessage,
    pub selection: Selection,
    pub cursors: CursorSet,
    pub undo: UndoLog,
    pub search_results: Vec<SearchMatch>,
    pub bracket: BracketState,
    pub clipboard: Clipboard,
    pub show_line_numbers: bool,
    pub gutter_width: usize,
    pub wrap_column: usize,
    pub soft_wrap: bool,
    pub center_scroll: bool,
    pub scroll_speed: ScrollSpeed,
    /// Smart-Home toggle: true only immediately after a Home press.
    pub last_key_was_home: bool,
    pub theme_index: usize,
    /// Number of installed themes; the UI layer sets it at startup.
    pub theme_count: usize,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            buffer: Buffer::new(),
            cursor_x: 0,
            cursor_y: 0,
            render_x: 0,
            row_offset: 0,
            column_offset: 0,
            screen_rows: 24 - RESERVED_ROWS,
            screen_columns: 80,
            filename: None,
            status: StatusMessage::default(),
            selection: Selection::default(),
            cursors: CursorSet::default(),
            undo: UndoLog::new(),
            search_results: Vec::new(),
            bracket: BracketState::default(),
            clipboard: Clipboard::default(),
            show_line_numbers: true,
            gutter_width: 0,
            wrap_column: DEFAULT_WRAP_COLUMN,
            soft_wrap: false,
            center_scroll: true,
            scroll_speed: ScrollSpeed::new(),
            last_key_was_home: false,
            theme_index: 0,
            theme_count: 1,
        }
    }

    /// Test/bootstrap helper: seed the buffer from literal lines.
    pub fn with_rows(lines: &[&str]) -> Self {
        let mut state = Self::new();
        for (i, line) in lines.iter().enumerate() {
            state.buffer.insert_row(i, line.as_bytes().to_vec());
        }
        state.buffer.dirty = 0;
        state.update_gutter_width();
        state
    }

    /// Load a file into the buffer. Missing files are an error at open
    /// time; the caller decides whether that is fatal.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read(path)
            .with_context(|| format!("open {}", path.display()))?;
        self.buffer = Buffer::from_bytes(&content);
        self.filename = Some(path.to_path_buf());
        if let Some(name) = path.to_str() {
            self.buffer.select_language_for(name);
        }
        self.update_gutter_width();
        info!(target: "io", file = %path.display(), lines = self.buffer.row_count(), "file_opened");
        Ok(())
    }

    /// Truncate and rewrite the file (0644 on creation). The caller must
    /// have resolved `filename` first; save-time failures are reported via
    /// the status bar by the dispatch layer and leave the buffer dirty.
    pub fn save(&mut self) -> Result<usize> {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let path = self
            .filename
            .clone()
            .context("no filename set")?;
        let bytes = self.buffer.to_bytes();
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        file.write_all(&bytes)
            .with_context(|| format!("write {}", path.display()))?;
        self.buffer.dirty = 0;
        for row in 0..self.buffer.row_count() {
            if let Some(row) = self.buffer.row_mut(row) {
                row.dirty = false;
            }
        }
        debug!(target: "io", file = %path.display(), bytes = bytes.len(), "file_saved");
        Ok(bytes.len())
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.dirty > 0
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status.set(text);
    }

    /// Length of the row under the cursor (0 past the end).
    pub fn current_row_len(&self) -> usize {
        self.buffer.row_len(self.cursor_y)
    }

    /// Clamp the cursor into buffer bounds after structural edits.
    pub fn clamp_cursor(&mut self) {
        let count = self.buffer.row_count();
        if self.cursor_y >= count {
            self.cursor_y = count.saturating_sub(1);
        }
        let len = self.buffer.row_len(self.cursor_y);
        if self.cursor_x > len {
            self.cursor_x = len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_is_clean() {
        let state = EditorState::new();
        assert!(!state.is_dirty());
        assert_eq!((state.cursor_x, state.cursor_y), (0, 0));
        assert_eq!(state.buffer.row_count(), 0);
    }

    #[test]
    fn status_message_visibility() {
        let mut status = StatusMessage::default();
        assert!(status.visible().is_none());
        status.set("hello");
        assert_eq!(status.visible(), Some("hello"));
    }

    #[test]
    fn clamp_cursor_pulls_into_bounds() {
        let mut state = EditorState::with_rows(&["ab", "c"]);
        state.cursor_y = 9;
        state.cursor_x = 9;
        state.clamp_cursor();
        assert_eq!((state.cursor_y, state.cursor_x), (1, 1));
    }
}
