//! One text row and its derived buffers.
//!
//! A row owns four parallel stores: the raw bytes as typed (`chars`), the
//! tab-expanded display bytes (`render`), one highlight class per render
//! byte, and the cached soft-wrap break positions. Every byte occupies one
//! display column; the render mapper only has to account for tabs.
//!
//! Invariants:
//! * `render.len() == highlight.len()` after every update.
//! * `wrap_breaks` is strictly increasing with every entry `< render.len()`,
//!   and is valid only for the width it was computed at (`wrap_width`).

use core_syntax::Highlight;
use std::borrow::Cow;

/// Tab stops every 8 render columns.
pub const TAB_STOP: usize = 8;

/// Whitespace for wrap/paragraph purposes.
pub fn is_whitespace(byte: u8) -> bool {
    byte == b' ' || byte == b'\t' || byte == b'\n' || byte == b'\r'
}

/// Word characters for word motion and word deletion.
pub fn is_word_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
    highlight: Vec<Highlight>,
    open_comment: bool,
    /// Exposed for UI layers; the core only sets it on mutation.
    pub dirty: bool,
    wrap_breaks: Vec<usize>,
    /// Width the cached breaks were computed for; 0 means stale.
    wrap_width: usize,
}

impl Row {
    pub fn new(chars: impl Into<Vec<u8>>) -> Self {
        let mut row = Self {
            chars: chars.into(),
            dirty: true,
            ..Self::default()
        };
        row.rebuild_render();
        row
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn render(&self) -> &[u8] {
        &self.render
    }

    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    pub fn highlight(&self) -> &[Highlight] {
        &self.highlight
    }

    /// Mutable highlight access for transient repaints (search match flash).
    /// The next syntax update overwrites whatever is painted here.
    pub fn highlight_mut(&mut self) -> &mut [Highlight] {
        &mut self.highlight
    }

    pub fn open_comment(&self) -> bool {
        self.open_comment
    }

    /// Lossy text view for status lines and extraction into UTF-8 strings.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.chars)
    }

    // --- raw mutation ---------------------------------------------------
    //
    // These touch only `chars`; the owning buffer re-derives render and
    // highlight state afterwards via `Buffer::refresh_row`.

    pub(crate) fn insert_byte(&mut self, at: usize, byte: u8) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.dirty = true;
    }

    pub(crate) fn insert_bytes(&mut self, at: usize, bytes: &[u8]) {
        let at = at.min(self.chars.len());
        self.chars.splice(at..at, bytes.iter().copied());
        self.dirty = true;
    }

    pub(crate) fn delete_byte(&mut self, at: usize) {
        if at < self.chars.len() {
            self.chars.remove(at);
            self.dirty = true;
        }
    }

    pub(crate) fn remove_span(&mut self, start: usize, end: usize) {
        let end = end.min(self.chars.len());
        if start < end {
            self.chars.drain(start..end);
            self.dirty = true;
        }
    }

    pub(crate) fn append_bytes(&mut self, bytes: &[u8]) {
        self.chars.extend_from_slice(bytes);
        self.dirty = true;
    }

    pub(crate) fn truncate(&mut self, at: usize) {
        self.chars.truncate(at);
        self.dirty = true;
    }

    /// Regenerate `render` from `chars`, expanding each tab to the next
    /// multiple of [`TAB_STOP`]. Invalidates the wrap cache; the highlight
    /// vector is refreshed by the buffer-level syntax pass that follows.
    pub(crate) fn rebuild_render(&mut self) {
        self.render.clear();
        for &byte in &self.chars {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }
        self.wrap_width = 0;
        self.wrap_breaks.clear();
    }

    pub(crate) fn set_highlight(&mut self, highlight: Vec<Highlight>, open_comment: bool) {
        debug_assert_eq!(highlight.len(), self.render.len());
        self.highlight = highlight;
        self.open_comment = open_comment;
    }

    // --- render mapping -------------------------------------------------

    /// Cursor column → render column.
    pub fn cursor_to_render(&self, cx: usize) -> usize {
        let mut rx = 0;
        for &byte in self.chars.iter().take(cx) {
            if byte == b'\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    /// Render column → cursor column: the largest `cx` whose render column
    /// is still ≤ `rx`. A render column inside a tab span maps back to the
    /// tab's cursor column.
    pub fn render_to_cursor(&self, rx: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, &byte) in self.chars.iter().enumerate() {
            if byte == b'\t' {
                cur_rx += (TAB_STOP - 1) - (cur_rx % TAB_STOP);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }

    // --- soft wrap ------------------------------------------------------

    /// Recompute wrap breaks for `width` unless the cache already holds
    /// them. Greedy scan: when a segment would exceed the width, break at
    /// the most recent post-whitespace boundary, falling back to a hard
    /// break at the limit.
    pub fn ensure_wrap(&mut self, width: usize) {
        if width == 0 {
            self.wrap_breaks.clear();
            self.wrap_width = 0;
            return;
        }
        if self.wrap_width == width {
            return;
        }
        self.wrap_breaks.clear();
        self.wrap_width = width;
        if self.render.len() <= width {
            return;
        }

        let mut line_start = 0;
        let mut last_break = 0;
        for i in 0..self.render.len() {
            if i > 0 && self.render[i - 1] == b' ' {
                last_break = i;
            }
            if i - line_start >= width {
                let break_pos = if last_break > line_start { last_break } else { i };
                self.wrap_breaks.push(break_pos);
                line_start = break_pos;
                last_break = break_pos;
            }
        }
    }

    pub fn wrap_breaks(&self) -> &[usize] {
        &self.wrap_breaks
    }

    /// Screen rows this row occupies at `width` (always ≥ 1). Recomputes
    /// the cache if needed.
    pub fn visual_rows(&mut self, width: usize) -> usize {
        if width == 0 || self.render.len() <= width {
            return 1;
        }
        self.ensure_wrap(width);
        self.wrap_breaks.len() + 1
    }

    /// Render position where `segment` starts (segment 0 is the first).
    pub fn segment_start(&self, segment: usize) -> usize {
        if segment == 0 {
            0
        } else if segment > self.wrap_breaks.len() {
            self.render.len()
        } else {
            self.wrap_breaks[segment - 1]
        }
    }

    /// Render position where `segment` ends (exclusive).
    pub fn segment_end(&self, segment: usize) -> usize {
        if segment >= self.wrap_breaks.len() {
            self.render.len()
        } else {
            self.wrap_breaks[segment]
        }
    }

    /// Wrap segment a render column falls in.
    pub fn rx_to_segment(&self, rx: usize) -> usize {
        for (i, &brk) in self.wrap_breaks.iter().enumerate() {
            if rx < brk {
                return i;
            }
        }
        self.wrap_breaks.len()
    }

    // --- line shape helpers ---------------------------------------------

    /// Column of the first non-whitespace byte; 0 for blank rows.
    pub fn first_nonwhitespace_col(&self) -> usize {
        let col = self
            .chars
            .iter()
            .position(|&b| b != b' ' && b != b'\t')
            .unwrap_or(0);
        if col >= self.chars.len() { 0 } else { col }
    }

    /// Length of the leading whitespace run.
    pub fn indentation(&self) -> usize {
        self.chars
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count()
    }

    /// True if the last non-whitespace byte is `{`.
    pub fn ends_with_opening_brace(&self) -> bool {
        self.chars
            .iter()
            .rev()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'{')
    }

    /// True if the first non-whitespace byte is `}`.
    pub fn starts_with_closing_brace(&self) -> bool {
        self.chars
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'}')
    }
}
