//! Viewport and cursor movement.
//!
//! The viewport is addressed in visual rows when soft wrap is on (one
//! logical row can span several) and logical rows otherwise. Two scroll
//! modes: edge-triggered keeps the cursor just inside the window, centered
//! keeps it at mid-screen. Horizontal scrolling only exists without soft
//! wrap.

use crate::{EditorState, RESERVED_ROWS};
use core_text::is_word_char;
use std::time::{Duration, Instant};

/// Wheel ticks faster than this accelerate the scroll multiplier.
const SCROLL_ACCEL_WINDOW: Duration = Duration::from_millis(80);
/// Ticks slower than this reset it.
const SCROLL_RESET_WINDOW: Duration = Duration::from_millis(150);
const SCROLL_SPEED_MAX: u32 = 15;

/// Cursor movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

/// Tactile scroll state: consecutive wheel ticks build up speed.
#[derive(Debug)]
pub struct ScrollSpeed {
    last_tick: Instant,
    speed: u32,
}

impl Default for ScrollSpeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSpeed {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            speed: 1,
        }
    }

    /// Register a wheel tick; returns the current multiplier (the number
    /// of arrow steps to dispatch).
    pub fn tick(&mut self) -> u32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> u32 {
        let elapsed = now.duration_since(self.last_tick);
        if elapsed < SCROLL_ACCEL_WINDOW {
            self.speed = (self.speed + 1).min(SCROLL_SPEED_MAX);
        } else if elapsed > SCROLL_RESET_WINDOW {
            self.speed = 1;
        }
        self.last_tick = now;
        self.speed
    }
}

impl EditorState {
    /// Columns available to text after the line-number gutter.
    pub fn available_width(&self) -> usize {
        self.screen_columns.saturating_sub(self.gutter_width)
    }

    /// Screen rows the given logical row occupies.
    pub fn row_visual_rows(&mut self, row: usize) -> usize {
        if !self.soft_wrap {
            return 1;
        }
        let width = self.available_width();
        if width == 0 {
            return 1;
        }
        self.buffer
            .row_mut(row)
            .map_or(1, |r| r.visual_rows(width))
    }

    /// Visual rows occupied by rows `0..row` (the visual row where `row`
    /// starts). Plain row index when soft wrap is off.
    pub fn visual_rows_before(&mut self, row: usize) -> usize {
        if !self.soft_wrap {
            return row;
        }
        let mut visual = 0;
        for i in 0..row.min(self.buffer.row_count()) {
            visual += self.row_visual_rows(i);
        }
        visual
    }

    /// Wrap segment the cursor currently occupies within its row.
    pub fn cursor_wrap_row(&mut self) -> usize {
        if !self.soft_wrap || self.cursor_y >= self.buffer.row_count() {
            return 0;
        }
        let width = self.available_width();
        if width == 0 {
            return 0;
        }
        let rx = {
            let row = self.buffer.row(self.cursor_y).expect("row exists");
            row.cursor_to_render(self.cursor_x)
        };
        let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
        row.ensure_wrap(width);
        row.rx_to_segment(rx)
    }

    /// Map a visual row to `(logical row, wrap segment)`. Returns `None`
    /// past the end of the buffer.
    pub fn visual_to_logical(&mut self, visual_row: usize) -> Option<(usize, usize)> {
        if !self.soft_wrap {
            return (visual_row < self.buffer.row_count()).then_some((visual_row, 0));
        }
        let mut visual = 0;
        for row in 0..self.buffer.row_count() {
            let span = self.row_visual_rows(row);
            if visual + span > visual_row {
                return Some((row, visual_row - visual));
            }
            visual += span;
        }
        None
    }

    /// Choose `row_offset`/`column_offset` so the cursor is visible, and
    /// refresh `render_x`. Runs once per refresh, before drawing.
    pub fn scroll(&mut self) {
        self.render_x = if self.cursor_y < self.buffer.row_count() {
            self.buffer
                .row(self.cursor_y)
                .expect("row exists")
                .cursor_to_render(self.cursor_x)
        } else {
            0
        };

        if self.soft_wrap {
            let cursor_visual = self.visual_rows_before(self.cursor_y) + self.cursor_wrap_row();

            if self.center_scroll {
                let target = cursor_visual.saturating_sub(self.screen_rows / 2);
                let total = self.visual_rows_before(self.buffer.row_count());
                let max = (total + 1).saturating_sub(self.screen_rows);
                self.row_offset = target.min(max);
            } else {
                if cursor_visual < self.row_offset {
                    self.row_offset = cursor_visual;
                }
                if cursor_visual >= self.row_offset + self.screen_rows {
                    self.row_offset = cursor_visual + 1 - self.screen_rows;
                }
            }
            self.column_offset = 0;
        } else {
            if self.center_scroll {
                let target = self.cursor_y.saturating_sub(self.screen_rows / 2);
                let max = (self.buffer.row_count() + 1).saturating_sub(self.screen_rows);
                self.row_offset = target.min(max);
            } else {
                if self.cursor_y < self.row_offset {
                    self.row_offset = self.cursor_y;
                }
                if self.cursor_y >= self.row_offset + self.screen_rows {
                    self.row_offset = self.cursor_y + 1 - self.screen_rows;
                }
            }

            if self.render_x < self.column_offset {
                self.column_offset = self.render_x;
            }
            if self.render_x >= self.column_offset + self.screen_columns {
                self.column_offset = self.render_x + 1 - self.screen_columns;
            }
        }
    }

    /// Apply new terminal dimensions: enforce minimums, reserve the status
    /// rows, re-clamp the cursor, and reset scroll (the next refresh
    /// recomputes it).
    pub fn handle_resize(&mut self, rows: usize, columns: usize) {
        let columns = columns.max(10);
        let rows = rows.max(3);
        self.screen_columns = columns;
        self.screen_rows = rows.saturating_sub(RESERVED_ROWS).max(1);
        self.update_gutter_width();
        self.clamp_cursor();
        self.row_offset = 0;
        self.column_offset = 0;
    }

    /// Gutter width: digits in the last line number plus a space, or zero
    /// when the gutter is hidden.
    pub fn update_gutter_width(&mut self) {
        if !self.show_line_numbers {
            self.gutter_width = 0;
            return;
        }
        let mut digits = 1;
        let mut n = self.buffer.row_count();
        while n >= 10 {
            digits += 1;
            n /= 10;
        }
        self.gutter_width = digits + 1;
    }

    // --- cursor movement -------------------------------------------------

    /// Arrow movement. With soft wrap on, vertical motion walks wrap
    /// segments before crossing row boundaries, preserving the offset
    /// within the segment.
    pub fn move_cursor(&mut self, direction: Move) {
        match direction {
            Move::Left => {
                if self.cursor_x != 0 {
                    self.cursor_x -= 1;
                } else if self.cursor_y > 0 {
                    self.cursor_y -= 1;
                    self.cursor_x = self.current_row_len();
                }
            }
            Move::Right => {
                if self.cursor_y < self.buffer.row_count() {
                    let len = self.current_row_len();
                    if self.cursor_x < len {
                        self.cursor_x += 1;
                    } else {
                        self.cursor_y += 1;
                        self.cursor_x = 0;
                    }
                }
            }
            Move::Up => {
                if self.soft_wrap && self.cursor_y < self.buffer.row_count() {
                    self.move_up_soft_wrap();
                } else if self.cursor_y != 0 {
                    self.cursor_y -= 1;
                }
            }
            Move::Down => {
                if self.soft_wrap && self.cursor_y < self.buffer.row_count() {
                    self.move_down_soft_wrap();
                } else if self.cursor_y < self.buffer.row_count() {
                    self.cursor_y += 1;
                }
            }
        }

        let len = self.current_row_len();
        if self.cursor_x > len {
            self.cursor_x = len;
        }
    }

    fn move_up_soft_wrap(&mut self) {
        let width = self.available_width();
        if width == 0 {
            return;
        }
        let current_rx = self
            .buffer
            .row(self.cursor_y)
            .expect("row exists")
            .cursor_to_render(self.cursor_x);

        let (segment, segment_start) = {
            let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
            row.ensure_wrap(width);
            let segment = row.rx_to_segment(current_rx);
            (segment, row.segment_start(segment))
        };
        let offset = current_rx - segment_start;

        if segment > 0 {
            let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
            let prev_start = row.segment_start(segment - 1);
            let prev_end = row.segment_end(segment - 1);
            let target = (prev_start + offset).min(prev_end);
            self.cursor_x = row.render_to_cursor(target);
        } else if self.cursor_y != 0 {
            self.cursor_y -= 1;
            let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
            row.ensure_wrap(width);
            let last = row.visual_rows(width) - 1;
            let last_start = row.segment_start(last);
            let last_end = row.segment_end(last);
            let target = (last_start + offset).min(last_end);
            self.cursor_x = row.render_to_cursor(target);
        }
    }

    fn move_down_soft_wrap(&mut self) {
        let width = self.available_width();
        if width == 0 {
            return;
        }
        let current_rx = self
            .buffer
            .row(self.cursor_y)
            .expect("row exists")
            .cursor_to_render(self.cursor_x);

        let (segment, segment_start, total_segments) = {
            let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
            row.ensure_wrap(width);
            let segment = row.rx_to_segment(current_rx);
            (segment, row.segment_start(segment), row.visual_rows(width))
        };
        let offset = current_rx - segment_start;

        if segment + 1 < total_segments {
            let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
            let next_start = row.segment_start(segment + 1);
            let next_end = row.segment_end(segment + 1);
            let target = (next_start + offset).min(next_end);
            self.cursor_x = row.render_to_cursor(target);
        } else {
            self.cursor_y += 1;
            if self.cursor_y < self.buffer.row_count() {
                let row = self.buffer.row_mut(self.cursor_y).expect("row exists");
                row.ensure_wrap(width);
                let first_end = row.segment_end(0);
                let target = offset.min(first_end);
                self.cursor_x = row.render_to_cursor(target);
            } else {
                self.cursor_x = 0;
            }
        }
    }

    /// Page movement: jump the cursor to the window edge, then step one
    /// screenful. Secondaries follow by the same row delta.
    pub fn page_move(&mut self, up: bool) {
        let original_line = self.cursor_y;
        self.selection_clear();
        if up {
            self.cursor_y = self.row_offset.min(self.buffer.row_count());
        } else {
            self.cursor_y =
                (self.row_offset + self.screen_rows - 1).min(self.buffer.row_count());
        }

        for _ in 0..self.screen_rows {
            self.move_cursor(if up { Move::Up } else { Move::Down });
        }

        if !self.cursors.is_empty() {
            let delta = self.cursor_y as isize - original_line as isize;
            self.apply_vertical_delta(delta);
        }
    }

    // --- word motion -----------------------------------------------------

    /// To the start of the previous word (line-crossing at column 0).
    pub fn move_word_left(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        if self.cursor_x == 0 {
            if self.cursor_y > 0 {
                self.cursor_y -= 1;
                self.cursor_x = self.current_row_len();
            }
            return;
        }
        let chars = self.buffer.row(self.cursor_y).expect("row exists").chars();
        let mut x = self.cursor_x;
        while x > 0 && !is_word_char(chars[x - 1]) {
            x -= 1;
        }
        while x > 0 && is_word_char(chars[x - 1]) {
            x -= 1;
        }
        self.cursor_x = x;
    }

    /// Past the end of the next word (line-crossing at end of line).
    pub fn move_word_right(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        let chars = self.buffer.row(self.cursor_y).expect("row exists").chars();
        if self.cursor_x >= chars.len() {
            if self.cursor_y + 1 < self.buffer.row_count() {
                self.cursor_y += 1;
                self.cursor_x = 0;
            }
            return;
        }
        let mut x = self.cursor_x;
        while x < chars.len() && is_word_char(chars[x]) {
            x += 1;
        }
        while x < chars.len() && !is_word_char(chars[x]) {
            x += 1;
        }
        self.cursor_x = x;
    }

    /// Smart Home: first press goes to the first non-whitespace column (or
    /// 0 when already there); an immediate second press toggles.
    pub fn smart_home(&mut self) {
        let first_nonws = self
            .buffer
            .row(self.cursor_y)
            .map_or(0, |r| r.first_nonwhitespace_col());

        if self.last_key_was_home {
            self.cursor_x = if self.cursor_x == 0 { first_nonws } else { 0 };
        } else if self.cursor_x == first_nonws || first_nonws == 0 {
            self.cursor_x = 0;
        } else {
            self.cursor_x = first_nonws;
        }
        self.last_key_was_home = true;

        if !self.cursors.is_empty() {
            let use_first_nonws = self.cursor_x != 0;
            self.apply_home_position(use_first_nonws);
        }
    }

    pub fn move_end_of_line(&mut self) {
        if self.cursor_y < self.buffer.row_count() {
            self.cursor_x = self.current_row_len();
        }
        if !self.cursors.is_empty() {
            self.apply_end_position();
        }
    }

    // --- secondary-cursor following --------------------------------------

    /// Mirror an arrow movement onto every secondary (when following).
    pub fn move_secondary_cursors(&mut self, direction: Move) {
        if !self.cursors.follow_primary || self.cursors.is_empty() {
            return;
        }
        let count = self.buffer.row_count();
        // Movement clamps against row lengths, so borrow row lengths up
        // front into a closure-friendly shape.
        let row_len = |buffer: &core_text::Buffer, line: usize| buffer.row_len(line);

        let mut positions: Vec<_> = self.cursors.positions().to_vec();
        for cursor in &mut positions {
            match direction {
                Move::Left => {
                    if cursor.column > 0 {
                        cursor.column -= 1;
                    } else if cursor.line > 0 {
                        cursor.line -= 1;
                        cursor.column = row_len(&self.buffer, cursor.line);
                    }
                }
                Move::Right => {
                    if cursor.line < count {
                        if cursor.column < row_len(&self.buffer, cursor.line) {
                            cursor.column += 1;
                        } else if cursor.line + 1 < count {
                            cursor.line += 1;
                            cursor.column = 0;
                        }
                    }
                }
                Move::Up => {
                    if cursor.line > 0 {
                        cursor.line -= 1;
                        cursor.column = cursor.column.min(row_len(&self.buffer, cursor.line));
                    }
                }
                Move::Down => {
                    if cursor.line + 1 < count {
                        cursor.line += 1;
                        cursor.column = cursor.column.min(row_len(&self.buffer, cursor.line));
                    }
                }
            }
        }
        for (slot, pos) in self.cursors.iter_mut().zip(positions) {
            *slot = pos;
        }
        self.dedup_cursors();
    }

    /// Mirror word motion onto every secondary (when following).
    pub fn move_secondary_words(&mut self, left: bool) {
        if !self.cursors.follow_primary || self.cursors.is_empty() {
            return;
        }
        let count = self.buffer.row_count();
        let mut positions: Vec<_> = self.cursors.positions().to_vec();
        for cursor in &mut positions {
            if cursor.line >= count {
                continue;
            }
            let chars = self.buffer.row(cursor.line).expect("row exists").chars();
            if left {
                if cursor.column == 0 {
                    if cursor.line > 0 {
                        cursor.line -= 1;
                        cursor.column = self.buffer.row_len(cursor.line);
                    }
                    continue;
                }
                let mut x = cursor.column;
                while x > 0 && !is_word_char(chars[x - 1]) {
                    x -= 1;
                }
                while x > 0 && is_word_char(chars[x - 1]) {
                    x -= 1;
                }
                cursor.column = x;
            } else {
                if cursor.column >= chars.len() {
                    if cursor.line + 1 < count {
                        cursor.line += 1;
                        cursor.column = 0;
                    }
                    continue;
                }
                let mut x = cursor.column;
                while x < chars.len() && is_word_char(chars[x]) {
                    x += 1;
                }
                while x < chars.len() && !is_word_char(chars[x]) {
                    x += 1;
                }
                cursor.column = x;
            }
        }
        for (slot, pos) in self.cursors.iter_mut().zip(positions) {
            *slot = pos;
        }
        self.dedup_cursors();
    }

    fn apply_vertical_delta(&mut self, delta: isize) {
        if !self.cursors.follow_primary || delta == 0 {
            return;
        }
        let count = self.buffer.row_count();
        let mut positions: Vec<_> = self.cursors.positions().to_vec();
        for cursor in &mut positions {
            let line = (cursor.line as isize + delta).max(0) as usize;
            let line = if count > 0 { line.min(count - 1) } else { 0 };
            cursor.line = line;
            cursor.column = cursor.column.min(self.buffer.row_len(line));
        }
        for (slot, pos) in self.cursors.iter_mut().zip(positions) {
            *slot = pos;
        }
        self.dedup_cursors();
    }

    fn apply_home_position(&mut self, use_first_nonws: bool) {
        let mut positions: Vec<_> = self.cursors.positions().to_vec();
        for cursor in &mut positions {
            cursor.column = if use_first_nonws {
                self.buffer
                    .row(cursor.line)
                    .map_or(0, |r| r.first_nonwhitespace_col())
            } else {
                0
            };
        }
        for (slot, pos) in self.cursors.iter_mut().zip(positions) {
            *slot = pos;
        }
        self.dedup_cursors();
    }

    fn apply_end_position(&mut self) {
        let mut positions: Vec<_> = self.cursors.positions().to_vec();
        for cursor in &mut positions {
            cursor.column = self.buffer.row_len(cursor.line);
        }
        for (slot, pos) in self.cursors.iter_mut().zip(positions) {
            *slot = pos;
        }
        self.dedup_cursors();
    }
}
