//! Frame rendering.
//!
//! Each refresh rebuilds one byte buffer (text rows with syntax colors,
//! selection and bracket paint, the gutter, status and message bars, the
//! cursor position and the Kitty secondary-cursor report) and hands it to
//! the terminal layer for a single write. Building is pure with respect to
//! the terminal: nothing here performs I/O.

use core_state::EditorState;
use core_syntax::Highlight;

pub mod ansi;
pub mod theme;

pub use theme::{Rgb, THEMES, Theme, find_by_name, theme};

const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Welcome line sits a third of the way down an empty buffer.
const WELCOME_ROW_DIVISOR: usize = 3;

/// Stateless frame builder.
#[derive(Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Recompute scroll and bracket state, then build the full frame.
    pub fn refresh(&self, state: &mut EditorState) -> Vec<u8> {
        state.scroll();
        state.find_matching_bracket();

        let palette = *theme(state.theme_index);
        let mut buf = Vec::with_capacity(state.screen_rows * state.screen_columns * 4);

        ansi::background(&mut buf, palette.background);
        ansi::foreground(&mut buf, palette.foreground);
        buf.extend_from_slice(ansi::HIDE_CURSOR);
        buf.extend_from_slice(ansi::CURSOR_HOME);

        self.draw_rows(state, &palette, &mut buf);
        self.draw_status_bar(state, &palette, &mut buf);
        self.draw_message_bar(state, &palette, &mut buf);
        self.position_cursor(state, &mut buf);
        self.draw_secondary_cursors(state, &mut buf);

        buf.extend_from_slice(ansi::SHOW_CURSOR);
        buf
    }

    fn draw_rows(&self, state: &mut EditorState, palette: &Theme, buf: &mut Vec<u8>) {
        for screen_row in 0..state.screen_rows {
            let visual = screen_row + state.row_offset;
            let located = state.visual_to_logical(visual);

            if state.show_line_numbers {
                self.draw_gutter(state, palette, buf, located);
            }

            let is_current_line = located.is_some_and(|(row, _)| row == state.cursor_y);
            let line_bg = if is_current_line {
                palette.current_line
            } else {
                palette.background
            };
            ansi::background(buf, line_bg);

            match located {
                None => {
                    if state.buffer.is_empty()
                        && screen_row == state.screen_rows / WELCOME_ROW_DIVISOR
                    {
                        self.draw_welcome(state, palette, buf);
                    } else {
                        ansi::foreground(buf, palette.tilde);
                        buf.push(b'~');
                    }
                }
                Some((file_row, wrap_row)) => {
                    self.draw_text_row(state, palette, buf, file_row, wrap_row, line_bg);
                }
            }

            buf.extend_from_slice(ansi::CLEAR_LINE);
            ansi::background(buf, palette.background);
            buf.extend_from_slice(ansi::CRLF);
        }
    }

    fn draw_gutter(
        &self,
        state: &EditorState,
        palette: &Theme,
        buf: &mut Vec<u8>,
        located: Option<(usize, usize)>,
    ) {
        ansi::background(buf, palette.line_number_bg);
        match located {
            Some((file_row, 0)) => {
                let color = if file_row == state.cursor_y {
                    palette.line_number_current
                } else if state.buffer.row(file_row).is_some_and(|r| r.dirty) {
                    palette.line_number_dirty
                } else {
                    palette.line_number
                };
                ansi::foreground(buf, color);
                let number = (file_row + 1).to_string();
                let padding = state.gutter_width.saturating_sub(number.len() + 1);
                buf.extend(std::iter::repeat_n(b' ', padding));
                buf.extend_from_slice(number.as_bytes());
                buf.push(b' ');
            }
            // Wrap continuations and rows past the end get blank gutters.
            _ => {
                ansi::foreground(buf, palette.line_number);
                buf.extend(std::iter::repeat_n(b' ', state.gutter_width));
            }
        }
        ansi::background(buf, palette.background);
        ansi::foreground(buf, palette.foreground);
    }

    fn draw_welcome(&self, state: &EditorState, palette: &Theme, buf: &mut Vec<u8>) {
        let welcome = format!("Burin editor -- version {VERSION}");
        let width = state.available_width();
        let text = &welcome[..welcome.len().min(width)];
        let mut padding = width.saturating_sub(text.len()) / 2;
        if padding > 0 {
            ansi::foreground(buf, palette.tilde);
            buf.push(b'~');
            padding -= 1;
        }
        buf.extend(std::iter::repeat_n(b' ', padding));
        ansi::foreground(buf, palette.foreground);
        buf.extend_from_slice(text.as_bytes());
    }

    fn draw_text_row(
        &self,
        state: &mut EditorState,
        palette: &Theme,
        buf: &mut Vec<u8>,
        file_row: usize,
        wrap_row: usize,
        line_bg: Rgb,
    ) {
        let width = state.available_width();
        let (line_offset, line_end) = if state.soft_wrap {
            let row = state.buffer.row_mut(file_row).expect("row exists");
            row.ensure_wrap(width);
            (row.segment_start(wrap_row), row.segment_end(wrap_row))
        } else {
            let row = state.buffer.row(file_row).expect("row exists");
            (state.column_offset.min(row.render_len()), row.render_len())
        };

        let mut line_len = line_end.saturating_sub(line_offset);
        if !state.soft_wrap {
            line_len = line_len.min(width);
        }

        let row = state.buffer.row(file_row).expect("row exists");
        let render = &row.render()[line_offset..line_offset + line_len];
        let highlight = &row.highlight()[line_offset..line_offset + line_len];

        let mut current_color: Option<Rgb> = None;
        let mut in_selection = false;

        for (i, &byte) in render.iter().enumerate() {
            let render_col = line_offset + i;
            let cursor_col = row.render_to_cursor(render_col);
            let selected = state.selection.contains(file_row, cursor_col);

            if selected && !in_selection {
                ansi::background(buf, palette.selection_bg);
                ansi::foreground(buf, palette.selection_fg);
                in_selection = true;
                current_color = None;
            } else if !selected && in_selection {
                ansi::background(buf, line_bg);
                ansi::foreground(buf, palette.syntax_normal);
                in_selection = false;
                current_color = None;
            }

            if byte.is_ascii_control() {
                let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
                if !in_selection {
                    buf.extend_from_slice(ansi::REVERSE_VIDEO);
                }
                buf.push(symbol);
                if !in_selection {
                    buf.extend_from_slice(ansi::NORMAL_VIDEO);
                    ansi::background(buf, line_bg);
                    ansi::foreground(
                        buf,
                        current_color.unwrap_or(palette.syntax_normal),
                    );
                }
                continue;
            }

            if in_selection {
                buf.push(byte);
                continue;
            }

            if self.is_bracket_paint(state, file_row, cursor_col) {
                ansi::foreground(buf, palette.syntax_match);
                buf.extend_from_slice(ansi::UNDERLINE_ON);
                buf.push(byte);
                buf.extend_from_slice(ansi::UNDERLINE_OFF);
                ansi::background(buf, line_bg);
                ansi::foreground(buf, palette.syntax_normal);
                current_color = None;
                continue;
            }

            let color = match highlight[i] {
                Highlight::Normal => None,
                other => Some(self.syntax_color(palette, other)),
            };
            match color {
                None => {
                    if current_color.is_some() {
                        ansi::foreground(buf, palette.syntax_normal);
                        current_color = None;
                    }
                }
                Some(c) => {
                    if current_color != Some(c) {
                        ansi::foreground(buf, c);
                        current_color = Some(c);
                    }
                }
            }
            buf.push(byte);
        }

        ansi::foreground(buf, palette.foreground);
        if in_selection {
            ansi::background(buf, line_bg);
        }
    }

    /// Both delimiter spans and the partner cell paint as matches.
    fn is_bracket_paint(&self, state: &EditorState, row: usize, cursor_col: usize) -> bool {
        if state.bracket.match_pos == Some((row, cursor_col)) {
            return true;
        }
        let in_span = |span: Option<(usize, usize, usize)>| {
            span.is_some_and(|(r, c, len)| r == row && cursor_col >= c && cursor_col < c + len)
        };
        in_span(state.bracket.open) || in_span(state.bracket.close)
    }

    fn syntax_color(&self, palette: &Theme, class: Highlight) -> Rgb {
        match class {
            Highlight::Comment | Highlight::MultilineComment => palette.syntax_comment,
            Highlight::Keyword1 => palette.syntax_keyword1,
            Highlight::Keyword2 => palette.syntax_keyword2,
            Highlight::String => palette.syntax_string,
            Highlight::Number => palette.syntax_number,
            Highlight::Match | Highlight::BracketMatch => palette.syntax_match,
            Highlight::Normal => palette.syntax_normal,
        }
    }

    fn draw_status_bar(&self, state: &EditorState, palette: &Theme, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ansi::CLEAR_LINE);
        ansi::background(buf, palette.status_bg);
        ansi::foreground(buf, palette.status_fg);

        let name = state
            .filename
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]");
        let left = format!(
            "{:.20} - {} lines {}",
            name,
            state.buffer.row_count(),
            if state.is_dirty() { "(modified)" } else { "" }
        );
        let right = format!(
            "{} | {} | {}/{}",
            state
                .buffer
                .language()
                .map_or("no ft", |l| l.name),
            theme(state.theme_index).name,
            state.cursor_y + 1,
            state.buffer.row_count()
        );

        let mut column = left.len().min(state.screen_columns);
        buf.extend_from_slice(&left.as_bytes()[..column]);
        while column < state.screen_columns {
            if state.screen_columns - column == right.len() {
                buf.extend_from_slice(right.as_bytes());
                break;
            }
            buf.push(b' ');
            column += 1;
        }

        buf.extend_from_slice(ansi::RESET);
        buf.extend_from_slice(ansi::CRLF);
    }

    fn draw_message_bar(&self, state: &EditorState, palette: &Theme, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ansi::CLEAR_LINE);
        ansi::background(buf, palette.message_bg);
        ansi::foreground(buf, palette.message_fg);

        let mut column = 0;
        if let Some(message) = state.status.visible() {
            let shown = message.len().min(state.screen_columns);
            buf.extend_from_slice(&message.as_bytes()[..shown]);
            column = shown;
        }
        while column < state.screen_columns {
            buf.push(b' ');
            column += 1;
        }
        buf.extend_from_slice(ansi::RESET);
    }

    /// Park the hardware cursor on the primary cursor's cell.
    fn position_cursor(&self, state: &mut EditorState, buf: &mut Vec<u8>) {
        let (screen_row, screen_col) = if state.soft_wrap {
            let visual = state.visual_rows_before(state.cursor_y) + state.cursor_wrap_row();
            let segment_start = state
                .buffer
                .row(state.cursor_y)
                .map_or(0, |r| r.segment_start(r.rx_to_segment(state.render_x)));
            (
                visual.saturating_sub(state.row_offset) + 1,
                state.render_x - segment_start + state.gutter_width + 1,
            )
        } else {
            (
                state.cursor_y.saturating_sub(state.row_offset) + 1,
                state.render_x.saturating_sub(state.column_offset) + state.gutter_width + 1,
            )
        };
        ansi::move_to(buf, screen_row, screen_col);
    }

    /// Report secondary cursors through the Kitty multi-cursor protocol.
    fn draw_secondary_cursors(&self, state: &mut EditorState, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ansi::KITTY_CURSOR_CLEAR);
        if state.cursors.is_empty() {
            return;
        }

        let positions: Vec<_> = state.cursors.positions().to_vec();
        for cursor in positions {
            let render_col = state
                .buffer
                .row(cursor.line)
                .map_or(0, |r| r.cursor_to_render(cursor.column));

            let screen_row = if state.soft_wrap {
                let mut visual = state.visual_rows_before(cursor.line);
                state.row_visual_rows(cursor.line); // cache wrap breaks
                if let Some(row) = state.buffer.row(cursor.line) {
                    visual += row.rx_to_segment(render_col);
                }
                visual as isize - state.row_offset as isize + 1
            } else {
                cursor.line as isize - state.row_offset as isize + 1
            };
            let screen_col =
                render_col as isize - state.column_offset as isize + state.gutter_width as isize + 1;

            if screen_row < 1 || screen_row > state.screen_rows as isize {
                continue;
            }
            if screen_col < 1 || screen_col > state.screen_columns as isize {
                continue;
            }
            ansi::kitty_cursor(buf, screen_row as usize, screen_col as usize);
        }
    }
}
