//! Mouse event handling: clicks place the cursor (with multi-click word
//! and line selection), drags extend the selection, modifier clicks drop
//! secondary cursors, and wheel ticks scroll with tactile acceleration.

use core_events::{MouseButton, MouseEvent, MouseEventKind, MouseMods};
use core_state::{EditorState, Move, SelectionMode};

pub fn handle_mouse_event(state: &mut EditorState, event: MouseEvent) {
    // Terminal reports are 1-indexed.
    let screen_x = event.column.saturating_sub(1) as usize;
    let screen_y = event.row.saturating_sub(1) as usize;

    // Wheel: dispatch one arrow step per speed unit.
    match event.button {
        MouseButton::ScrollUp | MouseButton::ScrollDown => {
            let steps = state.scroll_speed.tick();
            let direction = if event.button == MouseButton::ScrollUp {
                Move::Up
            } else {
                Move::Down
            };
            for _ in 0..steps {
                state.move_cursor(direction);
            }
            return;
        }
        MouseButton::Left => {}
        _ => return,
    }

    // A click on the message bar copies the visible message.
    let message_bar_row = state.screen_rows + 1;
    if screen_y == message_bar_row && event.kind != MouseEventKind::Motion {
        if event.kind == MouseEventKind::Press
            && let Some(message) = state.status.visible()
        {
            let message = message.as_bytes().to_vec();
            state.clipboard.store(message, SelectionMode::Char);
            state.set_status("Message copied to clipboard");
        }
        return;
    }

    if screen_x < state.gutter_width {
        return;
    }
    if screen_y >= state.screen_rows {
        return;
    }

    // Screen cell → file position.
    let visual_row = screen_y + state.row_offset;
    let (file_row, wrap_row) = state.visual_to_logical(visual_row).unwrap_or_else(|| {
        (state.buffer.row_count().saturating_sub(1), 0)
    });
    let file_row = file_row.min(state.buffer.row_count().saturating_sub(1));

    let mut render_x = screen_x - state.gutter_width;
    if state.soft_wrap && file_row < state.buffer.row_count() {
        state.row_visual_rows(file_row); // cache wrap breaks
        if let Some(row) = state.buffer.row(file_row) {
            render_x += row.segment_start(wrap_row);
        }
    } else {
        render_x += state.column_offset;
    }

    let cursor_x = state
        .buffer
        .row(file_row)
        .map_or(0, |row| row.render_to_cursor(render_x).min(row.len()));

    // Ctrl/Alt click drops a secondary cursor.
    if event.kind == MouseEventKind::Press
        && event.mods.intersects(MouseMods::CTRL | MouseMods::ALT)
    {
        if state
            .cursors
            .add((state.cursor_y, state.cursor_x), file_row, cursor_x)
        {
            state.selection_clear();
            let total = state.cursors.count() + 1;
            state.set_status(format!(
                "Added cursor at line {}, col {} (total: {total})",
                file_row + 1,
                cursor_x + 1
            ));
        } else {
            state.set_status("Cursor already exists here");
        }
        return;
    }

    match event.kind {
        MouseEventKind::Motion => {
            if state.selection.active {
                state.cursor_y = file_row;
                state.cursor_x = cursor_x;
                state.selection_extend();
            }
        }
        MouseEventKind::Release => {}
        MouseEventKind::Press => {
            if event.mods.contains(MouseMods::SHIFT) {
                if !state.selection.active {
                    state.selection_start();
                }
                state.cursor_y = file_row;
                state.cursor_x = cursor_x;
                state.selection_extend();
                return;
            }

            state.detect_multi_click(file_row, cursor_x);
            state.cursor_y = file_row;
            state.cursor_x = cursor_x;
            match state.selection.click_count {
                2 => state.select_word(file_row, cursor_x),
                n if n >= 3 => state.select_line(file_row),
                _ => state.selection_start(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            button: MouseButton::Left,
            mods: MouseMods::empty(),
            column,
            row,
            kind: MouseEventKind::Press,
        }
    }

    #[test]
    fn click_places_cursor_and_starts_selection() {
        let mut state = EditorState::with_rows(&["hello world", "second"]);
        state.handle_resize(12, 40);
        // Gutter is "1 " wide (2 cells); column 4 → file col 1... columns
        // are 1-indexed so cell (row 1, col 4) is render column 1.
        handle_mouse_event(&mut state, press(4, 1));
        assert_eq!((state.cursor_y, state.cursor_x), (0, 1));
        assert!(state.selection.active);
        assert_eq!(state.selected_text(), b"");
    }

    #[test]
    fn modifier_click_adds_secondary_cursor() {
        let mut state = EditorState::with_rows(&["aaa", "bbb"]);
        state.handle_resize(12, 40);
        let mut event = press(3, 2);
        event.mods = MouseMods::CTRL;
        handle_mouse_event(&mut state, event);
        assert_eq!(state.cursors.count(), 1);
        assert_eq!((state.cursor_y, state.cursor_x), (0, 0));
    }

    #[test]
    fn gutter_clicks_are_ignored() {
        let mut state = EditorState::with_rows(&["abc"]);
        state.handle_resize(12, 40);
        state.cursor_x = 2;
        handle_mouse_event(&mut state, press(1, 1));
        assert_eq!(state.cursor_x, 2);
        assert!(!state.selection.active);
    }

    #[test]
    fn wheel_moves_cursor() {
        let mut state = EditorState::with_rows(&["a", "b", "c", "d"]);
        state.handle_resize(12, 40);
        let event = MouseEvent {
            button: MouseButton::ScrollDown,
            mods: MouseMods::empty(),
            column: 1,
            row: 1,
            kind: MouseEventKind::Press,
        };
        handle_mouse_event(&mut state, event);
        assert!(state.cursor_y >= 1);
    }
}
