//! Key → action translation and dispatch.
//!
//! Decoded keys map to one flat [`Action`] enum, so bindings stay
//! independent of terminal quirks. [`dispatch`] applies an action to the
//! editor state and returns a [`Flow`]: most actions complete in place,
//! while quit and the interactive prompts (save, find, jump) bubble up to
//! the event loop which owns the terminal.

use core_events::Key;
use core_state::{EditorState, Move};
use tracing::trace;

mod mouse;

pub use mouse::handle_mouse_event;

/// Editor actions, one per binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InsertChar(u8),
    InsertNewline,
    DeleteBack,
    DeleteForward,
    DeleteWordBack,
    DeleteWordForward,
    Move(Move),
    MoveWordLeft,
    MoveWordRight,
    PageUp,
    PageDown,
    Home,
    End,
    SelectMove(Move),
    SelectHome,
    SelectEnd,
    SelectAll,
    IndentLine,
    UnindentLine,
    DuplicateLine,
    DeleteLine,
    JoinLines,
    MoveLineUp,
    MoveLineDown,
    ReflowParagraph,
    JoinParagraph,
    ToggleLineComment,
    ToggleBlockComment,
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    AddCursorAbove,
    AddCursorBelow,
    AddCursorAtPrimary,
    AddCursorAndAdvance,
    JumpToBracket,
    SkipOpeningPair,
    SkipClosingPair,
    CycleTheme,
    ToggleLineNumbers,
    ToggleSoftWrap,
    ToggleCenterScroll,
    EscapeReset,
    Mouse(core_events::MouseEvent),
    Save,
    Find,
    JumpToLine,
    Quit,
}

/// What the event loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Prompt flows owned by the loop (they need the terminal).
    Save,
    Find,
    JumpToLine,
    Quit,
}

/// The dispatch table of the input state machine: every decoded key to its
/// action. Unbound keys yield `None`.
pub fn translate(key: Key) -> Option<Action> {
    let action = match key {
        Key::Enter => Action::InsertNewline,
        Key::Backspace | Key::Ctrl('h') => Action::DeleteBack,
        Key::Delete => Action::DeleteForward,
        Key::Tab => Action::IndentLine,
        Key::ShiftTab => Action::UnindentLine,
        Key::Escape => Action::EscapeReset,

        Key::Up => Action::Move(Move::Up),
        Key::Down => Action::Move(Move::Down),
        Key::Left => Action::Move(Move::Left),
        Key::Right => Action::Move(Move::Right),
        Key::PageUp => Action::PageUp,
        Key::PageDown => Action::PageDown,
        Key::Home => Action::Home,
        Key::End => Action::End,

        Key::ShiftUp => Action::SelectMove(Move::Up),
        Key::ShiftDown => Action::SelectMove(Move::Down),
        Key::ShiftLeft => Action::SelectMove(Move::Left),
        Key::ShiftRight => Action::SelectMove(Move::Right),
        Key::ShiftHome => Action::SelectHome,
        Key::ShiftEnd => Action::SelectEnd,

        Key::CtrlLeft => Action::MoveWordLeft,
        Key::CtrlRight => Action::MoveWordRight,
        Key::Ctrl('w') => Action::DeleteWordBack,
        Key::CtrlDelete => Action::DeleteWordForward,

        Key::Ctrl('q') => Action::Quit,
        Key::Ctrl('s') => Action::Save,
        Key::Ctrl('f') => Action::Find,
        Key::Ctrl('g') => Action::JumpToLine,
        Key::Ctrl('a') => Action::SelectAll,

        Key::Ctrl('c') => Action::Copy,
        Key::Ctrl('x') => Action::Cut,
        Key::Ctrl('v') => Action::Paste,
        Key::Ctrl('z') => Action::Undo,
        Key::Ctrl('y') => Action::Redo,

        Key::Ctrl('d') => Action::DuplicateLine,
        Key::Ctrl('k') => Action::DeleteLine,
        Key::Ctrl('j') => Action::JoinLines,
        Key::AltShiftUp => Action::MoveLineUp,
        Key::AltShiftDown => Action::MoveLineDown,

        Key::AltUp => Action::AddCursorAbove,
        Key::AltDown => Action::AddCursorBelow,
        Key::Alt('c') => Action::AddCursorAtPrimary,
        Key::Alt('v') => Action::AddCursorAndAdvance,

        Key::Ctrl(']') => Action::JumpToBracket,
        Key::Alt('[') => Action::SkipOpeningPair,
        Key::Alt(']') => Action::SkipClosingPair,

        Key::Ctrl('/') => Action::ToggleLineComment,
        Key::Ctrl('\\') => Action::ToggleBlockComment,

        Key::Alt('t') => Action::CycleTheme,
        Key::Alt('l') => Action::ToggleLineNumbers,
        Key::Alt('w') => Action::ToggleSoftWrap,
        Key::Alt('z') => Action::ToggleCenterScroll,
        Key::Alt('q') => Action::ReflowParagraph,
        Key::Alt('j') => Action::JoinParagraph,

        Key::Mouse(event) => Action::Mouse(event),

        Key::Char(c) => Action::InsertChar(c as u8),
        _ => return None,
    };
    Some(action)
}

/// Apply one action. Pure state mutation except for the `Flow` escapes.
pub fn dispatch(action: Action, state: &mut EditorState) -> Flow {
    trace!(target: "actions", ?action, "dispatch");

    // Smart Home toggling only survives consecutive Home presses.
    if action != Action::Home {
        state.last_key_was_home = false;
    }

    match action {
        Action::InsertChar(byte) => state.insert_char(byte),
        Action::InsertNewline => state.insert_newline(),
        Action::DeleteBack => state.delete_char(),
        Action::DeleteForward => {
            // Forward delete is right-arrow then backspace.
            state.move_cursor(Move::Right);
            state.delete_char();
        }
        Action::DeleteWordBack => {
            state.selection_clear();
            state.delete_word_backward();
        }
        Action::DeleteWordForward => {
            state.selection_clear();
            state.delete_word_forward();
        }

        Action::Move(direction) => {
            state.selection_clear();
            state.move_cursor(direction);
            state.move_secondary_cursors(direction);
        }
        Action::MoveWordLeft => {
            state.selection_clear();
            state.move_word_left();
            state.move_secondary_words(true);
        }
        Action::MoveWordRight => {
            state.selection_clear();
            state.move_word_right();
            state.move_secondary_words(false);
        }
        Action::PageUp => state.page_move(true),
        Action::PageDown => state.page_move(false),
        Action::Home => {
            state.selection_clear();
            state.smart_home();
            return Flow::Continue; // keep last_key_was_home
        }
        Action::End => {
            state.selection_clear();
            state.move_end_of_line();
        }

        Action::SelectMove(direction) => {
            if !state.selection.active {
                state.selection_start();
            }
            state.move_cursor(direction);
            state.selection_extend();
        }
        Action::SelectHome => {
            if !state.selection.active {
                state.selection_start();
            }
            state.cursor_x = 0;
            state.selection_extend();
        }
        Action::SelectEnd => {
            if !state.selection.active {
                state.selection_start();
            }
            state.move_end_of_line();
            state.selection_extend();
        }
        Action::SelectAll => state.select_all(),

        Action::IndentLine => state.indent_line(),
        Action::UnindentLine => state.unindent_line(),
        Action::DuplicateLine => state.duplicate_line(),
        Action::DeleteLine => state.delete_line(),
        Action::JoinLines => state.join_lines(),
        Action::MoveLineUp => state.move_line_up(),
        Action::MoveLineDown => state.move_line_down(),
        Action::ReflowParagraph => state.reflow_paragraph(),
        Action::JoinParagraph => state.join_paragraph(),
        Action::ToggleLineComment => state.toggle_line_comment(),
        Action::ToggleBlockComment => state.toggle_block_comment(),

        Action::Copy => state.copy(),
        Action::Cut => state.cut(),
        Action::Paste => state.paste(),
        Action::Undo => state.undo(),
        Action::Redo => state.redo(),

        Action::AddCursorAbove => state.add_cursor_above(),
        Action::AddCursorBelow => state.add_cursor_below(),
        Action::AddCursorAtPrimary => state.add_cursor_at_primary(),
        Action::AddCursorAndAdvance => state.add_cursor_at_primary_and_advance(),

        Action::JumpToBracket => state.jump_to_matching_bracket(),
        Action::SkipOpeningPair => state.skip_opening_pair(),
        Action::SkipClosingPair => state.skip_closing_pair(),

        Action::CycleTheme => {
            // The status bar displays the resulting theme name.
            state.theme_index = (state.theme_index + 1) % state.theme_count.max(1);
        }
        Action::ToggleLineNumbers => {
            state.show_line_numbers = !state.show_line_numbers;
            state.update_gutter_width();
            let on = state.show_line_numbers;
            state.set_status(format!("Line numbers {}", if on { "ON" } else { "OFF" }));
        }
        Action::ToggleSoftWrap => {
            state.soft_wrap = !state.soft_wrap;
            let on = state.soft_wrap;
            state.set_status(format!("Soft wrap {}", if on { "ON" } else { "OFF" }));
        }
        Action::ToggleCenterScroll => {
            state.center_scroll = !state.center_scroll;
            let on = state.center_scroll;
            state.set_status(format!("Center scroll {}", if on { "ON" } else { "OFF" }));
        }

        Action::EscapeReset => {
            state.clear_cursors();
            state.selection_clear();
        }
        Action::Mouse(event) => handle_mouse_event(state, event),

        Action::Save => return Flow::Save,
        Action::Find => return Flow::Find,
        Action::JumpToLine => return Flow::JumpToLine,
        Action::Quit => return Flow::Quit,
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys_insert() {
        assert_eq!(translate(Key::Char('x')), Some(Action::InsertChar(b'x')));
        assert_eq!(translate(Key::Enter), Some(Action::InsertNewline));
    }

    #[test]
    fn chords_map_to_actions() {
        assert_eq!(translate(Key::Ctrl('q')), Some(Action::Quit));
        assert_eq!(translate(Key::Ctrl('/')), Some(Action::ToggleLineComment));
        assert_eq!(translate(Key::Ctrl('\\')), Some(Action::ToggleBlockComment));
        assert_eq!(translate(Key::Alt('q')), Some(Action::ReflowParagraph));
        assert_eq!(translate(Key::AltShiftDown), Some(Action::MoveLineDown));
        assert_eq!(translate(Key::ShiftTab), Some(Action::UnindentLine));
    }

    #[test]
    fn unbound_keys_are_none() {
        assert_eq!(translate(Key::F(10)), None);
        assert_eq!(translate(Key::Alt('m')), None);
        assert_eq!(translate(Key::Ctrl('o')), None);
    }

    #[test]
    fn dispatch_inserts_and_moves() {
        let mut state = EditorState::with_rows(&["ab"]);
        assert_eq!(dispatch(Action::InsertChar(b'x'), &mut state), Flow::Continue);
        assert_eq!(state.buffer.row(0).unwrap().chars(), b"xab");
        dispatch(Action::Move(Move::Right), &mut state);
        assert_eq!(state.cursor_x, 2);
    }

    #[test]
    fn quit_and_prompts_bubble_up() {
        let mut state = EditorState::with_rows(&[]);
        assert_eq!(dispatch(Action::Quit, &mut state), Flow::Quit);
        assert_eq!(dispatch(Action::Save, &mut state), Flow::Save);
        assert_eq!(dispatch(Action::Find, &mut state), Flow::Find);
    }

    #[test]
    fn shift_arrows_grow_a_selection() {
        let mut state = EditorState::with_rows(&["hello"]);
        dispatch(Action::SelectMove(Move::Right), &mut state);
        dispatch(Action::SelectMove(Move::Right), &mut state);
        assert!(state.selection.active);
        assert_eq!(state.selected_text(), b"he");
        // A plain arrow clears it again.
        dispatch(Action::Move(Move::Left), &mut state);
        assert!(!state.selection.active);
    }

    #[test]
    fn home_toggles_between_indent_and_column_zero() {
        let mut state = EditorState::with_rows(&["    text"]);
        state.cursor_x = 6;
        dispatch(Action::Home, &mut state);
        assert_eq!(state.cursor_x, 4);
        dispatch(Action::Home, &mut state);
        assert_eq!(state.cursor_x, 0);
        dispatch(Action::Home, &mut state);
        assert_eq!(state.cursor_x, 4);
    }
}
