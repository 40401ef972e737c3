//! Single-cursor editing behavior, auto-indent, and boundary cases.

use core_state::{EditorState, Move};

#[test]
fn typing_inserts_and_advances() {
    let mut state = EditorState::with_rows(&[]);
    for byte in *b"hi" {
        state.insert_char(byte);
    }
    assert_eq!(state.buffer.row_count(), 1);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"hi");
    assert_eq!((state.cursor_y, state.cursor_x), (0, 2));
    assert!(state.is_dirty());
}

#[test]
fn insert_past_end_creates_a_row_first() {
    let mut state = EditorState::with_rows(&["a"]);
    state.cursor_y = 1; // one past the last row
    state.insert_char(b'b');
    assert_eq!(state.buffer.row_count(), 2);
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"b");
}

#[test]
fn backspace_at_origin_is_a_noop() {
    let mut state = EditorState::with_rows(&["abc"]);
    state.delete_char();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"abc");
    assert_eq!((state.cursor_y, state.cursor_x), (0, 0));
}

#[test]
fn backspace_at_column_zero_merges_lines() {
    let mut state = EditorState::with_rows(&["ab", "cd"]);
    state.cursor_y = 1;
    state.delete_char();
    assert_eq!(state.buffer.row_count(), 1);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"abcd");
    assert_eq!((state.cursor_y, state.cursor_x), (0, 2));
}

#[test]
fn forward_delete_at_end_of_buffer_leaves_content_alone() {
    let mut state = EditorState::with_rows(&["ab"]);
    state.cursor_x = 2;
    // Forward delete is right-arrow then backspace.
    state.move_cursor(Move::Right);
    state.delete_char();
    assert_eq!(state.buffer.row_count(), 1);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"ab");
}

#[test]
fn newline_carries_indent_and_brace_bonus() {
    let mut state = EditorState::with_rows(&["    if (x) {"]);
    state.cursor_x = 12;
    state.insert_newline();
    assert_eq!(state.buffer.row_count(), 2);
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"        ");
    assert_eq!((state.cursor_y, state.cursor_x), (1, 8));

    // Typing `}` auto-unindents the fresh row by one level.
    state.insert_char(b'}');
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"    }");
    assert_eq!(state.cursor_x, 5);
}

#[test]
fn newline_at_column_zero_opens_row_above() {
    let mut state = EditorState::with_rows(&["text"]);
    state.insert_newline();
    assert_eq!(state.buffer.row_count(), 2);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"text");
    assert_eq!((state.cursor_y, state.cursor_x), (1, 0));
}

#[test]
fn word_deletion_spans_word_and_separators() {
    let mut state = EditorState::with_rows(&["foo bar_baz  qux"]);
    state.cursor_x = 13; // after "foo bar_baz  "
    state.delete_word_backward();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"foo qux");
    assert_eq!(state.cursor_x, 4);

    state.cursor_x = 0;
    state.delete_word_forward();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"qux");
}

#[test]
fn duplicate_delete_and_join_lines() {
    let mut state = EditorState::with_rows(&["one", "two"]);
    state.duplicate_line();
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"one");
    assert_eq!(state.cursor_y, 1);

    state.delete_line();
    assert_eq!(state.buffer.row_count(), 2);
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"two");

    state.cursor_y = 0;
    state.join_lines();
    assert_eq!(state.buffer.row_count(), 1);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"one two");
    assert_eq!(state.cursor_x, 4); // at the join point
}

#[test]
fn join_respects_existing_spaces() {
    let mut state = EditorState::with_rows(&["one ", "two"]);
    state.join_lines();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"one two");
}

#[test]
fn move_line_up_and_down_swap_neighbours() {
    let mut state = EditorState::with_rows(&["a", "b", "c"]);
    state.cursor_y = 1;
    state.move_line_up();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"b");
    assert_eq!(state.cursor_y, 0);

    state.move_line_down();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"a");
    assert_eq!(state.cursor_y, 1);
}

#[test]
fn indent_and_unindent_shift_cursor() {
    let mut state = EditorState::with_rows(&["text"]);
    state.cursor_x = 2;
    state.indent_line();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"    text");
    assert_eq!(state.cursor_x, 6);

    state.unindent_line();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"text");
    assert_eq!(state.cursor_x, 2);

    // A second unindent on an unindented row is a no-op.
    state.unindent_line();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"text");
}

#[test]
fn reflow_then_join_collapses_to_single_spaced_content() {
    let long = "// alpha beta gamma delta epsilon zeta eta theta iota kappa";
    let mut state = EditorState::with_rows(&[long]);
    state.wrap_column = 24;

    state.reflow_paragraph();
    assert!(state.buffer.row_count() > 1);
    for i in 0..state.buffer.row_count() {
        let row = state.buffer.row(i).unwrap();
        assert!(row.chars().starts_with(b"// "));
        assert!(row.len() <= 24);
    }

    state.cursor_y = 0;
    state.join_paragraph();
    assert_eq!(state.buffer.row_count(), 1);
    assert_eq!(state.buffer.row(0).unwrap().chars(), long.as_bytes());
}

#[test]
fn selection_replaced_by_typed_character() {
    let mut state = EditorState::with_rows(&["hello"]);
    state.cursor_x = 1;
    state.selection_start();
    state.cursor_x = 4;
    state.selection_extend();
    state.insert_char(b'X');
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"hXo");
    assert!(!state.selection.active);
}
