//! Multi-cursor editing: rebasing, dedup, and atomic undo.

use core_state::{EditorState, Move};

fn with_column_cursors(lines: &[&str], col: usize) -> EditorState {
    let mut state = EditorState::with_rows(lines);
    state.cursor_x = col;
    for line in 1..lines.len() {
        state.cursors.add((0, col), line, col);
    }
    state
}

#[test]
fn insert_at_three_cursors_then_undo_once() {
    let mut state = with_column_cursors(&["foo", "bar", "baz"], 0);
    state.insert_char(b'x');

    assert_eq!(state.buffer.row(0).unwrap().chars(), b"xfoo");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"xbar");
    assert_eq!(state.buffer.row(2).unwrap().chars(), b"xbaz");
    assert_eq!((state.cursor_y, state.cursor_x), (0, 1));
    let positions = state.cursors.positions();
    assert_eq!(
        positions.iter().map(|c| (c.line, c.column)).collect::<Vec<_>>(),
        vec![(1, 1), (2, 1)]
    );

    // The whole batch is one undo group.
    state.undo();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"foo");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"bar");
    assert_eq!(state.buffer.row(2).unwrap().chars(), b"baz");
}

#[test]
fn two_cursors_on_one_line_rebase_columns() {
    let mut state = EditorState::with_rows(&["abcdef"]);
    state.cursor_x = 1;
    state.cursors.add((0, 1), 0, 4);
    state.insert_char(b'_');
    // Inserts at columns 4 then 1; each cursor passes its own insert plus
    // any insert at or before it.
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"a_bcd_ef");
    assert_eq!((state.cursor_y, state.cursor_x), (0, 2));
    assert_eq!(state.cursors.positions()[0].column, 6);
}

#[test]
fn backspace_with_line_merges_rebases_lines() {
    let mut state = with_column_cursors(&["aa", "bb", "cc"], 0);
    // Cursors at (0,0) [no-op], (1,0) and (2,0): both merges happen.
    state.delete_char();
    assert_eq!(state.buffer.row_count(), 1);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"aabbcc");
    // Merged cursors land at the former end of the line they merged into.
    assert_eq!((state.cursor_y, state.cursor_x), (0, 0));
    let positions = state.cursors.positions();
    assert_eq!(
        positions.iter().map(|c| (c.line, c.column)).collect::<Vec<_>>(),
        vec![(0, 2), (0, 4)]
    );

    state.undo();
    assert_eq!(state.buffer.row_count(), 3);
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"bb");
}

#[test]
fn newline_at_all_cursors_rebases_rows() {
    let mut state = with_column_cursors(&["one", "two"], 1);
    state.insert_newline();
    assert_eq!(state.buffer.row_count(), 4);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"o");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"ne");
    assert_eq!(state.buffer.row(2).unwrap().chars(), b"t");
    assert_eq!(state.buffer.row(3).unwrap().chars(), b"wo");
    assert_eq!((state.cursor_y, state.cursor_x), (1, 0));
    assert_eq!(state.cursors.positions()[0].line, 3);

    state.undo();
    assert_eq!(state.buffer.row_count(), 2);
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"one");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"two");
}

#[test]
fn duplicate_line_once_per_unique_row() {
    let mut state = EditorState::with_rows(&["row"]);
    state.cursor_x = 0;
    state.cursors.add((0, 0), 0, 2); // second cursor on the same row
    state.duplicate_line();
    // One duplicate despite two cursors on the row.
    assert_eq!(state.buffer.row_count(), 2);
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"row");
}

#[test]
fn indent_shifts_every_cursor_on_the_row_once() {
    let mut state = with_column_cursors(&["aa", "bb"], 1);
    state.indent_line();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"    aa");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"    bb");
    assert_eq!(state.cursor_x, 5);
    assert_eq!(state.cursors.positions()[0].column, 5);

    state.unindent_line();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"aa");
    assert_eq!(state.cursor_x, 1);
}

#[test]
fn escape_clears_secondaries() {
    let mut state = with_column_cursors(&["a", "b", "c"], 0);
    assert_eq!(state.cursors.count(), 2);
    state.clear_cursors();
    assert_eq!(state.cursors.count(), 0);
    assert!(state.status.visible().unwrap().contains("Cleared 2"));
}

#[test]
fn movement_follows_and_dedups() {
    let mut state = EditorState::with_rows(&["abc", "def"]);
    state.cursors.add((0, 0), 1, 0);
    state.cursors.follow_primary = true;

    state.move_cursor(Move::Right);
    state.move_secondary_cursors(Move::Right);
    assert_eq!((state.cursor_y, state.cursor_x), (0, 1));
    assert_eq!(state.cursors.positions()[0].column, 1);

    // Walking the secondary onto the primary removes it.
    let mut state = EditorState::with_rows(&["ab"]);
    state.cursor_x = 1;
    state.cursors.add((1, 1), 0, 0); // primary argument avoids the overlap check
    state.move_secondary_cursors(Move::Right);
    assert_eq!(state.cursors.count(), 0);
}

#[test]
fn add_cursor_helpers_clamp_columns() {
    let mut state = EditorState::with_rows(&["long line here", "ab"]);
    state.cursor_x = 10;
    state.add_cursor_below();
    assert_eq!(state.cursors.positions()[0], core_state::CursorPos { line: 1, column: 2 });

    state.clear_cursors();
    state.cursor_y = 1;
    state.cursor_x = 2;
    state.add_cursor_above();
    assert_eq!(state.cursors.positions()[0], core_state::CursorPos { line: 0, column: 2 });
}

#[test]
fn dropped_cursor_overlaps_until_movement() {
    let mut state = EditorState::with_rows(&["abc"]);
    state.cursor_x = 1;
    state.add_cursor_at_primary();
    assert_eq!(state.cursors.count(), 1);
    assert!(state.cursors.allow_primary_overlap);
    state.dedup_cursors();
    assert_eq!(state.cursors.count(), 1); // overlap preserved

    state.add_cursor_at_primary();
    assert_eq!(state.cursors.count(), 1); // refused duplicate
}

#[test]
fn multicursor_paste_single_line() {
    let mut state = EditorState::with_rows(&["ab", "cd"]);
    state.selection_start();
    state.cursor_x = 2;
    state.selection_extend();
    state.copy(); // clipboard = "ab"
    state.selection_clear();

    state.cursor_x = 0;
    state.cursors.add((0, 0), 1, 0);
    state.paste();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"abab");
    assert_eq!(state.buffer.row(1).unwrap().chars(), b"abcd");
    assert_eq!((state.cursor_y, state.cursor_x), (0, 2));
    assert_eq!(state.cursors.positions()[0].column, 2);
}
