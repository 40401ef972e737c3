//! Round-trip laws: undo peels edits exactly, redo replays them, and a new
//! edit below the top truncates the redoable groups.

use core_state::EditorState;
use std::thread::sleep;
use std::time::Duration;

fn rows(state: &EditorState) -> Vec<Vec<u8>> {
    (0..state.buffer.row_count())
        .map(|i| state.buffer.row(i).unwrap().chars().to_vec())
        .collect()
}

#[test]
fn typed_burst_undoes_as_one_group() {
    let mut state = EditorState::with_rows(&[]);
    for byte in *b"abc" {
        state.insert_char(byte);
    }
    state.undo();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"");
    state.undo();
    assert!(state.status.visible().unwrap().contains("Nothing to undo"));
}

#[test]
fn pause_splits_groups_and_new_edit_truncates_redo() {
    let mut state = EditorState::with_rows(&[]);
    for byte in *b"abc" {
        state.insert_char(byte);
    }
    sleep(Duration::from_millis(550));
    for byte in *b"def" {
        state.insert_char(byte);
    }
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"abcdef");

    state.undo();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"abc");
    state.undo();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"");

    // A fresh edit while fully rewound discards both old groups.
    state.insert_char(b'x');
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"x");
    state.undo();
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"");
    state.undo();
    assert!(state.status.visible().unwrap().contains("Nothing to undo"));
}

#[test]
fn full_undo_then_full_redo_restores_post_edit_state() {
    let mut state = EditorState::with_rows(&["seed"]);
    state.cursor_x = 4;
    for byte in *b" one" {
        state.insert_char(byte);
    }
    sleep(Duration::from_millis(550));
    state.insert_newline();
    for byte in *b"two" {
        state.insert_char(byte);
    }
    let after = rows(&state);

    state.undo();
    state.undo();
    state.undo();
    assert_eq!(rows(&state), vec![b"seed".to_vec()]);

    state.redo();
    state.redo();
    state.redo();
    assert_eq!(rows(&state), after);
    state.redo();
    assert!(state.status.visible().unwrap().contains("Nothing to redo"));
}

#[test]
fn newline_auto_indent_undoes_exactly() {
    let mut state = EditorState::with_rows(&["    if (x) {"]);
    state.cursor_x = 12;
    state.insert_newline();
    state.undo();
    assert_eq!(rows(&state), vec![b"    if (x) {".to_vec()]);
}

#[test]
fn closing_brace_unindent_undoes_exactly() {
    let mut state = EditorState::with_rows(&["        "]);
    state.cursor_x = 8;
    state.insert_char(b'}');
    assert_eq!(state.buffer.row(0).unwrap().chars(), b"    }");
    state.undo();
    assert_eq!(rows(&state), vec![b"        ".to_vec()]);
}

#[test]
fn line_merge_undo_splits_at_recorded_column() {
    let mut state = EditorState::with_rows(&["head", "tail"]);
    state.cursor_y = 1;
    state.delete_char();
    assert_eq!(rows(&state), vec![b"headtail".to_vec()]);

    state.undo();
    assert_eq!(rows(&state), vec![b"head".to_vec(), b"tail".to_vec()]);

    state.redo();
    assert_eq!(rows(&state), vec![b"headtail".to_vec()]);
}

#[test]
fn selection_delete_round_trips() {
    let mut state = EditorState::with_rows(&["alpha", "beta", "gamma"]);
    state.cursor_x = 2;
    state.selection_start();
    state.cursor_y = 2;
    state.cursor_x = 3;
    state.selection_extend();
    state.delete_selection();
    assert_eq!(rows(&state), vec![b"alma".to_vec()]);

    state.undo();
    assert_eq!(
        rows(&state),
        vec![b"alpha".to_vec(), b"beta".to_vec(), b"gamma".to_vec()]
    );

    state.redo();
    assert_eq!(rows(&state), vec![b"alma".to_vec()]);
}

#[test]
fn paste_undo_removes_the_pasted_range() {
    let mut state = EditorState::with_rows(&["ab"]);
    state.selection_start();
    state.cursor_x = 2;
    state.selection_extend();
    state.copy();
    state.selection_clear();

    state.cursor_x = 1;
    state.paste();
    assert_eq!(rows(&state), vec![b"aabb".to_vec()]);
    state.undo();
    assert_eq!(rows(&state), vec![b"ab".to_vec()]);
    state.redo();
    assert_eq!(rows(&state), vec![b"aabb".to_vec()]);
}

#[test]
fn multiline_paste_is_literal_and_round_trips() {
    let mut state = EditorState::with_rows(&["    indented", "x"]);
    state.select_all();
    state.copy();
    state.selection_clear();
    let content = rows(&state);

    // Paste over everything: select-all, copy, paste is a buffer no-op.
    state.select_all();
    state.paste();
    assert_eq!(rows(&state), content);

    state.undo(); // remove pasted payload
    state.undo(); // restore the deleted selection
    assert_eq!(rows(&state), content);
}

#[test]
fn line_comment_toggle_twice_is_identity_and_undoes() {
    let mut state = EditorState::with_rows(&["    int x;"]);
    state.buffer.set_language(Some(&core_syntax::C_LANGUAGE));
    state.cursor_x = 6;

    state.toggle_line_comment();
    assert_eq!(rows(&state), vec![b"    // int x;".to_vec()]);
    assert_eq!(state.cursor_x, 9);

    state.toggle_line_comment();
    assert_eq!(rows(&state), vec![b"    int x;".to_vec()]);
    assert_eq!(state.cursor_x, 6);

    state.toggle_line_comment();
    state.undo();
    assert_eq!(rows(&state), vec![b"    int x;".to_vec()]);
}

#[test]
fn block_comment_toggle_twice_is_identity() {
    let mut state = EditorState::with_rows(&["  content here  "]);
    state.buffer.set_language(Some(&core_syntax::C_LANGUAGE));

    state.toggle_block_comment();
    assert_eq!(rows(&state), vec![b"  /* content here */  ".to_vec()]);

    state.toggle_block_comment();
    assert_eq!(rows(&state), vec![b"  content here  ".to_vec()]);
}

#[test]
fn line_operations_undo_atomically() {
    let mut state = EditorState::with_rows(&["a", "b"]);
    state.move_line_down();
    assert_eq!(rows(&state), vec![b"b".to_vec(), b"a".to_vec()]);
    state.undo();
    assert_eq!(rows(&state), vec![b"a".to_vec(), b"b".to_vec()]);

    state.join_lines();
    assert_eq!(rows(&state), vec![b"a b".to_vec()]);
    state.undo();
    assert_eq!(rows(&state), vec![b"a".to_vec(), b"b".to_vec()]);

    state.duplicate_line();
    state.undo();
    assert_eq!(rows(&state), vec![b"a".to_vec(), b"b".to_vec()]);

    state.delete_line();
    assert_eq!(rows(&state), vec![b"b".to_vec()]);
    state.undo();
    assert_eq!(rows(&state), vec![b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn reflow_undo_restores_original_paragraph() {
    let original = vec![
        b"// one two three four five six seven".to_vec(),
        b"// eight nine ten".to_vec(),
    ];
    let mut state = EditorState::with_rows(&[
        "// one two three four five six seven",
        "// eight nine ten",
    ]);
    state.wrap_column = 16;
    state.reflow_paragraph();
    assert!(state.buffer.row_count() > 2);

    state.undo();
    assert_eq!(rows(&state), original);
}

#[test]
fn word_delete_undo_restores_text() {
    let mut state = EditorState::with_rows(&["alpha beta"]);
    state.cursor_x = 10;
    state.delete_word_backward();
    assert_eq!(rows(&state), vec![b"alpha ".to_vec()]);
    state.undo();
    assert_eq!(rows(&state), vec![b"alpha beta".to_vec()]);
}

#[test]
fn undo_cursor_restores_pre_edit_position() {
    let mut state = EditorState::with_rows(&["abc"]);
    state.cursor_x = 1;
    state.insert_char(b'Z');
    assert_eq!((state.cursor_y, state.cursor_x), (0, 2));
    state.undo();
    assert_eq!((state.cursor_y, state.cursor_x), (0, 1));
}
