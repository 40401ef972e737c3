//! Viewport selection, soft-wrap navigation, and tactile scroll speed.

use core_state::{EditorState, Move, ScrollSpeed};
use std::time::{Duration, Instant};

#[test]
fn edge_triggered_scrolling_tracks_the_cursor() {
    let lines: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut state = EditorState::with_rows(&refs);
    state.center_scroll = false;
    state.screen_rows = 10;
    state.screen_columns = 40;

    state.scroll();
    assert_eq!(state.row_offset, 0);

    state.cursor_y = 25;
    state.scroll();
    // Cursor lands on the last visible row.
    assert_eq!(state.row_offset, 25 - 10 + 1);

    state.cursor_y = 3;
    state.scroll();
    assert_eq!(state.row_offset, 3);
}

#[test]
fn centered_scrolling_keeps_cursor_mid_screen() {
    let lines: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut state = EditorState::with_rows(&refs);
    state.center_scroll = true;
    state.screen_rows = 10;
    state.screen_columns = 40;

    state.cursor_y = 25;
    state.scroll();
    assert_eq!(state.row_offset, 20);

    // Clamped near the ends.
    state.cursor_y = 1;
    state.scroll();
    assert_eq!(state.row_offset, 0);
    state.cursor_y = 49;
    state.scroll();
    assert_eq!(state.row_offset, 50 - 10 + 1);
}

#[test]
fn horizontal_scroll_without_soft_wrap() {
    let long = "x".repeat(200);
    let mut state = EditorState::with_rows(&[&long]);
    state.center_scroll = false;
    state.show_line_numbers = false;
    state.update_gutter_width();
    state.screen_rows = 10;
    state.screen_columns = 80;

    state.cursor_x = 120;
    state.scroll();
    assert_eq!(state.render_x, 120);
    assert_eq!(state.column_offset, 120 - 80 + 1);

    state.cursor_x = 10;
    state.scroll();
    assert_eq!(state.column_offset, 10);
}

#[test]
fn soft_wrap_arrow_up_moves_within_the_row() {
    let long = "y".repeat(200);
    let mut state = EditorState::with_rows(&[&long]);
    state.soft_wrap = true;
    state.show_line_numbers = false;
    state.update_gutter_width();
    state.screen_rows = 10;
    state.screen_columns = 80;

    // Render position 85 sits in wrap segment 1 (breaks at 80 and 160).
    state.cursor_x = 85;
    state.move_cursor(Move::Up);
    assert_eq!((state.cursor_y, state.cursor_x), (0, 5));

    state.cursor_x = 85;
    state.move_cursor(Move::Down);
    assert_eq!((state.cursor_y, state.cursor_x), (0, 165));
}

#[test]
fn soft_wrap_viewport_counts_visual_rows() {
    let long = "z".repeat(200);
    let mut state = EditorState::with_rows(&[&long, "short"]);
    state.soft_wrap = true;
    state.show_line_numbers = false;
    state.update_gutter_width();
    state.screen_rows = 10;
    state.screen_columns = 80;

    assert_eq!(state.row_visual_rows(0), 3);
    assert_eq!(state.visual_rows_before(1), 3);
    assert_eq!(state.visual_to_logical(0), Some((0, 0)));
    assert_eq!(state.visual_to_logical(2), Some((0, 2)));
    assert_eq!(state.visual_to_logical(3), Some((1, 0)));
    assert_eq!(state.visual_to_logical(4), None);
}

#[test]
fn resize_enforces_minimums_and_clamps() {
    let mut state = EditorState::with_rows(&["abc"]);
    state.cursor_y = 0;
    state.cursor_x = 3;
    state.handle_resize(1, 4);
    assert_eq!(state.screen_columns, 10);
    assert_eq!(state.screen_rows, 1);
    assert_eq!(state.cursor_x, 3);

    state.handle_resize(30, 120);
    assert_eq!(state.screen_rows, 28);
    assert_eq!(state.screen_columns, 120);
}

#[test]
fn gutter_width_follows_line_count() {
    let lines: Vec<String> = (0..120).map(|i| i.to_string()).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut state = EditorState::with_rows(&refs);
    state.update_gutter_width();
    assert_eq!(state.gutter_width, 4); // "120" plus one space

    state.show_line_numbers = false;
    state.update_gutter_width();
    assert_eq!(state.gutter_width, 0);
}

#[test]
fn scroll_speed_accelerates_and_resets() {
    let mut speed = ScrollSpeed::new();
    let t0 = Instant::now();
    // Make the first tick a slow one to settle at 1.
    assert_eq!(speed.tick_at(t0 + Duration::from_millis(500)), 1);

    let base = t0 + Duration::from_millis(500);
    let mut last = 1;
    for i in 1..=6 {
        last = speed.tick_at(base + Duration::from_millis(40 * i));
    }
    assert_eq!(last, 7);

    // Between the windows the speed holds steady.
    let hold = speed.tick_at(base + Duration::from_millis(40 * 6 + 100));
    assert_eq!(hold, 7);

    // A long pause resets to one step per tick.
    let reset = speed.tick_at(base + Duration::from_secs(2));
    assert_eq!(reset, 1);
}

#[test]
fn scroll_speed_caps_at_fifteen() {
    let mut speed = ScrollSpeed::new();
    let t0 = Instant::now();
    let mut last = 0;
    for i in 0..40 {
        last = speed.tick_at(t0 + Duration::from_millis(10 * i));
    }
    assert_eq!(last, 15);
}

#[test]
fn page_move_shifts_secondaries_by_the_same_delta() {
    let lines: Vec<String> = (0..40).map(|i| format!("{i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut state = EditorState::with_rows(&refs);
    state.center_scroll = false;
    state.screen_rows = 10;
    state.screen_columns = 40;
    state.cursor_y = 5;
    state.cursors.add((5, 0), 7, 0);

    state.page_move(false);
    let delta = state.cursor_y - 5;
    assert!(delta > 0);
    assert_eq!(state.cursors.positions()[0].line, 7 + delta);
}
