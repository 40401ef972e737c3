//! Burin entrypoint: one strictly single-threaded event loop.
//!
//! Byte in → key event → action → state mutation → one frame write. The
//! only blocking points are the decisecond-timeout terminal read and the
//! frame write; the SIGWINCH handler just sets a flag that the loop polls
//! between events. Interactive prompts (save-as, find, jump-to-line) nest
//! their own read/draw loops here because they own the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{Action, Flow, dispatch, translate};
use core_events::Key;
use core_input::read_key;
use core_render::Renderer;
use core_state::EditorState;
use core_syntax::Highlight;
use core_terminal::{RawTerminal, Tty, install_resize_handler, take_resize_pending, window_size, write_frame};
use std::path::PathBuf;
use tracing::{error, info};

/// Ctrl+Q presses required to quit with unsaved changes.
const QUIT_TIMES: u32 = 3;

#[derive(Parser, Debug)]
#[command(name = "burin", version, about = "Burin editor")]
struct Args {
    /// File to open at startup.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides `burin.toml` discovery).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // File logging; the terminal itself is the UI surface.
    let log_path = std::path::Path::new("burin.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }
    let appender = tracing_appender::rolling::never(".", "burin.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .init();
    info!(target: "runtime", "startup");

    // Log panics before the terminal guard's Drop restores the screen.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(target: "runtime.panic", ?info, "panic");
        default_panic(info);
    }));

    let args = Args::parse();
    let config_path = core_config::config_path(args.config.clone());
    let config = core_config::load_from(&config_path).unwrap_or_else(|e| {
        error!(target: "config", ?e, "config_load_failed");
        core_config::Config::default()
    });

    let mut state = EditorState::new();
    state.show_line_numbers = config.show_line_numbers;
    state.soft_wrap = config.soft_wrap;
    state.wrap_column = config.wrap_column;
    state.theme_count = core_render::THEMES.len();
    if let Some(name) = &config.theme
        && let Some(index) = core_render::find_by_name(name)
    {
        state.theme_index = index;
    }

    // Open before raw mode so a missing file dies with a readable error.
    if let Some(path) = &args.path {
        state.open(path)?;
    }

    let mut terminal = RawTerminal::new().context("terminal setup")?;
    let _term_guard = terminal.enter_guard()?;
    install_resize_handler();

    let mut tty = Tty;
    let (rows, columns) = window_size(&mut tty).context("window size")?;
    state.handle_resize(rows, columns);

    state.set_status("Burin | Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");

    let renderer = Renderer::new();
    let mut quit_times = QUIT_TIMES;

    loop {
        if take_resize_pending()
            && let Ok((rows, columns)) = window_size(&mut tty)
        {
            state.handle_resize(rows, columns);
        }

        let frame = renderer.refresh(&mut state);
        write_frame(&frame)?;

        let Some(key) = read_key(&mut tty)? else {
            continue;
        };
        let Some(action) = translate(key) else {
            continue;
        };

        match dispatch(action, &mut state) {
            Flow::Continue => {}
            Flow::Save => save(&mut state, &mut tty, &renderer)?,
            Flow::Find => find(&mut state, &mut tty, &renderer)?,
            Flow::JumpToLine => jump_to_line(&mut state, &mut tty, &renderer)?,
            Flow::Quit => {
                if state.is_dirty() && quit_times > 0 {
                    state.set_status(format!(
                        "You have unsaved changes. Save with Ctrl-S, or press \
                         Ctrl-Q {quit_times} more times to quit anyway."
                    ));
                    quit_times -= 1;
                    continue;
                }
                break;
            }
        }
        quit_times = QUIT_TIMES;

        // Preference toggles persist immediately.
        if matches!(action, Action::CycleTheme | Action::ToggleLineNumbers) {
            let updated = core_config::Config {
                theme: Some(core_render::theme(state.theme_index).name.to_string()),
                show_line_numbers: state.show_line_numbers,
                soft_wrap: state.soft_wrap,
                wrap_column: state.wrap_column,
            };
            if let Err(e) = core_config::save_to(&config_path, &updated) {
                error!(target: "config", ?e, "config_save_failed");
            }
        }
    }

    write_frame(b"\x1b[2J\x1b[H")?;
    info!(target: "runtime", "shutdown");
    Ok(())
}

/// Save the buffer, prompting for a filename when unnamed. Save-time I/O
/// failure is a status message, never fatal; the buffer stays dirty.
fn save(state: &mut EditorState, tty: &mut Tty, renderer: &Renderer) -> Result<()> {
    if state.filename.is_none() {
        let Some(name) = prompt(state, tty, renderer, "Save as: {} (ESC to cancel)", |_, _, _| {})?
        else {
            state.set_status("Save aborted");
            return Ok(());
        };
        state.buffer.select_language_for(&name);
        state.filename = Some(PathBuf::from(name));
    }

    match state.save() {
        Ok(bytes) => state.set_status(format!("{bytes} bytes written to disk")),
        Err(e) => {
            error!(target: "io", ?e, "save_failed");
            state.set_status(format!("Can't save! I/O error: {e:#}"));
        }
    }
    Ok(())
}

/// Jump-to-line prompt; centers the viewport on the target.
fn jump_to_line(state: &mut EditorState, tty: &mut Tty, renderer: &Renderer) -> Result<()> {
    let Some(input) = prompt(state, tty, renderer, "Jump to line: {} (ESC to cancel)", |_, _, _| {})?
    else {
        state.set_status("Jump cancelled");
        return Ok(());
    };

    let line: usize = match input.trim().parse() {
        Ok(n) => n,
        Err(_) => 0,
    };
    if line < 1 || line > state.buffer.row_count() {
        state.set_status(format!(
            "Invalid line number: {input} (valid: 1-{})",
            state.buffer.row_count()
        ));
        return Ok(());
    }

    state.selection_clear();
    state.cursor_y = line - 1;
    state.cursor_x = 0;

    let target = state.cursor_y.saturating_sub(state.screen_rows / 2);
    let max = state
        .buffer
        .row_count()
        .saturating_sub(state.screen_rows);
    state.row_offset = target.min(max);

    state.set_status(format!("Jumped to line {line}"));
    Ok(())
}

/// Incremental search: every keystroke re-runs the query; arrows step
/// through matches with wrap-around; the current match flashes with a
/// transient highlight restored before the next action.
fn find(state: &mut EditorState, tty: &mut Tty, renderer: &Renderer) -> Result<()> {
    let saved_cursor = (state.cursor_x, state.cursor_y);
    let saved_offsets = (state.column_offset, state.row_offset);

    let mut current: Option<usize> = None;
    let mut forward = true;
    let mut last_query = String::new();
    let mut saved_hl: Option<(usize, Vec<Highlight>)> = None;

    let accepted = prompt(
        state,
        tty,
        renderer,
        "Search: {} (Use ESC/Arrows/Enter)",
        |state, query, key| {
            // Undo the previous match flash before anything else.
            if let Some((line, hl)) = saved_hl.take()
                && let Some(row) = state.buffer.row_mut(line)
            {
                row.highlight_mut().copy_from_slice(&hl);
            }

            if matches!(key, Key::Enter | Key::Escape) {
                current = None;
                forward = true;
                last_query.clear();
                return;
            }

            match key {
                Key::Right | Key::Down => forward = true,
                Key::Left | Key::Up => forward = false,
                _ => {
                    current = None;
                    forward = true;
                }
            }

            if last_query != query {
                last_query = query.to_string();
                state.simple_search(query);
                current = None;
            }
            if state.search_results.is_empty() {
                return;
            }

            let len = state.search_results.len();
            let index = match current {
                None => {
                    if forward {
                        0
                    } else {
                        len - 1
                    }
                }
                Some(i) => {
                    if forward {
                        (i + 1) % len
                    } else {
                        (i + len - 1) % len
                    }
                }
            };
            current = Some(index);

            let result = state.search_results[index];
            let row = state.buffer.row(result.line).expect("match row exists");
            state.cursor_y = result.line;
            state.cursor_x = row.render_to_cursor(result.offset);
            // Force the next scroll pass to bring the match into view.
            state.row_offset = state.buffer.row_count();

            state.render_x = result.offset;
            if state.render_x < state.column_offset {
                state.column_offset = state.render_x;
            }
            let visible = state.screen_columns.saturating_sub(state.gutter_width);
            if state.render_x >= state.column_offset + visible {
                state.column_offset = (state.render_x + 1).saturating_sub(visible);
            }

            // Flash the match span.
            if let Some(row) = state.buffer.row_mut(result.line) {
                saved_hl = Some((result.line, row.highlight().to_vec()));
                let hl = row.highlight_mut();
                let end = (result.offset + result.length).min(hl.len());
                hl[result.offset..end].fill(Highlight::Match);
            }
        },
    )?;

    // Restore any lingering flash.
    if let Some((line, hl)) = saved_hl.take()
        && let Some(row) = state.buffer.row_mut(line)
    {
        row.highlight_mut().copy_from_slice(&hl);
    }

    if accepted.is_none() {
        state.cursor_x = saved_cursor.0;
        state.cursor_y = saved_cursor.1;
        state.column_offset = saved_offsets.0;
        state.row_offset = saved_offsets.1;
    }
    Ok(())
}

/// Status-bar prompt. `label` renders with `{}` replaced by the buffer;
/// the callback sees every keystroke for incremental behaviors. Returns
/// `None` on ESC, the final input on Enter.
fn prompt<F>(
    state: &mut EditorState,
    tty: &mut Tty,
    renderer: &Renderer,
    label: &str,
    mut callback: F,
) -> Result<Option<String>>
where
    F: FnMut(&mut EditorState, &str, Key),
{
    let mut buffer = String::new();
    loop {
        state.set_status(label.replace("{}", &buffer));
        let frame = renderer.refresh(state);
        write_frame(&frame)?;

        let Some(key) = read_key(tty)? else {
            continue;
        };

        match key {
            Key::Backspace | Key::Delete | Key::Ctrl('h') => {
                buffer.pop();
            }
            Key::Escape => {
                state.set_status("");
                callback(state, &buffer, key);
                return Ok(None);
            }
            Key::Enter => {
                if !buffer.is_empty() {
                    state.set_status("");
                    callback(state, &buffer, key);
                    return Ok(Some(buffer));
                }
            }
            Key::Char(c) if !c.is_control() && c.is_ascii() => {
                buffer.push(c);
            }
            _ => {}
        }

        callback(state, &buffer, key);
    }
}
