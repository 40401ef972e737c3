//! Raw TTY backend.
//!
//! Owns the three pieces of terminal plumbing the editor core consumes:
//! raw-mode toggling with guaranteed restoration, byte reads with a
//! decisecond timeout (VMIN = 0, VTIME = 1), and window-size queries with
//! the cursor-position-report fallback. The SIGWINCH handler does nothing
//! but store into an atomic flag; the main loop polls it between events.

use anyhow::{Context, Result, bail};
use core_input::ByteSource;
use std::io::{self, Write};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const MOUSE_ENABLE: &[u8] = b"\x1b[?1006h\x1b[?1002h";
const MOUSE_DISABLE: &[u8] = b"\x1b[?1006l\x1b[?1002l";
const CURSOR_TO_CORNER: &[u8] = b"\x1b[999C\x1b[999B";
const CURSOR_REPORT_QUERY: &[u8] = b"\x1b[6n";

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigwinch(_signal: libc::c_int) {
    // Async-signal context: flag store only, no allocation, no I/O.
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Install the SIGWINCH handler.
pub fn install_resize_handler() {
    unsafe {
        libc::signal(libc::SIGWINCH, on_sigwinch as libc::sighandler_t);
    }
}

/// Consume the pending-resize flag.
pub fn take_resize_pending() -> bool {
    RESIZE_PENDING.swap(false, Ordering::Relaxed)
}

/// Raw-mode owner. Captures the original termios up front so every exit
/// path (drop, guard drop, panic unwinding through either) restores it.
pub struct RawTerminal {
    original: libc::termios,
    entered: bool,
}

/// RAII guard ensuring terminal restoration even if the caller early-returns
/// or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut RawTerminal,
}

impl RawTerminal {
    pub fn new() -> Result<Self> {
        let mut original: libc::termios = unsafe { mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut original) } == -1 {
            bail!("tcgetattr: {}", io::Error::last_os_error());
        }
        Ok(Self {
            original,
            entered: false,
        })
    }

    /// Enter raw mode and return a guard that leaves on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard { backend: self })
    }

    /// Disable canonical mode, echo, signal keys, input translation and
    /// output post-processing; 8-bit chars; VMIN = 0, VTIME = 1 so reads
    /// time out after one decisecond. Enables SGR mouse reporting.
    pub fn enter(&mut self) -> Result<()> {
        if self.entered {
            return Ok(());
        }
        let mut raw = self.original;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw) } == -1 {
            bail!("tcsetattr: {}", io::Error::last_os_error());
        }
        write_frame(MOUSE_ENABLE).context("enable mouse reporting")?;
        self.entered = true;
        debug!(target: "terminal", "raw_mode_entered");
        Ok(())
    }

    pub fn leave(&mut self) -> Result<()> {
        if !self.entered {
            return Ok(());
        }
        let _ = write_frame(MOUSE_DISABLE);
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &self.original) } == -1 {
            bail!("tcsetattr: {}", io::Error::last_os_error());
        }
        self.entered = false;
        debug!(target: "terminal", "raw_mode_left");
        Ok(())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}

/// Byte reader over stdin. Relies on the raw-mode VMIN/VTIME settings for
/// its timeout; outside raw mode reads simply block.
#[derive(Default)]
pub struct Tty;

impl ByteSource for Tty {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), 1) };
        match n {
            1 => Ok(Some(buf[0])),
            // VTIME expired with no input.
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // EINTR: SIGWINCH interrupted the read; the loop picks
                    // the flag up on its next pass.
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err).context("terminal read"),
                }
            }
        }
    }
}

/// One consolidated write per refresh.
pub fn write_frame(frame: &[u8]) -> Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(frame)?;
    out.flush()?;
    Ok(())
}

/// Terminal dimensions as `(rows, columns)`. Uses the window-size ioctl,
/// falling back to a cursor-position report from the bottom-right corner.
pub fn window_size(tty: &mut Tty) -> Result<(usize, usize)> {
    let mut ws: libc::winsize = unsafe { mem::zeroed() };
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if ok == -1 || ws.ws_col == 0 {
        write_frame(CURSOR_TO_CORNER)?;
        return cursor_position(tty);
    }
    Ok((ws.ws_row as usize, ws.ws_col as usize))
}

/// Ask the terminal where the cursor is: `ESC [ 6 n` answered by
/// `ESC [ rows ; cols R`.
fn cursor_position(tty: &mut Tty) -> Result<(usize, usize)> {
    write_frame(CURSOR_REPORT_QUERY)?;

    let mut buf = Vec::with_capacity(32);
    while buf.len() < 31 {
        match tty.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => buf.push(b),
        }
    }

    let reply = std::str::from_utf8(&buf).unwrap_or("");
    let body = reply
        .strip_prefix("\x1b[")
        .context("malformed cursor position report")?;
    let (rows, cols) = body
        .split_once(';')
        .context("malformed cursor position report")?;
    Ok((
        rows.parse().context("cursor report rows")?,
        cols.parse().context("cursor report cols")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_flag_is_consumed_once() {
        RESIZE_PENDING.store(true, Ordering::Relaxed);
        assert!(take_resize_pending());
        assert!(!take_resize_pending());
    }
}
