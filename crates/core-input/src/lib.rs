//! Byte-sequence decoding: raw terminal bytes → [`Key`] events.
//!
//! The decoder is a small explicit state machine over a [`ByteSource`].
//! A source returns `Ok(None)` when no byte arrives within its timeout;
//! the decoder uses that to disambiguate a lone ESC press from the start
//! of an escape sequence. Decoding never blocks beyond the source's own
//! timeout and never interprets bindings; that is the dispatcher's job.

use anyhow::Result;
use core_events::{Key, MouseButton, MouseEvent, MouseEventKind, MouseMods};
use tracing::trace;

/// One byte at a time, or `None` on timeout.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

const ESC: u8 = 0x1b;
/// Longest accepted SGR mouse parameter run (`button;col;row` plus finals).
const MOUSE_SEQ_MAX: usize = 32;

/// Read and decode one key event. `Ok(None)` means the read timed out with
/// no pending input.
pub fn read_key(source: &mut dyn ByteSource) -> Result<Option<Key>> {
    let Some(byte) = source.read_byte()? else {
        return Ok(None);
    };
    if byte != ESC {
        return Ok(Some(decode_plain(byte)));
    }

    // ESC seen: peek the follow-up byte. A timeout here is a lone ESC.
    let Some(b0) = source.read_byte()? else {
        return Ok(Some(Key::Escape));
    };

    // Alt-letter chords arrive as ESC + letter.
    if let Some(key) = decode_alt_letter(b0) {
        return Ok(Some(key));
    }
    if b0 == b']' {
        return Ok(Some(Key::Alt(']')));
    }

    let Some(b1) = source.read_byte()? else {
        // ESC [ then silence is Alt+[ (ESC O then silence degrades to ESC).
        return Ok(Some(if b0 == b'[' { Key::Alt('[') } else { Key::Escape }));
    };

    let key = match b0 {
        b'[' => match b1 {
            b'<' => return parse_sgr_mouse(source),
            b'0'..=b'9' => return decode_parametric(source, b1),
            b'A' => Key::Up,
            b'B' => Key::Down,
            b'C' => Key::Right,
            b'D' => Key::Left,
            b'H' => Key::Home,
            b'F' => Key::End,
            b'Z' => Key::ShiftTab,
            _ => Key::Escape,
        },
        b'O' => match b1 {
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        },
        _ => Key::Escape,
    };
    Ok(Some(key))
}

fn decode_plain(byte: u8) -> Key {
    match byte {
        b'\r' => Key::Enter,
        b'\t' => Key::Tab,
        127 => Key::Backspace,
        0x1f => Key::Ctrl('/'),
        0x1c => Key::Ctrl('\\'),
        0x1d => Key::Ctrl(']'),
        1..=26 => Key::Ctrl((b'a' + byte - 1) as char),
        0 => Key::Ctrl('@'),
        0x1e => Key::Ctrl('^'),
        _ => Key::Char(byte as char),
    }
}

fn decode_alt_letter(byte: u8) -> Option<Key> {
    let lower = byte.to_ascii_lowercase();
    if b"tlqjsrnwcvzm".contains(&lower) {
        Some(Key::Alt(lower as char))
    } else {
        None
    }
}

/// `ESC [ <digit> ...`: tilde keys, F10, and modifier-parameter escapes.
fn decode_parametric(source: &mut dyn ByteSource, digit: u8) -> Result<Option<Key>> {
    let Some(b2) = source.read_byte()? else {
        return Ok(Some(Key::Escape));
    };

    if b2 == b'~' {
        let key = match digit {
            b'1' | b'7' => Key::Home,
            b'4' | b'8' => Key::End,
            b'3' => Key::Delete,
            b'5' => Key::PageUp,
            b'6' => Key::PageDown,
            _ => Key::Escape,
        };
        return Ok(Some(key));
    }

    if digit == b'2' && b2 == b'1' {
        // F10 is ESC [ 2 1 ~.
        let Some(b3) = source.read_byte()? else {
            return Ok(Some(Key::Escape));
        };
        return Ok(Some(if b3 == b'~' { Key::F(10) } else { Key::Escape }));
    }

    if digit == b'3' && b2 == b';' {
        // Ctrl+Delete is ESC [ 3 ; 5 ~.
        let (Some(b3), Some(b4)) = (source.read_byte()?, source.read_byte()?) else {
            return Ok(Some(Key::Escape));
        };
        return Ok(Some(if b3 == b'5' && b4 == b'~' {
            Key::CtrlDelete
        } else {
            Key::Escape
        }));
    }

    if digit == b'1' && b2 == b';' {
        // ESC [ 1 ; <modifier> <key>: 2=Shift, 3=Alt, 4=Alt+Shift, 5=Ctrl.
        let (Some(modifier), Some(key)) = (source.read_byte()?, source.read_byte()?) else {
            return Ok(Some(Key::Escape));
        };
        let decoded = match (modifier, key) {
            (b'2', b'A') => Key::ShiftUp,
            (b'2', b'B') => Key::ShiftDown,
            (b'2', b'C') => Key::ShiftRight,
            (b'2', b'D') => Key::ShiftLeft,
            (b'2', b'H') => Key::ShiftHome,
            (b'2', b'F') => Key::ShiftEnd,
            (b'3', b'A') => Key::AltUp,
            (b'3', b'B') => Key::AltDown,
            (b'4', b'A') => Key::AltShiftUp,
            (b'4', b'B') => Key::AltShiftDown,
            (b'5', b'C') => Key::CtrlRight,
            (b'5', b'D') => Key::CtrlLeft,
            _ => Key::Escape,
        };
        return Ok(Some(decoded));
    }

    Ok(Some(Key::Escape))
}

/// `ESC [ < button ; col ; row (M|m)`: SGR extended mouse report.
fn parse_sgr_mouse(source: &mut dyn ByteSource) -> Result<Option<Key>> {
    let mut buf = Vec::with_capacity(MOUSE_SEQ_MAX);
    let final_byte = loop {
        let Some(b) = source.read_byte()? else {
            return Ok(Some(Key::Escape));
        };
        if b == b'M' || b == b'm' {
            break b;
        }
        buf.push(b);
        if buf.len() >= MOUSE_SEQ_MAX {
            return Ok(Some(Key::Escape));
        }
    };

    let text = std::str::from_utf8(&buf).unwrap_or("");
    let mut fields = text.split(';');
    let (Some(button), Some(column), Some(row)) = (
        fields.next().and_then(|f| f.parse::<u16>().ok()),
        fields.next().and_then(|f| f.parse::<u16>().ok()),
        fields.next().and_then(|f| f.parse::<u16>().ok()),
    ) else {
        trace!(target: "input.decode", raw = text, "mouse_parse_failed");
        return Ok(Some(Key::Escape));
    };

    // Bit 5 is motion; bits 2-4 are Shift/Alt/Ctrl; the low bits are the
    // button, except scroll values 64/65 which keep their full value.
    let is_motion = button & 32 != 0;
    let base = button & !32;
    let button = if base >= 64 {
        match base {
            64 => MouseButton::ScrollUp,
            65 => MouseButton::ScrollDown,
            other => MouseButton::Other(other as u8),
        }
    } else {
        match base & 3 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other as u8),
        }
    };

    let mut mods = MouseMods::empty();
    if base & 4 != 0 {
        mods |= MouseMods::SHIFT;
    }
    if base & 8 != 0 {
        mods |= MouseMods::ALT;
    }
    if base & 16 != 0 {
        mods |= MouseMods::CTRL;
    }

    let kind = if final_byte == b'm' {
        MouseEventKind::Release
    } else if is_motion {
        MouseEventKind::Motion
    } else {
        MouseEventKind::Press
    };

    Ok(Some(Key::Mouse(MouseEvent {
        button,
        mods,
        column,
        row,
        kind,
    })))
}
