//! Normalized input event types.
//!
//! The decoder in `core-input` maps raw terminal bytes into these values;
//! key bindings dispatch on them and never see terminal quirks. Control
//! bytes are surfaced as `Ctrl(letter)` chords (`0x11` → `Ctrl('q')`,
//! `0x1f` → `Ctrl('/')`), ESC-prefixed letters as `Alt(letter)`.

use bitflags::bitflags;
use std::fmt;

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Alt(char),
    Enter,
    Tab,
    ShiftTab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    ShiftUp,
    ShiftDown,
    ShiftLeft,
    ShiftRight,
    ShiftHome,
    ShiftEnd,
    CtrlLeft,
    CtrlRight,
    CtrlDelete,
    AltUp,
    AltDown,
    AltShiftUp,
    AltShiftDown,
    F(u8),
    Mouse(MouseEvent),
}

bitflags! {
    /// Modifier bits carried by SGR mouse reports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseMods: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Press,
    Release,
    /// Motion while a button is held (drag).
    Motion,
}

/// One parsed SGR mouse report. Coordinates are 1-indexed as the terminal
/// sends them; consumers convert to screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub mods: MouseMods,
    pub column: u16,
    pub row: u16,
    pub kind: MouseEventKind,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Ctrl(c) => write!(f, "C-{c}"),
            Key::Alt(c) => write!(f, "M-{c}"),
            Key::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_display() {
        assert_eq!(Key::Ctrl('q').to_string(), "C-q");
        assert_eq!(Key::Alt('w').to_string(), "M-w");
        assert_eq!(Key::F(10).to_string(), "F10");
    }

    #[test]
    fn mouse_mods_compose() {
        let mods = MouseMods::SHIFT | MouseMods::CTRL;
        assert!(mods.contains(MouseMods::SHIFT));
        assert!(!mods.contains(MouseMods::ALT));
    }
}
