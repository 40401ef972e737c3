//! ANSI escape primitives for the frame builder.

use crate::theme::Rgb;

pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
pub const CLEAR_LINE: &[u8] = b"\x1b[K";
pub const RESET: &[u8] = b"\x1b[0m";
pub const REVERSE_VIDEO: &[u8] = b"\x1b[7m";
pub const NORMAL_VIDEO: &[u8] = b"\x1b[m";
pub const UNDERLINE_ON: &[u8] = b"\x1b[4m";
pub const UNDERLINE_OFF: &[u8] = b"\x1b[24m";
pub const STRIKETHROUGH_ON: &[u8] = b"\x1b[9m";
pub const STRIKETHROUGH_OFF: &[u8] = b"\x1b[29m";
pub const CRLF: &[u8] = b"\r\n";
/// Clear all Kitty secondary cursors.
pub const KITTY_CURSOR_CLEAR: &[u8] = b"\x1b[>0;4 q";

pub fn move_to(buf: &mut Vec<u8>, row: usize, col: usize) {
    buf.extend_from_slice(format!("\x1b[{row};{col}H").as_bytes());
}

pub fn foreground(buf: &mut Vec<u8>, color: Rgb) {
    buf.extend_from_slice(format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b).as_bytes());
}

pub fn background(buf: &mut Vec<u8>, color: Rgb) {
    buf.extend_from_slice(format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b).as_bytes());
}

/// One Kitty multi-cursor cell (1-indexed coordinates).
pub fn kitty_cursor(buf: &mut Vec<u8>, row: usize, col: usize) {
    buf.extend_from_slice(format!("\x1b[>29;2:{row}:{col} q").as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::rgb;

    #[test]
    fn sequences_are_well_formed() {
        let mut buf = Vec::new();
        move_to(&mut buf, 3, 7);
        assert_eq!(buf, b"\x1b[3;7H");

        buf.clear();
        foreground(&mut buf, rgb(1, 2, 3));
        assert_eq!(buf, b"\x1b[38;2;1;2;3m");

        buf.clear();
        background(&mut buf, rgb(255, 0, 9));
        assert_eq!(buf, b"\x1b[48;2;255;0;9m");

        buf.clear();
        kitty_cursor(&mut buf, 5, 12);
        assert_eq!(buf, b"\x1b[>29;2:5:12 q");
    }
}
