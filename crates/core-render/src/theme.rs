//! 24-bit color themes.
//!
//! The theme registry proper (loading palette files from disk) is a UI
//! concern; the core carries a small built-in set and a cycle operation.

/// One 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

/// Palette slots consumed by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    pub tilde: Rgb,
    pub current_line: Rgb,
    pub selection_bg: Rgb,
    pub selection_fg: Rgb,
    pub line_number: Rgb,
    pub line_number_bg: Rgb,
    pub line_number_current: Rgb,
    pub line_number_dirty: Rgb,
    pub status_bg: Rgb,
    pub status_fg: Rgb,
    pub message_bg: Rgb,
    pub message_fg: Rgb,
    pub syntax_normal: Rgb,
    pub syntax_comment: Rgb,
    pub syntax_keyword1: Rgb,
    pub syntax_keyword2: Rgb,
    pub syntax_string: Rgb,
    pub syntax_number: Rgb,
    pub syntax_match: Rgb,
}

pub static THEMES: &[Theme] = &[
    Theme {
        name: "graphite dark",
        background: rgb(24, 26, 31),
        foreground: rgb(212, 215, 221),
        tilde: rgb(84, 90, 101),
        current_line: rgb(34, 37, 44),
        selection_bg: rgb(58, 74, 106),
        selection_fg: rgb(234, 237, 242),
        line_number: rgb(92, 99, 112),
        line_number_bg: rgb(28, 30, 36),
        line_number_current: rgb(197, 203, 212),
        line_number_dirty: rgb(209, 154, 62),
        status_bg: rgb(46, 50, 60),
        status_fg: rgb(212, 215, 221),
        message_bg: rgb(28, 30, 36),
        message_fg: rgb(176, 182, 192),
        syntax_normal: rgb(212, 215, 221),
        syntax_comment: rgb(106, 115, 130),
        syntax_keyword1: rgb(198, 120, 221),
        syntax_keyword2: rgb(97, 175, 239),
        syntax_string: rgb(152, 195, 121),
        syntax_number: rgb(209, 154, 102),
        syntax_match: rgb(229, 192, 123),
    },
    Theme {
        name: "parchment light",
        background: rgb(246, 243, 236),
        foreground: rgb(52, 50, 44),
        tilde: rgb(186, 180, 166),
        current_line: rgb(237, 233, 222),
        selection_bg: rgb(196, 212, 232),
        selection_fg: rgb(32, 34, 40),
        line_number: rgb(158, 152, 140),
        line_number_bg: rgb(240, 236, 227),
        line_number_current: rgb(74, 71, 63),
        line_number_dirty: rgb(176, 112, 30),
        status_bg: rgb(222, 217, 205),
        status_fg: rgb(52, 50, 44),
        message_bg: rgb(240, 236, 227),
        message_fg: rgb(98, 94, 84),
        syntax_normal: rgb(52, 50, 44),
        syntax_comment: rgb(148, 142, 128),
        syntax_keyword1: rgb(143, 58, 172),
        syntax_keyword2: rgb(32, 94, 166),
        syntax_string: rgb(62, 120, 52),
        syntax_number: rgb(164, 92, 24),
        syntax_match: rgb(158, 112, 16),
    },
    Theme {
        name: "monochrome dark",
        background: rgb(16, 16, 16),
        foreground: rgb(200, 200, 200),
        tilde: rgb(90, 90, 90),
        current_line: rgb(28, 28, 28),
        selection_bg: rgb(70, 70, 70),
        selection_fg: rgb(240, 240, 240),
        line_number: rgb(100, 100, 100),
        line_number_bg: rgb(20, 20, 20),
        line_number_current: rgb(220, 220, 220),
        line_number_dirty: rgb(170, 170, 170),
        status_bg: rgb(50, 50, 50),
        status_fg: rgb(220, 220, 220),
        message_bg: rgb(20, 20, 20),
        message_fg: rgb(180, 180, 180),
        syntax_normal: rgb(200, 200, 200),
        syntax_comment: rgb(120, 120, 120),
        syntax_keyword1: rgb(235, 235, 235),
        syntax_keyword2: rgb(160, 160, 160),
        syntax_string: rgb(185, 185, 185),
        syntax_number: rgb(210, 210, 210),
        syntax_match: rgb(255, 255, 255),
    },
];

/// Theme by index, clamped into range.
pub fn theme(index: usize) -> &'static Theme {
    &THEMES[index.min(THEMES.len() - 1)]
}

/// Find a theme index by name (config lookup).
pub fn find_by_name(name: &str) -> Option<usize> {
    THEMES.iter().position(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_clamps_and_finds() {
        assert_eq!(theme(0).name, "graphite dark");
        assert_eq!(theme(999).name, THEMES[THEMES.len() - 1].name);
        assert_eq!(find_by_name("parchment light"), Some(1));
        assert_eq!(find_by_name("nope"), None);
    }
}
