//! Per-row syntax classification.
//!
//! The scanner is a pure function of one row's render bytes plus a single
//! bit of inherited state: whether the previous row ended inside an
//! unterminated block comment. That bit is the only cross-row coupling, so
//! callers re-scan forward only while it keeps flipping.
//!
//! Invariants:
//! * The returned class vector has exactly one entry per render byte.
//! * Scanning the rows of a buffer in order with the returned `open_comment`
//!   bit threaded through is deterministic for fixed language rules.

use bitflags::bitflags;
use regex::bytes::Regex;
use tracing::warn;

mod languages;
pub use languages::{C_LANGUAGE, LANGUAGES, RUST_LANGUAGE};

/// Highlight class for one render byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Comment,
    MultilineComment,
    /// Control-flow keywords.
    Keyword1,
    /// Type keywords (marked by a trailing `|` in the keyword table).
    Keyword2,
    String,
    Number,
    /// Transient search-match paint; restored before the next action.
    Match,
    BracketMatch,
}

bitflags! {
    /// Per-language feature switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS = 1 << 0;
        const STRINGS = 1 << 1;
    }
}

/// A line-anchored pattern applied once at row start before the scanner runs.
#[derive(Debug, Clone, Copy)]
pub struct PatternDef {
    pub pattern: &'static str,
    pub highlight: Highlight,
}

/// Static description of one language's rules.
#[derive(Debug)]
pub struct Language {
    /// Display name shown in the status bar.
    pub name: &'static str,
    /// Filename patterns; entries starting with `.` match the extension,
    /// anything else matches as a substring of the full name.
    pub extensions: &'static [&'static str],
    /// Keyword table; a trailing `|` selects [`Highlight::Keyword2`].
    pub keywords: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
    pub patterns: &'static [PatternDef],
}

/// A pattern compiled for the active language. Compilation failures are
/// skipped at [`compile_patterns`] time, so every held regex is valid.
pub struct CompiledPattern {
    regex: Regex,
    highlight: Highlight,
}

/// Compile a language's pattern list. A pattern that fails to compile is
/// dropped with a warning and highlighting continues without it.
pub fn compile_patterns(language: &Language) -> Vec<CompiledPattern> {
    let mut out = Vec::with_capacity(language.patterns.len());
    for def in language.patterns {
        match Regex::new(def.pattern) {
            Ok(regex) => out.push(CompiledPattern {
                regex,
                highlight: def.highlight,
            }),
            Err(e) => {
                warn!(target: "syntax", language = language.name, pattern = def.pattern, error = %e, "pattern_compile_failed");
            }
        }
    }
    out
}

/// Select a language by filename. Extension entries require an exact
/// extension match; other entries match anywhere in the name.
pub fn detect(filename: &str) -> Option<&'static Language> {
    let extension = filename.rfind('.').map(|i| &filename[i..]);
    for language in LANGUAGES {
        for pat in language.extensions {
            let matched = if pat.starts_with('.') {
                extension == Some(pat)
            } else {
                filename.contains(pat)
            };
            if matched {
                return Some(language);
            }
        }
    }
    None
}

/// Word separators for keyword and number boundaries.
pub fn is_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0 || b",.()+-/*=~%<>[];".contains(&byte)
}

/// Classify one row of render bytes.
///
/// `starts_in_comment` is the previous row's `open_comment` bit (false for
/// row 0). Returns the per-byte classes and whether this row ends inside an
/// unterminated block comment.
pub fn scan_row(
    render: &[u8],
    language: &Language,
    patterns: &[CompiledPattern],
    starts_in_comment: bool,
) -> (Vec<Highlight>, bool) {
    let mut hl = vec![Highlight::Normal; render.len()];

    let line_comment = language.line_comment.map(str::as_bytes);
    let block = language
        .block_comment
        .map(|(s, e)| (s.as_bytes(), e.as_bytes()));

    let mut prev_sep = true;
    let mut in_string: u8 = 0;
    let mut in_comment = starts_in_comment;

    // Patterns paint before the scanner so directives and attributes win at
    // the start of the row; a row opening inside a comment skips them.
    if !in_comment {
        for pat in patterns {
            if let Some(m) = pat.regex.find(render) {
                if m.end() > m.start() && m.end() <= render.len() {
                    hl[m.start()..m.end()].fill(pat.highlight);
                }
            }
        }
    }

    let mut i = 0;
    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if let Some(lc) = line_comment {
            if in_string == 0 && !in_comment && render[i..].starts_with(lc) {
                hl[i..].fill(Highlight::Comment);
                break;
            }
        }

        if let Some((start, end)) = block {
            if in_string == 0 {
                if in_comment {
                    hl[i] = Highlight::MultilineComment;
                    if render[i..].starts_with(end) {
                        hl[i..i + end.len()].fill(Highlight::MultilineComment);
                        i += end.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        i += 1;
                    }
                    continue;
                } else if render[i..].starts_with(start) {
                    hl[i..i + start.len()].fill(Highlight::MultilineComment);
                    i += start.len();
                    in_comment = true;
                    continue;
                }
            }
        }

        if language.flags.contains(SyntaxFlags::STRINGS) {
            if in_string != 0 {
                hl[i] = Highlight::String;
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == in_string {
                    in_string = 0;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = c;
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if language.flags.contains(SyntaxFlags::NUMBERS)
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            let mut matched = false;
            for keyword in language.keywords {
                let kw = keyword.as_bytes();
                let kw2 = kw.last() == Some(&b'|');
                let kw = if kw2 { &kw[..kw.len() - 1] } else { kw };

                let boundary = i + kw.len() == render.len()
                    || (i + kw.len() < render.len() && is_separator(render[i + kw.len()]));
                if render[i..].starts_with(kw) && boundary {
                    let class = if kw2 {
                        Highlight::Keyword2
                    } else {
                        Highlight::Keyword1
                    };
                    hl[i..i + kw.len()].fill(class);
                    i += kw.len();
                    matched = true;
                    break;
                }
            }
            if matched {
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str, starts_in_comment: bool) -> (Vec<Highlight>, bool) {
        scan_row(text.as_bytes(), &C_LANGUAGE, &[], starts_in_comment)
    }

    #[test]
    fn classes_cover_every_render_byte() {
        let (hl, _) = scan("int x = 42; // done", false);
        assert_eq!(hl.len(), "int x = 42; // done".len());
    }

    #[test]
    fn line_comment_paints_to_end() {
        let (hl, open) = scan("x // rest", false);
        assert_eq!(hl[0], Highlight::Normal);
        assert!(hl[2..].iter().all(|&h| h == Highlight::Comment));
        assert!(!open);
    }

    #[test]
    fn unterminated_block_comment_sets_open() {
        let (hl, open) = scan("a /* b", false);
        assert!(open);
        assert_eq!(hl[2], Highlight::MultilineComment);
        assert_eq!(hl[5], Highlight::MultilineComment);
    }

    #[test]
    fn comment_continuation_closes_on_next_row() {
        let (hl, open) = scan("still */ code", true);
        assert!(!open);
        assert!(hl[..8].iter().all(|&h| h == Highlight::MultilineComment));
        assert_eq!(hl[9], Highlight::Normal);
    }

    #[test]
    fn string_escape_does_not_terminate() {
        let (hl, _) = scan(r#""a\"b" x"#, false);
        assert!(hl[..6].iter().all(|&h| h == Highlight::String));
        assert_eq!(hl[7], Highlight::Normal);
    }

    #[test]
    fn line_comment_marker_inside_string_is_text() {
        let (hl, _) = scan(r#""http://x""#, false);
        assert!(hl.iter().all(|&h| h == Highlight::String));
    }

    #[test]
    fn numbers_require_separator_boundary() {
        let (hl, _) = scan("x1 12.5", false);
        assert_eq!(hl[1], Highlight::Normal); // digit glued to a word
        assert!(hl[3..].iter().all(|&h| h == Highlight::Number));
    }

    #[test]
    fn keyword_classes_split_on_trailing_pipe() {
        let (hl, _) = scan("if int", false);
        assert_eq!(hl[0], Highlight::Keyword1);
        assert_eq!(hl[1], Highlight::Keyword1);
        assert_eq!(hl[3], Highlight::Keyword2);
    }

    #[test]
    fn keyword_needs_following_separator() {
        let (hl, _) = scan("iffy", false);
        assert!(hl.iter().all(|&h| h == Highlight::Normal));
    }

    #[test]
    fn keyword_at_end_of_row_matches() {
        let (hl, _) = scan("return", false);
        assert!(hl.iter().all(|&h| h == Highlight::Keyword1));
    }

    #[test]
    fn preprocessor_pattern_paints_directive() {
        let patterns = compile_patterns(&C_LANGUAGE);
        let (hl, _) = scan_row(b"#include <stdio.h>", &C_LANGUAGE, &patterns, false);
        assert_eq!(hl[0], Highlight::Keyword2);
        assert_eq!(hl[7], Highlight::Keyword2);
    }

    #[test]
    fn detect_by_extension_and_substring() {
        assert_eq!(detect("main.c").map(|l| l.name), Some("c"));
        assert_eq!(detect("lib.rs").map(|l| l.name), Some("rust"));
        assert_eq!(detect("notes.txt").map(|l| l.name), None);
    }

    #[test]
    fn bad_pattern_is_skipped() {
        static BROKEN: Language = Language {
            name: "broken",
            extensions: &[],
            keywords: &[],
            line_comment: None,
            block_comment: None,
            flags: SyntaxFlags::empty(),
            patterns: &[PatternDef {
                pattern: "(unclosed",
                highlight: Highlight::Keyword1,
            }],
        };
        assert!(compile_patterns(&BROKEN).is_empty());
    }
}
