//! Built-in language table.

use crate::{Highlight, Language, PatternDef, SyntaxFlags};

pub static C_LANGUAGE: Language = Language {
    name: "c",
    extensions: &[".c", ".h", ".cpp"],
    keywords: &[
        "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
        "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|",
        "char|", "unsigned|", "signed|", "void|",
    ],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    patterns: &[PatternDef {
        // Preprocessor directive at row start.
        pattern: r"^[ \t]*#[ \t]*[A-Za-z]+",
        highlight: Highlight::Keyword2,
    }],
};

pub static RUST_LANGUAGE: Language = Language {
    name: "rust",
    extensions: &[".rs"],
    keywords: &[
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "fn", "for", "if",
        "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "self", "static", "struct", "trait", "type", "unsafe", "use", "where", "while", "bool|",
        "char|", "f32|", "f64|", "i8|", "i16|", "i32|", "i64|", "isize|", "str|", "u8|", "u16|",
        "u32|", "u64|", "usize|", "String|", "Vec|", "Option|", "Result|",
    ],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    patterns: &[PatternDef {
        // Outer or inner attribute at row start.
        pattern: r"^[ \t]*#!?\[[^\]]*\]",
        highlight: Highlight::Keyword2,
    }],
};

pub static LANGUAGES: &[&Language] = &[&C_LANGUAGE, &RUST_LANGUAGE];
