//! Bracket matching.
//!
//! Recomputed once per refresh. Resolution order: if the cursor sits inside
//! an unterminated block comment, the comment's delimiters pair up; next, a
//! bracket or delimiter exactly under the cursor matches directly; finally
//! a backward scan finds the nearest unmatched opener enclosing the cursor.
//! All scans track string state (double/single quote, backslash-parity
//! escapes) and nested block comments so brackets inside either are ignored.

use crate::EditorState;

/// Matcher result: the partner position plus both delimiter spans.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BracketState {
    pub match_pos: Option<(usize, usize)>,
    /// `(row, col, len)` of the opening delimiter.
    pub open: Option<(usize, usize, usize)>,
    /// `(row, col, len)` of the closing delimiter.
    pub close: Option<(usize, usize, usize)>,
}

impl BracketState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn matching_bracket(byte: u8) -> Option<u8> {
    Some(match byte {
        b'(' => b')',
        b')' => b'(',
        b'[' => b']',
        b']' => b'[',
        b'{' => b'}',
        b'}' => b'{',
        _ => return None,
    })
}

fn is_opening(byte: u8) -> bool {
    matches!(byte, b'(' | b'[' | b'{')
}

/// Count of consecutive backslashes ending right before `col`; an odd
/// count escapes the quote at `col`.
fn escaped(chars: &[u8], col: usize) -> bool {
    let mut backslashes = 0;
    let mut i = col;
    while i > 0 && chars[i - 1] == b'\\' {
        backslashes += 1;
        i -= 1;
    }
    backslashes % 2 == 1
}

impl EditorState {
    fn block_markers(&self) -> Option<(&'static [u8], &'static [u8])> {
        self.buffer
            .language()
            .and_then(|l| l.block_comment)
            .map(|(s, e)| (s.as_bytes(), e.as_bytes()))
    }

    /// Recompute the bracket-match state for the current cursor. Returns
    /// true when a pair was recorded.
    pub fn find_matching_bracket(&mut self) -> bool {
        self.bracket.reset();
        if self.cursor_y >= self.buffer.row_count() {
            return false;
        }

        // Inside an unterminated block comment the delimiters are the pair.
        if let Some((row, col)) = self.cursor_in_multiline_comment() {
            return self.match_from(row, col);
        }

        if self.cursor_x >= self.current_row_len() {
            return false;
        }
        if self.match_from(self.cursor_y, self.cursor_x) {
            return true;
        }

        self.match_enclosing()
    }

    /// Jump the cursor to the partner of the bracket at/enclosing it.
    pub fn jump_to_matching_bracket(&mut self) {
        if self.find_matching_bracket()
            && let Some((row, col)) = self.bracket.match_pos
        {
            self.cursor_y = row;
            self.cursor_x = col;
        }
    }

    /// Move past the nearest unmatched closing bracket after the cursor.
    pub fn skip_closing_pair(&mut self) {
        if self.cursor_y >= self.buffer.row_count() {
            return;
        }
        let mut nesting = 0usize;
        for row in self.cursor_y..self.buffer.row_count() {
            let chars = self.buffer.row(row).expect("row exists").chars();
            let start = if row == self.cursor_y { self.cursor_x } else { 0 };
            for (col, &byte) in chars.iter().enumerate().skip(start) {
                if is_opening(byte) {
                    nesting += 1;
                } else if matches!(byte, b')' | b']' | b'}') {
                    if nesting == 0 {
                        self.cursor_y = row;
                        self.cursor_x = col + 1;
                        return;
                    }
                    nesting -= 1;
                }
            }
        }
    }

    /// Move just past the nearest unmatched opening bracket before the
    /// cursor.
    pub fn skip_opening_pair(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut nesting = 0usize;
        let mut row = self.cursor_y.min(self.buffer.row_count() - 1) as isize;
        while row >= 0 {
            let chars = self.buffer.row(row as usize).expect("row exists").chars();
            let mut col = if row as usize == self.cursor_y {
                self.cursor_x as isize - 1
            } else {
                chars.len() as isize - 1
            };
            while col >= 0 {
                let byte = chars[col as usize];
                if matches!(byte, b')' | b']' | b'}') {
                    nesting += 1;
                } else if is_opening(byte) {
                    if nesting == 0 {
                        self.cursor_y = row as usize;
                        self.cursor_x = col as usize + 1;
                        return;
                    }
                    nesting -= 1;
                }
                col -= 1;
            }
            row -= 1;
        }
    }

    /// Forward scan from the buffer start to the cursor tracking comment
    /// and string state; reports the opening delimiter when the cursor is
    /// inside an unterminated block comment.
    fn cursor_in_multiline_comment(&self) -> Option<(usize, usize)> {
        let (ml_start, ml_end) = self.block_markers()?;

        let mut in_comment = false;
        let mut comment_start = (0, 0);
        let mut in_string: u8 = 0;

        for row in 0..=self.cursor_y.min(self.buffer.row_count() - 1) {
            let chars = self.buffer.row(row).expect("row exists").chars();
            let limit = if row == self.cursor_y {
                self.cursor_x.min(chars.len())
            } else {
                chars.len()
            };
            let mut col = 0;
            while col < limit {
                let byte = chars[col];
                if !in_comment {
                    if in_string != 0 {
                        if byte == in_string && !escaped(chars, col) {
                            in_string = 0;
                        }
                        col += 1;
                        continue;
                    }
                    if byte == b'"' || byte == b'\'' {
                        in_string = byte;
                        col += 1;
                        continue;
                    }
                    if chars[col..].starts_with(ml_start) {
                        in_comment = true;
                        comment_start = (row, col);
                        col += ml_start.len();
                        continue;
                    }
                } else if chars[col..].starts_with(ml_end) {
                    in_comment = false;
                    col += ml_end.len();
                    continue;
                }
                col += 1;
            }
        }

        in_comment.then_some(comment_start)
    }

    /// Try to match whatever sits exactly at `(row, col)`: a block-comment
    /// delimiter pairs with its counterpart by plain text search, a bracket
    /// by depth-counting in its direction.
    pub(crate) fn match_from(&mut self, start_row: usize, start_col: usize) -> bool {
        self.bracket.reset();
        let Some(row) = self.buffer.row(start_row) else {
            return false;
        };
        if start_col >= row.len() {
            return false;
        }
        let current = row.chars()[start_col];

        if let Some((ml_start, ml_end)) = self.block_markers() {
            if row.chars()[start_col..].starts_with(ml_start) {
                if let Some((r, c)) =
                    self.search_text_forward(ml_end, start_row, start_col + ml_start.len())
                {
                    self.bracket = BracketState {
                        match_pos: Some((r, c)),
                        open: Some((start_row, start_col, ml_start.len())),
                        close: Some((r, c, ml_end.len())),
                    };
                    return true;
                }
                return false;
            }
            if row.chars()[start_col..].starts_with(ml_end) {
                if let Some((r, c)) =
                    self.search_text_backward(ml_start, start_row, start_col as isize - 1)
                {
                    self.bracket = BracketState {
                        match_pos: Some((r, c)),
                        open: Some((r, c, ml_start.len())),
                        close: Some((start_row, start_col, ml_end.len())),
                    };
                    return true;
                }
                return false;
            }
        }

        let Some(partner) = matching_bracket(current) else {
            return false;
        };
        let forward = is_opening(current);
        let found = if forward {
            self.scan_bracket_forward(current, partner, start_row, start_col)
        } else {
            self.scan_bracket_backward(current, partner, start_row, start_col)
        };
        if let Some((r, c)) = found {
            self.bracket.match_pos = Some((r, c));
            if forward {
                self.bracket.open = Some((start_row, start_col, 1));
                self.bracket.close = Some((r, c, 1));
            } else {
                self.bracket.open = Some((r, c, 1));
                self.bracket.close = Some((start_row, start_col, 1));
            }
            true
        } else {
            false
        }
    }

    /// Backward scan for the nearest unmatched opener of any type, per-type
    /// depth counters, honoring string and comment state; the first opener
    /// found at depth zero resolves through [`Self::match_from`].
    fn match_enclosing(&mut self) -> bool {
        let markers = self.block_markers();
        let mut paren_depth = 0usize;
        let mut bracket_depth = 0usize;
        let mut brace_depth = 0usize;
        let mut in_string: u8 = 0;
        let mut in_comment = false;

        let mut row = self.cursor_y as isize;
        while row >= 0 {
            let chars = self
                .buffer
                .row(row as usize)
                .expect("row exists")
                .chars()
                .to_vec();
            let mut col = if row as usize == self.cursor_y {
                self.cursor_x as isize - 1
            } else {
                chars.len() as isize - 1
            };
            while col >= 0 {
                let c = col as usize;
                let byte = chars[c];

                if let Some((ml_start, ml_end)) = markers
                    && in_string == 0
                {
                    // Scanning backwards, an end marker enters a comment
                    // and a start marker leaves it.
                    if !in_comment
                        && c + 1 >= ml_end.len()
                        && chars[c + 1 - ml_end.len()..].starts_with(ml_end)
                    {
                        in_comment = true;
                        col -= ml_end.len() as isize;
                        continue;
                    }
                    if in_comment
                        && c + 1 >= ml_start.len()
                        && chars[c + 1 - ml_start.len()..].starts_with(ml_start)
                    {
                        in_comment = false;
                        col -= ml_start.len() as isize;
                        continue;
                    }
                }
                if in_comment {
                    col -= 1;
                    continue;
                }

                if in_string != 0 {
                    if byte == in_string && !escaped(&chars, c) {
                        in_string = 0;
                    }
                    col -= 1;
                    continue;
                }
                if byte == b'"' || byte == b'\'' {
                    in_string = byte;
                    col -= 1;
                    continue;
                }

                match byte {
                    b')' => paren_depth += 1,
                    b']' => bracket_depth += 1,
                    b'}' => brace_depth += 1,
                    b'(' => {
                        if paren_depth > 0 {
                            paren_depth -= 1;
                        } else if self.match_from(row as usize, c) {
                            return true;
                        }
                    }
                    b'[' => {
                        if bracket_depth > 0 {
                            bracket_depth -= 1;
                        } else if self.match_from(row as usize, c) {
                            return true;
                        }
                    }
                    b'{' => {
                        if brace_depth > 0 {
                            brace_depth -= 1;
                        } else if self.match_from(row as usize, c) {
                            return true;
                        }
                    }
                    _ => {}
                }
                col -= 1;
            }
            row -= 1;
        }
        false
    }

    /// Depth-counting forward scan for `partner`, skipping strings and
    /// block comments.
    fn scan_bracket_forward(
        &self,
        current: u8,
        partner: u8,
        start_row: usize,
        start_col: usize,
    ) -> Option<(usize, usize)> {
        let markers = self.block_markers();
        let mut depth = 1usize;
        let mut in_string: u8 = 0;
        let mut in_comment = false;

        let mut row = start_row;
        let mut col = start_col + 1;
        while row < self.buffer.row_count() {
            let chars = self.buffer.row(row).expect("row exists").chars();
            while col < chars.len() {
                let byte = chars[col];

                if !in_comment {
                    if in_string != 0 {
                        if byte == in_string && !escaped(chars, col) {
                            in_string = 0;
                        }
                        col += 1;
                        continue;
                    }
                    if byte == b'"' || byte == b'\'' {
                        in_string = byte;
                        col += 1;
                        continue;
                    }
                }
                if let Some((ml_start, ml_end)) = markers
                    && in_string == 0
                {
                    if !in_comment && chars[col..].starts_with(ml_start) {
                        in_comment = true;
                        col += ml_start.len();
                        continue;
                    }
                    if in_comment && chars[col..].starts_with(ml_end) {
                        in_comment = false;
                        col += ml_end.len();
                        continue;
                    }
                    if in_comment {
                        col += 1;
                        continue;
                    }
                }

                if byte == current {
                    depth += 1;
                } else if byte == partner {
                    depth -= 1;
                    if depth == 0 {
                        return Some((row, col));
                    }
                }
                col += 1;
            }
            row += 1;
            col = 0;
        }
        None
    }

    /// Mirror of the forward scan, walking toward the buffer start.
    fn scan_bracket_backward(
        &self,
        current: u8,
        partner: u8,
        start_row: usize,
        start_col: usize,
    ) -> Option<(usize, usize)> {
        let markers = self.block_markers();
        let mut depth = 1usize;
        let mut in_string: u8 = 0;
        let mut in_comment = false;

        let mut row = start_row as isize;
        let mut col = start_col as isize - 1;
        while row >= 0 {
            let chars = self.buffer.row(row as usize).expect("row exists").chars();
            if col < 0 {
                col = chars.len() as isize - 1;
            }
            while col >= 0 {
                let c = col as usize;
                let byte = chars[c];

                if !in_comment {
                    if in_string != 0 {
                        if byte == in_string && !escaped(chars, c) {
                            in_string = 0;
                        }
                        col -= 1;
                        continue;
                    }
                    if byte == b'"' || byte == b'\'' {
                        in_string = byte;
                        col -= 1;
                        continue;
                    }
                }
                if let Some((ml_start, ml_end)) = markers
                    && in_string == 0
                {
                    if !in_comment
                        && c + 1 >= ml_end.len()
                        && chars[c + 1 - ml_end.len()..].starts_with(ml_end)
                    {
                        in_comment = true;
                        col -= ml_end.len() as isize;
                        continue;
                    }
                    if in_comment
                        && c + 1 >= ml_start.len()
                        && chars[c + 1 - ml_start.len()..].starts_with(ml_start)
                    {
                        in_comment = false;
                        col -= ml_start.len() as isize;
                        continue;
                    }
                    if in_comment {
                        col -= 1;
                        continue;
                    }
                }

                if byte == current {
                    depth += 1;
                } else if byte == partner {
                    depth -= 1;
                    if depth == 0 {
                        return Some((row as usize, c));
                    }
                }
                col -= 1;
            }
            row -= 1;
            col = -1;
        }
        None
    }

    /// Plain text search for a block-comment delimiter, forward.
    fn search_text_forward(
        &self,
        needle: &[u8],
        start_row: usize,
        start_col: usize,
    ) -> Option<(usize, usize)> {
        for row in start_row..self.buffer.row_count() {
            let chars = self.buffer.row(row).expect("row exists").chars();
            let from = if row == start_row { start_col } else { 0 };
            let mut col = from;
            while col + needle.len() <= chars.len() {
                if chars[col..].starts_with(needle) {
                    return Some((row, col));
                }
                col += 1;
            }
        }
        None
    }

    /// Plain text search for a block-comment delimiter, backward from
    /// `(start_row, start_col)` inclusive.
    fn search_text_backward(
        &self,
        needle: &[u8],
        start_row: usize,
        start_col: isize,
    ) -> Option<(usize, usize)> {
        let mut row = start_row as isize;
        while row >= 0 {
            let chars = self.buffer.row(row as usize).expect("row exists").chars();
            let mut col = if row as usize == start_row {
                start_col
            } else {
                chars.len() as isize - 1
            };
            while col >= 0 {
                let c = col as usize;
                if c + needle.len() <= chars.len() && chars[c..].starts_with(needle) {
                    return Some((row as usize, c));
                }
                col -= 1;
            }
            row -= 1;
        }
        None
    }
}
