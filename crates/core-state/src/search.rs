//! Transient search index.
//!
//! A plain substring scan over every row's render string. Results are
//! `(line, render offset, length)` triples, valid only until the next
//! buffer mutation; the find flow re-runs the scan whenever the query
//! changes. Navigation is by index with wrap-around, handled by the caller.

use crate::EditorState;

/// One match in render coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub line: usize,
    pub offset: usize,
    pub length: usize,
}

impl EditorState {
    /// Rebuild the match list for `query`. An empty query clears it.
    /// The scan steps one byte past each hit, so overlapping occurrences
    /// are all recorded.
    pub fn simple_search(&mut self, query: &str) {
        self.search_results.clear();
        let needle = query.as_bytes();
        if needle.is_empty() {
            return;
        }

        for line in 0..self.buffer.row_count() {
            let render = self.buffer.row(line).expect("row exists").render();
            let mut pos = 0;
            while pos + needle.len() <= render.len() {
                if &render[pos..pos + needle.len()] == needle {
                    self.search_results.push(SearchMatch {
                        line,
                        offset: pos,
                        length: needle.len(),
                    });
                }
                pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_matches_in_render_coordinates() {
        let mut state = EditorState::with_rows(&["\tfoo", "foo foo"]);
        state.simple_search("foo");
        // Tab expands to eight columns, so the first hit sits at offset 8.
        assert_eq!(
            state.search_results,
            vec![
                SearchMatch { line: 0, offset: 8, length: 3 },
                SearchMatch { line: 1, offset: 0, length: 3 },
                SearchMatch { line: 1, offset: 4, length: 3 },
            ]
        );
    }

    #[test]
    fn overlapping_occurrences_are_recorded() {
        let mut state = EditorState::with_rows(&["aaaa"]);
        state.simple_search("aa");
        assert_eq!(state.search_results.len(), 3);
    }

    #[test]
    fn empty_query_clears_results() {
        let mut state = EditorState::with_rows(&["abc"]);
        state.simple_search("b");
        assert_eq!(state.search_results.len(), 1);
        state.simple_search("");
        assert!(state.search_results.is_empty());
    }
}
