//! Source locations in LSP coordinates.
//!
//! Every symbol in a [`ParseResult`](super::ParseResult) is located by the
//! physical line that declared it. Columns follow the LSP convention of
//! UTF-16 code units so ranges can be handed to editors unchanged.

use tower_lsp::lsp_types::{Position, Range};

/// Range covering an entire physical line, from column 0 to its end.
pub fn line_range(line_index: usize, raw_line: &str) -> Range {
    let line = line_index as u32;
    Range {
        start: Position {
            line,
            character: 0,
        },
        end: Position {
            line,
            character: utf16_len(raw_line),
        },
    }
}

/// The empty range at the start of the document.
pub fn document_start() -> Range {
    Range::default()
}

/// Number of leading whitespace characters (a tab counts as one).
pub fn indent_column(raw_line: &str) -> usize {
    raw_line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Length of a string in UTF-16 code units.
pub fn utf16_len(s: &str) -> u32 {
    s.chars().map(|c| c.len_utf16() as u32).sum()
}
