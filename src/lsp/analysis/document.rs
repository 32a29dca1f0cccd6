//! Per-document state and cursor helpers

use tower_lsp::lsp_types::{Position, Url};

use crate::dsl::{self, Document, ParseOptions, ParseResult};

/// State for a single open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Document URI
    pub uri: Url,
    /// Document version (incremented on each change)
    pub version: i32,
    /// Full source text
    pub source: String,
    /// Latest snapshot. Structural at first, replaced by the enhanced
    /// snapshot once enhancement finishes.
    pub result: ParseResult,
}

impl DocumentState {
    /// Create a new document state by parsing the source
    pub fn new(uri: Url, version: i32, source: String, options: &ParseOptions) -> Self {
        let result = dsl::parse_with_options(&Document::new(uri.as_str(), source.as_str()), options);
        Self {
            uri,
            version,
            source,
            result,
        }
    }

    /// The parser input this state was built from.
    pub fn document(&self) -> Document {
        Document::new(self.uri.as_str(), self.source.as_str())
    }

    /// The identifier-like word under the cursor.
    ///
    /// Words may contain `.` so that `orders.user_id` inside `${...}` is
    /// returned whole.
    pub fn word_at(&self, pos: Position) -> Option<&str> {
        let line = self.source.lines().nth(pos.line as usize)?;
        word_at_column(line, utf16_offset_to_byte_offset(line, pos.character as usize))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// The word touching byte column `col` of `line`.
fn word_at_column(line: &str, col: usize) -> Option<&str> {
    let col = col.min(line.len());
    let start = line[..col]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word_char(c))
        .last()
        .map_or(col, |(i, _)| i);
    let end = line[col..]
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(line.len(), |(i, _)| col + i);

    let word = line[start..end].trim_matches('.');
    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Convert UTF-16 offset to byte offset within a line
fn utf16_offset_to_byte_offset(line: &str, utf16_offset: usize) -> usize {
    let mut utf16_count = 0;
    for (byte_idx, ch) in line.char_indices() {
        if utf16_count >= utf16_offset {
            return byte_idx;
        }
        utf16_count += ch.len_utf16();
    }
    line.len()
}
