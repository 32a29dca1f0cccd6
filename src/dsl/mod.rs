//! Structural parser for LookML documents.
//!
//! The parser recovers block structure from indentation and braces rather
//! than a formal grammar, and records every declared model, view, explore,
//! field, join, and property together with the line that declared it:
//!
//! ```text
//!   text ──▶ [classify] ──▶ is model file? implicit model name
//!     │
//!     ▼
//!   [scope]  line ──▶ BlockOpen | PropertyAssign | BlockClose
//!     │                + ancestor stack by indentation
//!     ▼
//!   [registry] events ──▶ views / explores / models (ordered maps)
//!     │
//!     ▼
//!   ParseResult (immutable snapshot)
//! ```
//!
//! Malformed or unrecognized lines produce no events. Parsing never fails.
//!
//! # Example
//!
//! ```ignore
//! use lkml::dsl::{self, Document};
//!
//! let doc = Document::new("orders.view.lkml", r#"
//! view: orders {
//!   dimension: id { type: number }
//!   measure: count { type: count }
//! }
//! "#);
//!
//! let result = dsl::parse(&doc);
//! let orders = result.view("orders").unwrap();
//! assert_eq!(orders.fields.len(), 2);
//! ```

pub mod classify;
pub mod location;
pub mod outline;
pub mod registry;
pub mod scope;
pub mod symbols;

pub use classify::{DocumentClass, ParseOptions};
pub use scope::{FrameKind, LineEvent};
pub use symbols::*;

use std::path::Path;

use registry::SymbolRegistry;
use scope::ScopeTracker;

/// A document to parse: its text plus the path or URI it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path or URI. Its suffix decides whether this is a model file.
    pub identifier: String,
    pub text: String,
}

impl Document {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.into(),
        }
    }

    /// The last path segment of the identifier.
    pub fn file_name(&self) -> &str {
        self.identifier
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.identifier)
    }
}

/// Parse a document with default options.
pub fn parse(document: &Document) -> ParseResult {
    parse_with_options(document, &ParseOptions::default())
}

/// Parse a document.
///
/// Each call builds a fresh snapshot. There is no incremental mode: an edit
/// is handled by parsing the new text again.
pub fn parse_with_options(document: &Document, options: &ParseOptions) -> ParseResult {
    let class = classify::classify(&document.identifier, &document.text, options);
    let mut registry = SymbolRegistry::new(class);
    ScopeTracker::new().walk(&document.text, &mut registry);
    let result = registry.finish();

    tracing::debug!(
        document = %document.identifier,
        views = result.views().len(),
        explores = result.explores().len(),
        models = result.models().len(),
        model_file = result.is_model_file(),
        "parsed document"
    );

    result
}

/// Parse a file from disk.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be read.
pub fn parse_file(path: &Path, options: &ParseOptions) -> std::io::Result<ParseResult> {
    let text = std::fs::read_to_string(path)?;
    let document = Document::new(path.to_string_lossy(), text);
    Ok(parse_with_options(&document, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_file_name() {
        let doc = Document::new("file:///a/b/orders.view.lkml", "");
        assert_eq!(doc.file_name(), "orders.view.lkml");
        let doc = Document::new("orders.view.lkml", "");
        assert_eq!(doc.file_name(), "orders.view.lkml");
    }

    #[test]
    fn test_parse_empty_document() {
        let result = parse(&Document::new("empty.view.lkml", ""));
        assert!(result.is_empty());
        assert!(!result.is_model_file());
        assert!(result.model_name().is_none());
    }

    #[test]
    fn test_parse_model_file_by_suffix() {
        let result = parse(&Document::new(
            "/repo/thelook.model.lkml",
            "connection: \"warehouse\"\ninclude: \"/views/*.view\"\n",
        ));
        assert!(result.is_model_file());
        assert_eq!(result.model_name(), Some("thelook"));
        let model = result.model("thelook").unwrap();
        assert_eq!(model.connection.as_deref(), Some("warehouse"));
        assert_eq!(model.includes, vec!["/views/*.view"]);
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.view.lkml");
        std::fs::write(&path, "view: orders {\n  dimension: id {}\n}\n").unwrap();

        let result = parse_file(&path, &ParseOptions::default()).unwrap();
        assert!(result.view("orders").unwrap().fields.contains_key("id"));
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("/nonexistent/x.view.lkml"), &ParseOptions::default());
        assert!(result.is_err());
    }
}
