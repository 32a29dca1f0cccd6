//! textDocument/definition handler
//!
//! Resolves the word under the cursor against the declarations of the same
//! document. A bare name resolves to a view, then an explore; `view.field`
//! resolves to a field of that view. This covers `extends`, `from`,
//! `view_name`, join names, and `${view.field}` references.

use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Position, Range};

use crate::dsl::ParseResult;
use crate::lsp::analysis::document::DocumentState;

/// Get definition location for symbol at position.
pub fn get_definition(doc: &DocumentState, position: Position) -> Option<GotoDefinitionResponse> {
    let word = doc.word_at(position)?;
    let range = resolve(&doc.result, word)?;

    Some(GotoDefinitionResponse::Scalar(Location {
        uri: doc.uri.clone(),
        range,
    }))
}

/// Location of the declaration a name refers to.
pub fn resolve(result: &ParseResult, name: &str) -> Option<Range> {
    if let Some((view_name, field_name)) = name.split_once('.') {
        return result
            .view(view_name)?
            .fields
            .get(field_name)
            .map(|field| field.location);
    }

    result
        .view(name)
        .map(|view| view.location)
        .or_else(|| result.explore(name).map(|explore| explore.location))
}
