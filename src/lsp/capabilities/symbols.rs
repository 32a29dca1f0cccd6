//! textDocument/documentSymbol handler

use tower_lsp::lsp_types::{DocumentSymbol, DocumentSymbolResponse, Position, Range, SymbolKind};

use crate::dsl::{FieldKind, ParseResult};

/// Get document symbols for outline view.
///
/// Models come first, then views with their fields, then explores with
/// their joins, each in declaration order.
pub fn get_document_symbols(result: &ParseResult) -> DocumentSymbolResponse {
    let mut symbols = Vec::new();

    for model in result.models().values() {
        symbols.push(symbol(
            &model.name,
            model.connection.clone(),
            SymbolKind::MODULE,
            model.location,
            Vec::new(),
        ));
    }

    for view in result.views().values() {
        let children = view
            .fields
            .values()
            .map(|field| {
                symbol(
                    &field.name,
                    Some(field.kind.keyword().to_string()),
                    field_symbol_kind(field.kind),
                    field.location,
                    Vec::new(),
                )
            })
            .collect();
        symbols.push(symbol(
            &view.name,
            view.extends.clone(),
            SymbolKind::CLASS,
            view.location,
            children,
        ));
    }

    for explore in result.explores().values() {
        let children = explore
            .joins
            .values()
            .map(|join| {
                symbol(
                    &join.name,
                    join.relationship.clone(),
                    SymbolKind::INTERFACE,
                    join.location,
                    Vec::new(),
                )
            })
            .collect();
        symbols.push(symbol(
            &explore.name,
            explore.view_name.clone(),
            SymbolKind::STRUCT,
            explore.location,
            children,
        ));
    }

    DocumentSymbolResponse::Nested(symbols)
}

fn field_symbol_kind(kind: FieldKind) -> SymbolKind {
    match kind {
        FieldKind::Dimension => SymbolKind::FIELD,
        FieldKind::Measure => SymbolKind::FUNCTION,
        FieldKind::Parameter => SymbolKind::VARIABLE,
        FieldKind::Filter => SymbolKind::PROPERTY,
    }
}

fn symbol(
    name: &str,
    detail: Option<String>,
    kind: SymbolKind,
    location: Range,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    // Clients expect children inside the parent's range, but only the
    // declaring line is known. Stretch the range over the children.
    let key = |p: Position| (p.line, p.character);
    let range = children.iter().fold(location, |acc, child| Range {
        start: if key(child.range.start) < key(acc.start) {
            child.range.start
        } else {
            acc.start
        },
        end: if key(child.range.end) > key(acc.end) {
            child.range.end
        } else {
            acc.end
        },
    });

    #[allow(deprecated)]
    DocumentSymbol {
        name: name.to_string(),
        detail,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range: location,
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}
