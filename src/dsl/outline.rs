//! Plain-text renderings of a parse result.

use std::fmt::Write;

use super::symbols::ParseResult;

/// Render the declarations as an indented tree.
///
/// ```text
/// model shop connection=warehouse
///   include *.view.lkml
///   explore orders
/// view orders
///   dimension id
/// explore orders -> orders
///   join users -> users (many_to_one)
/// ```
pub fn render_outline(result: &ParseResult) -> String {
    let mut out = String::new();

    for model in result.models().values() {
        let _ = write!(out, "model {}", model.name);
        if let Some(connection) = &model.connection {
            let _ = write!(out, " connection={connection}");
        }
        out.push('\n');
        for include in &model.includes {
            let _ = writeln!(out, "  include {include}");
        }
        for explore in &model.explores {
            let _ = writeln!(out, "  explore {explore}");
        }
    }

    for view in result.views().values() {
        let _ = write!(out, "view {}", view.name);
        if let Some(extends) = &view.extends {
            let _ = write!(out, " extends {extends}");
        }
        out.push('\n');
        for field in view.fields.values() {
            let _ = writeln!(out, "  {} {}", field.kind, field.name);
        }
    }

    for explore in result.explores().values() {
        let _ = writeln!(out, "explore {} -> {}", explore.name, explore.target_view());
        for join in explore.joins.values() {
            let _ = write!(out, "  join {} -> {}", join.name, join.target_view());
            if let Some(relationship) = &join.relationship {
                let _ = write!(out, " ({relationship})");
            }
            out.push('\n');
        }
    }

    out
}

/// Render one line per declaration: 1-based line, kind, qualified name.
pub fn render_symbol_table(result: &ParseResult) -> String {
    let mut rows: Vec<(u32, &str, String)> = Vec::new();

    for model in result.models().values() {
        rows.push((model.location.start.line, "model", model.name.clone()));
    }
    for view in result.views().values() {
        rows.push((view.location.start.line, "view", view.name.clone()));
        for field in view.fields.values() {
            rows.push((
                field.location.start.line,
                field.kind.keyword(),
                format!("{}.{}", view.name, field.name),
            ));
        }
    }
    for explore in result.explores().values() {
        rows.push((explore.location.start.line, "explore", explore.name.clone()));
        for join in explore.joins.values() {
            rows.push((
                join.location.start.line,
                "join",
                format!("{}.{}", explore.name, join.name),
            ));
        }
    }

    rows.sort_by_key(|(line, _, _)| *line);

    let mut out = String::new();
    for (line, kind, name) in rows {
        let _ = writeln!(out, "{}\t{}\t{}", line + 1, kind, name);
    }
    out
}
