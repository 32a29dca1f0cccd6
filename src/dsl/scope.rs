//! Scope tracking: line classification and the ancestor block stack.
//!
//! The grammar is recovered line by line. Each physical line is classified
//! into zero or more [`LineEvent`]s:
//!
//! ```text
//! view: orders {              BlockOpen(view, orders)
//!   sql_table_name: x ;;      PropertyAssign(sql_table_name, x)
//!   dimension: id { type: n } BlockOpen(dimension, id)
//!                             PropertyAssign(type, n)
//!                             BlockClose
//! }                           BlockClose
//! ```
//!
//! The [`ScopeStack`] keeps the chain of open blocks by indentation. A close
//! brace pops every frame opened at or deeper than its own column, which is
//! forgiving of sloppy formatting. The flip side: a `}` placed shallower than
//! the block it closes also closes the enclosing blocks.

use std::sync::LazyLock;

use regex::Regex;
use tower_lsp::lsp_types::Range;

use super::location::{indent_column, line_range};
use super::symbols::FieldKind;

static BLOCK_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+):\s+([A-Za-z0-9_]+)\s*\{(.*)$").expect("valid block pattern")
});

static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+):\s+(.+?)\s*(?:;;|$)").expect("valid property pattern")
});

/// Start of each `key: ` inside a one-line block body.
static INLINE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)([A-Za-z0-9_]+):\s").expect("valid inline key pattern")
});

// ============================================================================
// Events
// ============================================================================

/// A structural event recovered from one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent<'a> {
    /// `kind: name {`
    BlockOpen {
        kind: &'a str,
        name: &'a str,
        indent: usize,
        line: usize,
        range: Range,
    },
    /// `key: value` with any trailing `;;` removed. The value is otherwise raw.
    PropertyAssign {
        key: &'a str,
        value: &'a str,
        line: usize,
        range: Range,
    },
    /// `}`, or the end of a one-line block (`inline`). An inline close undoes
    /// only the block opened on the same line.
    BlockClose {
        indent: usize,
        line: usize,
        inline: bool,
    },
}

/// Classify one physical line.
///
/// Block-open recognition runs first and is authoritative: a line that opens
/// a block is never also read as a property. An inline block
/// (`dimension: id { type: number }`) yields the open, one property per
/// `key:` in the body, and an inline close.
///
/// A nameless `derived_table: {` is not a block open. It reads as a property
/// whose value is `{`, and its closing `}` only pops frames at or past its
/// column.
pub fn classify_line(line: usize, raw: &str) -> Vec<LineEvent<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Vec::new();
    }

    if trimmed == "}" {
        return vec![LineEvent::BlockClose {
            indent: indent_column(raw),
            line,
            inline: false,
        }];
    }

    let range = line_range(line, raw);
    let indent = indent_column(raw);

    if let Some(caps) = BLOCK_OPEN.captures(trimmed) {
        let (Some(kind), Some(name), Some(rest)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            return Vec::new();
        };
        let mut events = vec![LineEvent::BlockOpen {
            kind: kind.as_str(),
            name: name.as_str(),
            indent,
            line,
            range,
        }];
        if let Some(body) = inline_body(rest.as_str()) {
            events.extend(
                inline_statements(body).filter_map(|stmt| property(line, stmt, range)),
            );
            events.push(LineEvent::BlockClose {
                indent,
                line,
                inline: true,
            });
        }
        return events;
    }

    property(line, trimmed, range).into_iter().collect()
}

fn property(line: usize, text: &str, range: Range) -> Option<LineEvent<'_>> {
    let caps = PROPERTY.captures(text.trim())?;
    Some(LineEvent::PropertyAssign {
        key: caps.get(1)?.as_str(),
        value: caps.get(2)?.as_str(),
        line,
        range,
    })
}

/// If the block opened on this line also closes on it, return the text
/// between the braces. Nested `{ }` pairs such as `${TABLE}` are skipped.
fn inline_body(rest: &str) -> Option<&str> {
    let mut depth = 1usize;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a one-line block body at every `key: ` it contains.
fn inline_statements(body: &str) -> impl Iterator<Item = &str> {
    let starts: Vec<usize> = INLINE_KEY
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|key| key.start()))
        .collect();
    let ends: Vec<usize> = starts.iter().skip(1).copied().chain([body.len()]).collect();
    starts
        .into_iter()
        .zip(ends)
        .map(move |(start, end)| &body[start..end])
}

/// Normalize a raw property value for storage.
///
/// Strips a trailing `;;`, surrounding whitespace, and one pair of matching
/// outer quotes. `extends` values also lose their list brackets, so
/// `extends: [base]` reads as `base`.
pub fn normalize_value(key: &str, raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_suffix(";;").unwrap_or(value).trim();
    let value = strip_quotes(value);
    if key == "extends" {
        let unbracketed = value
            .strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .unwrap_or(value)
            .trim();
        return strip_quotes(unbracketed).to_string();
    }
    value.to_string()
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

// ============================================================================
// Frames
// ============================================================================

/// What kind of block a frame represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    View,
    Explore,
    Model,
    Field(FieldKind),
    Join,
    /// Any other block (`dimension_group`, `datagroup`, `access_grant`, ...).
    Other,
}

impl FrameKind {
    /// Frame kind for a block keyword.
    pub fn classify(keyword: &str) -> Self {
        match keyword {
            "view" => Self::View,
            "explore" => Self::Explore,
            "model" => Self::Model,
            "join" => Self::Join,
            other => FieldKind::from_keyword(other).map_or(Self::Other, Self::Field),
        }
    }
}

/// One open block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub name: String,
    pub indent: usize,
    pub start_line: usize,
}

/// The chain of currently open blocks, outermost first.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Pop frames from the top while they were opened at or deeper than
    /// `indent`. Returns how many were popped.
    pub fn close(&mut self, indent: usize) -> usize {
        let mut popped = 0;
        while self.frames.last().is_some_and(|f| f.indent >= indent) {
            self.frames.pop();
            popped += 1;
        }
        popped
    }

    /// The innermost open block.
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// The block directly enclosing the innermost one.
    pub fn parent(&self) -> Option<&Frame> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }

    /// The nearest block of `kind` enclosing the innermost one.
    pub fn nearest_ancestor(&self, kind: FrameKind) -> Option<&Frame> {
        let below_top = self.frames.len().saturating_sub(1);
        self.frames[..below_top].iter().rev().find(|f| f.kind == kind)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// Consumer of structural events.
///
/// `apply` sees the stack as it stands after the event's own effect on it:
/// a `BlockOpen` frame is already pushed, a `BlockClose` has already popped.
pub trait EventSink {
    fn apply(&mut self, event: &LineEvent<'_>, stack: &ScopeStack);
}

/// Walks a document line by line, maintaining the scope stack and feeding
/// every event to a sink.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    stack: ScopeStack,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walk(mut self, source: &str, sink: &mut impl EventSink) {
        for (line, raw) in source.split('\n').enumerate() {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            for event in classify_line(line, raw) {
                self.step(&event);
                sink.apply(&event, &self.stack);
            }
        }
        if !self.stack.is_empty() {
            tracing::trace!(
                unclosed = self.stack.depth(),
                "document ended with open blocks"
            );
        }
    }

    fn step(&mut self, event: &LineEvent<'_>) {
        match *event {
            LineEvent::BlockOpen {
                kind,
                name,
                indent,
                line,
                ..
            } => self.stack.push(Frame {
                kind: FrameKind::classify(kind),
                name: name.to_string(),
                indent,
                start_line: line,
            }),
            LineEvent::BlockClose { inline: true, .. } => {
                self.stack.pop();
            }
            LineEvent::BlockClose { indent, .. } => {
                self.stack.close(indent);
            }
            LineEvent::PropertyAssign { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(events: &[LineEvent<'_>]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match e {
                LineEvent::BlockOpen { .. } => "open",
                LineEvent::PropertyAssign { .. } => "prop",
                LineEvent::BlockClose { .. } => "close",
            })
            .collect()
    }

    fn frame(kind: FrameKind, name: &str, indent: usize) -> Frame {
        Frame {
            kind,
            name: name.to_string(),
            indent,
            start_line: 0,
        }
    }

    #[test]
    fn test_blank_and_comment_lines_are_inert() {
        assert!(classify_line(0, "").is_empty());
        assert!(classify_line(0, "    ").is_empty());
        assert!(classify_line(0, "  # view: a {").is_empty());
    }

    #[test]
    fn test_block_open() {
        let events = classify_line(4, "  view: orders {");
        assert_eq!(events.len(), 1);
        match &events[0] {
            LineEvent::BlockOpen {
                kind,
                name,
                indent,
                line,
                ..
            } => {
                assert_eq!(*kind, "view");
                assert_eq!(*name, "orders");
                assert_eq!(*indent, 2);
                assert_eq!(*line, 4);
            }
            other => panic!("expected block open, got {:?}", other),
        }
    }

    #[test]
    fn test_block_open_wins_over_property() {
        // Also matches the property pattern; must only open.
        let events = classify_line(0, "explore: orders {");
        assert_eq!(kinds(&events), vec!["open"]);
    }

    #[test]
    fn test_inline_block_yields_open_property_close() {
        let events = classify_line(1, "  dimension: id { type: number }");
        assert_eq!(kinds(&events), vec!["open", "prop", "close"]);
        match &events[1] {
            LineEvent::PropertyAssign { key, value, .. } => {
                assert_eq!(*key, "type");
                assert_eq!(*value, "number");
            }
            other => panic!("expected property, got {:?}", other),
        }
        assert_eq!(
            events[2],
            LineEvent::BlockClose {
                indent: 2,
                line: 1,
                inline: true
            }
        );
    }

    #[test]
    fn test_inline_block_skips_template_braces() {
        let events = classify_line(0, "dimension: id { sql: ${TABLE}.id ;; }");
        assert_eq!(kinds(&events), vec!["open", "prop", "close"]);
        match &events[1] {
            LineEvent::PropertyAssign { key, value, .. } => {
                assert_eq!(*key, "sql");
                assert_eq!(*value, "${TABLE}.id");
            }
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_block_with_several_properties() {
        let events = classify_line(0, "dimension: id { type: number sql: ${TABLE}.id ;; }");
        assert_eq!(kinds(&events), vec!["open", "prop", "prop", "close"]);
        let props: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                LineEvent::PropertyAssign { key, value, .. } => Some((*key, *value)),
                _ => None,
            })
            .collect();
        assert_eq!(props, vec![("type", "number"), ("sql", "${TABLE}.id")]);

        let events = classify_line(0, "measure: n { type: count ;; label: \"N\" }");
        assert_eq!(kinds(&events), vec!["open", "prop", "prop", "close"]);
    }

    #[test]
    fn test_empty_inline_block() {
        let events = classify_line(0, "view: empty {}");
        assert_eq!(kinds(&events), vec!["open", "close"]);
    }

    #[test]
    fn test_nameless_block_is_a_property() {
        let events = classify_line(0, "    derived_table: {");
        match &events[..] {
            [LineEvent::PropertyAssign { key, value, .. }] => {
                assert_eq!(*key, "derived_table");
                assert_eq!(*value, "{");
            }
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_property_strips_terminator() {
        let events = classify_line(2, "    sql_on: ${orders.user_id} = ${users.id} ;;");
        match &events[..] {
            [LineEvent::PropertyAssign { key, value, .. }] => {
                assert_eq!(*key, "sql_on");
                assert_eq!(*value, "${orders.user_id} = ${users.id}");
            }
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_property_requires_space_after_colon() {
        assert!(classify_line(0, "type:number").is_empty());
    }

    #[test]
    fn test_unrecognized_lines_are_inert() {
        assert!(classify_line(0, "SELECT id FROM orders").is_empty());
        assert!(classify_line(0, "};").is_empty());
    }

    #[test]
    fn test_close_records_indent() {
        assert_eq!(
            classify_line(7, "    }"),
            vec![LineEvent::BlockClose {
                indent: 4,
                line: 7,
                inline: false
            }]
        );
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("type", "number"), "number");
        assert_eq!(normalize_value("label", "\"Order ID\""), "Order ID");
        assert_eq!(normalize_value("label", "'single'"), "single");
        assert_eq!(normalize_value("sql", "${TABLE}.id ;;"), "${TABLE}.id");
        assert_eq!(normalize_value("sql", ";;"), "");
        assert_eq!(normalize_value("label", "\"unbalanced"), "\"unbalanced");
        assert_eq!(normalize_value("drill_fields", "[id, name]"), "[id, name]");
    }

    #[test]
    fn test_normalize_extends_strips_brackets() {
        assert_eq!(normalize_value("extends", "[base]"), "base");
        assert_eq!(normalize_value("extends", "[a, b]"), "a, b");
        assert_eq!(normalize_value("extends", "base"), "base");
        assert_eq!(normalize_value("extends", "[\"quoted\"]"), "quoted");
    }

    #[test]
    fn test_frame_kind_classify() {
        assert_eq!(FrameKind::classify("view"), FrameKind::View);
        assert_eq!(FrameKind::classify("explore"), FrameKind::Explore);
        assert_eq!(FrameKind::classify("model"), FrameKind::Model);
        assert_eq!(FrameKind::classify("join"), FrameKind::Join);
        assert_eq!(
            FrameKind::classify("measure"),
            FrameKind::Field(FieldKind::Measure)
        );
        assert_eq!(FrameKind::classify("dimension_group"), FrameKind::Other);
    }

    #[test]
    fn test_close_pops_all_frames_at_or_past_indent() {
        let mut stack = ScopeStack::new();
        stack.push(frame(FrameKind::View, "a", 0));
        stack.push(frame(FrameKind::Field(FieldKind::Dimension), "d", 2));
        stack.push(frame(FrameKind::Other, "", 4));

        // A brace at column 2 closes both the column-4 and column-2 frames.
        assert_eq!(stack.close(2), 2);
        assert_eq!(stack.top().map(|f| f.name.as_str()), Some("a"));

        // A shallower brace closes the remaining frame as well.
        assert_eq!(stack.close(0), 1);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_close_on_empty_stack_is_noop() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.close(0), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_close_deeper_than_top_pops_nothing() {
        let mut stack = ScopeStack::new();
        stack.push(frame(FrameKind::View, "a", 0));
        assert_eq!(stack.close(4), 0);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_parent_and_nearest_ancestor() {
        let mut stack = ScopeStack::new();
        assert!(stack.parent().is_none());
        stack.push(frame(FrameKind::Explore, "orders", 0));
        assert!(stack.parent().is_none());
        assert!(stack.nearest_ancestor(FrameKind::Explore).is_none());

        stack.push(frame(FrameKind::Other, "", 2));
        stack.push(frame(FrameKind::Join, "users", 4));

        assert_eq!(stack.parent().map(|f| f.kind), Some(FrameKind::Other));
        let explore = stack.nearest_ancestor(FrameKind::Explore);
        assert_eq!(explore.map(|f| f.name.as_str()), Some("orders"));
        assert!(stack.nearest_ancestor(FrameKind::View).is_none());
    }

    #[derive(Default)]
    struct Recorder {
        depths: Vec<(usize, usize)>,
    }

    impl EventSink for Recorder {
        fn apply(&mut self, event: &LineEvent<'_>, stack: &ScopeStack) {
            let line = match event {
                LineEvent::BlockOpen { line, .. }
                | LineEvent::PropertyAssign { line, .. }
                | LineEvent::BlockClose { line, .. } => *line,
            };
            self.depths.push((line, stack.depth()));
        }
    }

    #[test]
    fn test_tracker_walk_reports_stack_after_each_event() {
        let source = "view: a {\r\n  dimension: d {\r\n    type: number\r\n  }\r\n}\r\n";
        let mut recorder = Recorder::default();
        ScopeTracker::new().walk(source, &mut recorder);
        assert_eq!(
            recorder.depths,
            vec![(0, 1), (1, 2), (2, 2), (3, 1), (4, 0)]
        );
    }

    #[test]
    fn test_inline_close_keeps_same_column_parent() {
        let source = "view: a {\ndimension: x { type: number }\ndimension: y {}\n}\n";
        let mut recorder = Recorder::default();
        ScopeTracker::new().walk(source, &mut recorder);
        assert_eq!(
            recorder.depths,
            vec![(0, 1), (1, 2), (1, 2), (1, 1), (2, 2), (2, 1), (3, 0)]
        );
    }
}
