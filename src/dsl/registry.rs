//! Symbol registry: turns structural events into located symbols.
//!
//! The registry is an owned builder. The scope tracker feeds it events while
//! walking the document, and [`SymbolRegistry::finish`] consumes it into the
//! immutable [`ParseResult`]. Nothing outside the walk can observe a half
//! built result.

use indexmap::IndexMap;
use tower_lsp::lsp_types::Range;

use super::classify::DocumentClass;
use super::location::document_start;
use super::scope::{normalize_value, EventSink, Frame, FrameKind, LineEvent, ScopeStack};
use super::symbols::{Explore, Field, FieldKind, Join, Model, ParseResult, Property, View};

/// Builder for one document's [`ParseResult`].
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    views: IndexMap<String, View>,
    explores: IndexMap<String, Explore>,
    models: IndexMap<String, Model>,
    is_model_file: bool,
    model_name: Option<String>,
}

impl SymbolRegistry {
    /// Create a registry for a classified document.
    ///
    /// Model files get their implicit model registered up front so that
    /// unbraced top-level statements have somewhere to go.
    pub fn new(class: DocumentClass) -> Self {
        let mut registry = Self {
            is_model_file: class.is_model_file,
            model_name: class.model_name,
            ..Self::default()
        };
        if registry.is_model_file {
            if let Some(name) = registry.model_name.clone() {
                registry
                    .models
                    .insert(name.clone(), Model::new(name, document_start()));
            }
        }
        registry
    }

    /// Consume the builder into its snapshot.
    pub fn finish(self) -> ParseResult {
        ParseResult {
            views: self.views,
            explores: self.explores,
            models: self.models,
            is_model_file: self.is_model_file,
            model_name: self.model_name,
        }
    }

    fn open_block(&mut self, name: &str, range: Range, stack: &ScopeStack) {
        let Some(frame) = stack.top() else {
            return;
        };
        match frame.kind {
            FrameKind::View => {
                self.views.insert(name.to_string(), View::new(name, range));
            }
            FrameKind::Explore => {
                self.explores
                    .insert(name.to_string(), Explore::new(name, range));
            }
            FrameKind::Model => {
                self.models.insert(name.to_string(), Model::new(name, range));
            }
            FrameKind::Field(kind) => self.open_field(name, kind, range, stack.parent()),
            FrameKind::Join => self.open_join(name, range, stack.parent()),
            FrameKind::Other => {}
        }
    }

    fn open_field(&mut self, name: &str, kind: FieldKind, range: Range, parent: Option<&Frame>) {
        let view = parent
            .filter(|p| p.kind == FrameKind::View)
            .and_then(|p| self.views.get_mut(&p.name));
        match view {
            Some(view) => {
                view.fields
                    .insert(name.to_string(), Field::new(name, kind, range));
            }
            None => tracing::trace!(field = name, %kind, line = range.start.line, "field outside a view dropped"),
        }
    }

    fn open_join(&mut self, name: &str, range: Range, parent: Option<&Frame>) {
        let explore = parent
            .filter(|p| p.kind == FrameKind::Explore)
            .and_then(|p| self.explores.get_mut(&p.name));
        match explore {
            Some(explore) => {
                explore
                    .joins
                    .insert(name.to_string(), Join::new(name, range));
            }
            None => tracing::trace!(join = name, line = range.start.line, "join outside an explore dropped"),
        }
    }

    fn assign(&mut self, key: &str, raw: &str, range: Range, stack: &ScopeStack) {
        let value = normalize_value(key, raw);
        let property = Property::new(key, value.clone(), range);

        let Some(top) = stack.top() else {
            if self.is_model_file {
                self.assign_top_level(property, range);
            }
            return;
        };

        let applied = match top.kind {
            FrameKind::View => self.views.get_mut(&top.name).map(|view| {
                if key == "extends" {
                    view.extends = Some(value);
                }
                view.properties.insert(key.to_string(), property);
            }),
            FrameKind::Explore => self.explores.get_mut(&top.name).map(|explore| {
                if key == "view_name" || key == "from" {
                    explore.view_name = Some(value);
                }
                explore.properties.insert(key.to_string(), property);
            }),
            FrameKind::Model => self.models.get_mut(&top.name).map(|model| {
                assign_model_property(model, property);
            }),
            FrameKind::Field(_) => stack
                .nearest_ancestor(FrameKind::View)
                .and_then(|v| self.views.get_mut(&v.name))
                .and_then(|view| view.fields.get_mut(&top.name))
                .map(|field| {
                    field.properties.insert(key.to_string(), property);
                }),
            FrameKind::Join => stack
                .nearest_ancestor(FrameKind::Explore)
                .and_then(|e| self.explores.get_mut(&e.name))
                .and_then(|explore| explore.joins.get_mut(&top.name))
                .map(|join| {
                    match key {
                        "view_name" | "from" => join.view_name = Some(value),
                        "sql_on" => join.sql_on = Some(value),
                        "relationship" => join.relationship = Some(value),
                        _ => {}
                    }
                    join.properties.insert(key.to_string(), property);
                }),
            FrameKind::Other => None,
        };

        if applied.is_none() {
            tracing::trace!(
                property = key,
                block = %top.name,
                line = range.start.line,
                "property without a registered owner dropped"
            );
        }
    }

    /// An unbraced statement in a model file belongs to the implicit model.
    fn assign_top_level(&mut self, property: Property, range: Range) {
        let Some(model) = self
            .model_name
            .as_ref()
            .and_then(|name| self.models.get_mut(name))
        else {
            return;
        };

        if property.name == "explore" {
            let name = property.value.clone();
            model.explores.push(name.clone());
            self.explores
                .insert(name.clone(), Explore::new(name, range));
        }
        assign_model_property(model, property);
    }
}

fn assign_model_property(model: &mut Model, property: Property) {
    match property.name.as_str() {
        "connection" => model.connection = Some(property.value.clone()),
        "include" => model.includes.push(property.value.clone()),
        _ => {}
    }
    model.properties.insert(property.name.clone(), property);
}

impl EventSink for SymbolRegistry {
    fn apply(&mut self, event: &LineEvent<'_>, stack: &ScopeStack) {
        match *event {
            LineEvent::BlockOpen { name, range, .. } => self.open_block(name, range, stack),
            LineEvent::PropertyAssign {
                key, value, range, ..
            } => self.assign(key, value, range, stack),
            LineEvent::BlockClose { .. } => {}
        }
    }
}
