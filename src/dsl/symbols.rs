//! Symbol types produced by the structural parser.
//!
//! The parser does not build a syntax tree. It records what each document
//! declares and where:
//! - Models (explicit `model:` blocks or the implicit model of a model file)
//! - Views and their fields (dimensions, measures, parameters, filters)
//! - Explores and their joins
//! - Every scalar property assigned inside any of the above
//!
//! Name references (`extends`, `from`/`view_name`, `connection`) are kept as
//! plain strings. Resolving them is left to consumers.

use indexmap::IndexMap;
use serde::Serialize;
use tower_lsp::lsp_types::Range;

/// Properties keyed by name, in first-declaration order.
pub type PropertyMap = IndexMap<String, Property>;

// ============================================================================
// Property
// ============================================================================

/// A scalar `name: value` assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    /// Right-hand side with `;;` and outer quotes stripped.
    pub value: String,
    pub location: Range,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>, location: Range) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location,
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

/// The block keyword a field was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dimension,
    Measure,
    Parameter,
    Filter,
}

impl FieldKind {
    /// Parse a field kind from its block keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "dimension" => Some(Self::Dimension),
            "measure" => Some(Self::Measure),
            "parameter" => Some(Self::Parameter),
            "filter" => Some(Self::Filter),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Dimension => "dimension",
            Self::Measure => "measure",
            Self::Parameter => "parameter",
            Self::Filter => "filter",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A dimension, measure, parameter, or filter owned by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub location: Range,
    pub properties: PropertyMap,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, location: Range) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
            properties: PropertyMap::new(),
        }
    }
}

// ============================================================================
// View
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub name: String,
    pub location: Range,
    /// Name of the view this one extends (unresolved).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub fields: IndexMap<String, Field>,
    pub properties: PropertyMap,
}

impl View {
    pub fn new(name: impl Into<String>, location: Range) -> Self {
        Self {
            name: name.into(),
            location,
            extends: None,
            fields: IndexMap::new(),
            properties: PropertyMap::new(),
        }
    }

    /// Fields of one kind, in declaration order.
    pub fn fields_of(&self, kind: FieldKind) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(move |f| f.kind == kind)
    }
}

// ============================================================================
// Explore / Join
// ============================================================================

/// A join owned by an explore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub name: String,
    pub location: Range,
    /// Joined view when it differs from the join name (`from` / `view_name`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub properties: PropertyMap,
}

impl Join {
    pub fn new(name: impl Into<String>, location: Range) -> Self {
        Self {
            name: name.into(),
            location,
            view_name: None,
            sql_on: None,
            relationship: None,
            properties: PropertyMap::new(),
        }
    }

    /// The view this join brings in: `from`/`view_name` if set, else its own name.
    pub fn target_view(&self) -> &str {
        self.view_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explore {
    pub name: String,
    pub location: Range,
    /// Base view when it differs from the explore name (`from` / `view_name`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
    pub joins: IndexMap<String, Join>,
    pub properties: PropertyMap,
}

impl Explore {
    pub fn new(name: impl Into<String>, location: Range) -> Self {
        Self {
            name: name.into(),
            location,
            view_name: None,
            joins: IndexMap::new(),
            properties: PropertyMap::new(),
        }
    }

    /// The base view: `from`/`view_name` if set, else the explore's own name.
    pub fn target_view(&self) -> &str {
        self.view_name.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    pub name: String,
    pub location: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    /// Every `include:` value, in order of appearance.
    pub includes: Vec<String>,
    /// Names declared by top-level `explore:` statements.
    pub explores: Vec<String>,
    pub properties: PropertyMap,
}

impl Model {
    pub fn new(name: impl Into<String>, location: Range) -> Self {
        Self {
            name: name.into(),
            location,
            connection: None,
            includes: Vec::new(),
            explores: Vec::new(),
            properties: PropertyMap::new(),
        }
    }
}

// ============================================================================
// ParseResult
// ============================================================================

/// Immutable snapshot of everything one document declares.
///
/// Maps iterate in first-declaration order. Redeclaring a name replaces the
/// entry in place, so the order of names never changes on overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub(crate) views: IndexMap<String, View>,
    pub(crate) explores: IndexMap<String, Explore>,
    pub(crate) models: IndexMap<String, Model>,
    pub(crate) is_model_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) model_name: Option<String>,
}

impl ParseResult {
    pub fn views(&self) -> &IndexMap<String, View> {
        &self.views
    }

    pub fn explores(&self) -> &IndexMap<String, Explore> {
        &self.explores
    }

    pub fn models(&self) -> &IndexMap<String, Model> {
        &self.models
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn explore(&self, name: &str) -> Option<&Explore> {
        self.explores.get(name)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// View names in first-declaration order.
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// Explore names in first-declaration order.
    pub fn explore_names(&self) -> impl Iterator<Item = &str> {
        self.explores.keys().map(String::as_str)
    }

    /// Model names in first-declaration order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Whether the document was classified as a model file.
    pub fn is_model_file(&self) -> bool {
        self.is_model_file
    }

    /// Name of the implicit model of a model file.
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Returns true if nothing at all was declared.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty() && self.explores.is_empty() && self.models.is_empty()
    }
}
