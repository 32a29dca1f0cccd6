//! Wire types for the semantic enhancer's output.
//!
//! The enhancer prints one JSON document describing the project it parsed:
//!
//! ```json
//! {
//!   "views": {
//!     "orders": {
//!       "extends": "base",
//!       "dimensions": { "id": { "type": "number", "sql": "${TABLE}.id" } },
//!       "measures":   { "count": { "type": "count" } }
//!     }
//!   },
//!   "models": {
//!     "thelook": {
//!       "connection": "warehouse",
//!       "explores": {
//!         "orders": {
//!           "from": "orders",
//!           "joins": { "users": { "sql_on": "...", "relationship": "many_to_one" } }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Every section is optional. Keys other than the nested collections land in
//! the `properties` bag of their entity; only string values are ever used.

use indexmap::IndexMap;
use serde::Deserialize;

/// Arbitrary properties reported for one entity.
pub type PropertyBag = IndexMap<String, serde_json::Value>;

/// Everything the enhancer reported for a document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhancedProject {
    pub views: IndexMap<String, EnhancedView>,
    pub models: IndexMap<String, EnhancedModel>,
}

impl EnhancedProject {
    pub fn is_empty(&self) -> bool {
        self.views.is_empty() && self.models.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhancedView {
    pub dimensions: IndexMap<String, PropertyBag>,
    pub measures: IndexMap<String, PropertyBag>,
    pub filters: IndexMap<String, PropertyBag>,
    pub parameters: IndexMap<String, PropertyBag>,
    #[serde(flatten)]
    pub properties: PropertyBag,
}

impl EnhancedView {
    /// All field bags regardless of kind.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &PropertyBag)> {
        self.dimensions
            .iter()
            .chain(&self.measures)
            .chain(&self.filters)
            .chain(&self.parameters)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhancedModel {
    pub explores: IndexMap<String, EnhancedExplore>,
    #[serde(flatten)]
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhancedExplore {
    pub joins: IndexMap<String, PropertyBag>,
    #[serde(flatten)]
    pub properties: PropertyBag,
}
