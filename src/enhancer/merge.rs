//! Additive merge of enhancer output into a structural snapshot.
//!
//! The structural result is authoritative. The enhancer may only fill gaps:
//! - only entities the structural pass found are touched
//! - a property is added only when no property of that name exists
//! - typed fields (`extends`, `connection`, `view_name`, `sql_on`,
//!   `relationship`) are filled only when empty
//!
//! Added properties carry the owning entity's location, since the enhancer
//! does not report positions.

use tower_lsp::lsp_types::Range;

use super::protocol::{EnhancedProject, PropertyBag};
use crate::dsl::scope::normalize_value;
use crate::dsl::{ParseResult, Property, PropertyMap};

/// Merge `project` into a copy of `base`.
pub fn merge(base: &ParseResult, project: &EnhancedProject) -> ParseResult {
    let mut result = base.clone();
    let mut added = 0usize;

    for (view_name, enhanced) in &project.views {
        let Some(view) = result.views.get_mut(view_name) else {
            continue;
        };
        added += merge_properties(&mut view.properties, &enhanced.properties, view.location);
        fill(&mut view.extends, &view.properties, &["extends"]);

        for (field_name, bag) in enhanced.fields() {
            if let Some(field) = view.fields.get_mut(field_name) {
                added += merge_properties(&mut field.properties, bag, field.location);
            }
        }
    }

    for (model_name, enhanced) in &project.models {
        if let Some(model) = result.models.get_mut(model_name) {
            added += merge_properties(&mut model.properties, &enhanced.properties, model.location);
            fill(&mut model.connection, &model.properties, &["connection"]);
        }

        // Explores are keyed by name document-wide, whichever model nests them.
        for (explore_name, enhanced_explore) in &enhanced.explores {
            let Some(explore) = result.explores.get_mut(explore_name) else {
                continue;
            };
            added += merge_properties(
                &mut explore.properties,
                &enhanced_explore.properties,
                explore.location,
            );
            fill(&mut explore.view_name, &explore.properties, &["from", "view_name"]);

            for (join_name, bag) in &enhanced_explore.joins {
                let Some(join) = explore.joins.get_mut(join_name) else {
                    continue;
                };
                added += merge_properties(&mut join.properties, bag, join.location);
                fill(&mut join.view_name, &join.properties, &["from", "view_name"]);
                fill(&mut join.sql_on, &join.properties, &["sql_on"]);
                fill(&mut join.relationship, &join.properties, &["relationship"]);
            }
        }
    }

    tracing::debug!(added, "merged enhancer properties");
    result
}

/// Copy string-valued entries of `bag` that `target` lacks. Returns the
/// number of properties added.
fn merge_properties(target: &mut PropertyMap, bag: &PropertyBag, location: Range) -> usize {
    let mut added = 0;
    for (name, value) in bag {
        if name == "name" || target.contains_key(name) {
            continue;
        }
        let Some(value) = value.as_str() else {
            continue;
        };
        target.insert(
            name.clone(),
            Property::new(name.clone(), normalize_value(name, value), location),
        );
        added += 1;
    }
    added
}

/// Fill an empty typed field from the first of `keys` present in `properties`.
fn fill(slot: &mut Option<String>, properties: &PropertyMap, keys: &[&str]) {
    if slot.is_some() {
        return;
    }
    *slot = keys
        .iter()
        .find_map(|key| properties.get(*key))
        .map(|p| p.value.clone());
}
