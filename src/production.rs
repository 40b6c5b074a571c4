//! "Produces:" annotations for buildings with producer components

use std::collections::BTreeSet;

use tracing::debug;

use crate::icons::{IconRegistry, resource_token};
use crate::models::{Building, BuildingId, ResourceId};

/// Indentation of the lines inside a `replace::` block.
const BLOCK_INDENT: usize = 29;

/// Inline token referencing the production block of `building`.
pub fn production_token(building: BuildingId) -> String {
    format!("|produces_b{:03}|", building)
}

/// First output resource of every production line of every producer
/// component, deduplicated.
pub fn produced_resources(building: &Building) -> BTreeSet<ResourceId> {
    building
        .components
        .iter()
        .filter(|component| component.is_producer())
        .flat_map(|component| component.production_lines())
        .filter_map(|line| line.produces.first().map(|(resource, _)| *resource))
        .collect()
}

/// Register the production block of `building` and return its inline token,
/// or `None` when the building produces nothing.
pub fn annotate(building: &Building, registry: &mut IconRegistry) -> Option<String> {
    let outputs = produced_resources(building);
    if outputs.is_empty() {
        return None;
    }

    let indent = " ".repeat(BLOCK_INDENT);
    let mut block = format!(".. {} replace::\n", production_token(building.id));
    block.push_str(&format!("{}Produces:\n", indent));
    for &resource in &outputs {
        registry.mark_used(resource);
        block.push_str(&format!("{}{}\n", indent, resource_token(resource)));
    }
    registry.add_footer(block);

    debug!(building = building.id, outputs = outputs.len(), "production annotated");
    Some(production_token(building.id))
}
