//! Cost table formatting for one building variant
//!
//! A building variant renders as a two-column grid table: the illustration in
//! the first column and a nested table of costs in the second. Running costs
//! and size travel through the cost table as pseudo-resources so they get a
//! column each.

use std::collections::BTreeMap;

use tracing::debug;

use crate::assets::AssetResolver;
use crate::error::{OverviewError, Result};
use crate::icons::{
    IconRegistry, PSEUDO_RESOURCES, RUNNING_COSTS, RUNNING_COSTS_INACTIVE, SIZE_X, SIZE_Y,
    resource_token,
};
use crate::models::{Building, ResourceId, Tier};
use crate::production;

/// Minimum width of a cost cell.
const CELL_WIDTH: usize = 6;

/// Prefix marking translatable tooltips.
const TOOLTIP_MARKER: &str = "_ ";

/// Title underlined to its exact length with `underline`.
pub fn section(title: &str, underline: char) -> String {
    let rule: String = std::iter::repeat_n(underline, title.chars().count()).collect();
    format!("{}\n{}\n", title, rule)
}

/// Tooltip text with the translation marker removed.
pub fn tooltip(text: &str) -> &str {
    text.strip_prefix(TOOLTIP_MARKER).unwrap_or(text)
}

/// Genuine costs plus the four pseudo-resources, sorted by resource id.
/// Genuine cost ids are registered as used icons. A genuine cost under a
/// pseudo-resource id is replaced by the pseudo value.
pub fn cost_columns(building: &Building, registry: &mut IconRegistry) -> Result<Vec<(ResourceId, i64)>> {
    let mut columns: BTreeMap<ResourceId, i64> = BTreeMap::new();
    for (&resource, amount) in &building.costs {
        let value = amount.as_int().ok_or_else(|| OverviewError::MalformedCost {
            building: building.id,
            resource,
            value: amount.to_string(),
        })?;
        if PSEUDO_RESOURCES.contains(&resource) {
            debug!(building = building.id, resource, "cost shadowed by pseudo-resource");
        } else {
            registry.mark_used(resource);
        }
        columns.insert(resource, value);
    }
    columns.insert(RUNNING_COSTS, building.running_costs);
    columns.insert(RUNNING_COSTS_INACTIVE, building.running_costs_inactive);
    columns.insert(SIZE_X, building.size.0);
    columns.insert(SIZE_Y, building.size.1);
    Ok(columns.into_iter().collect())
}

/// Lines of the nested cost table: rule, icon row, rule, value row, rule.
pub fn cost_rows(columns: &[(ResourceId, i64)]) -> Vec<String> {
    let cells: Vec<(String, String, usize)> = columns
        .iter()
        .map(|&(resource, value)| {
            let token = resource_token(resource);
            let value = value.to_string();
            let width = CELL_WIDTH.max(token.len()).max(value.len());
            (token, value, width)
        })
        .collect();

    let rule = format!(
        "+-{}-+",
        cells
            .iter()
            .map(|(_, _, width)| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    let icons = format!(
        "| {} |",
        cells
            .iter()
            .map(|(token, _, width)| format!("{:<width$}", token, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    );
    let values = format!(
        "| {} |",
        cells
            .iter()
            .map(|(_, value, width)| format!("{:>width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    );

    vec![rule.clone(), icons, rule.clone(), values, rule]
}

/// Render the titled table of `building` at `tier`, followed by a blank line.
pub fn format_table(
    building: &Building,
    tier: Tier,
    resolver: &AssetResolver<'_>,
    registry: &mut IconRegistry,
) -> Result<String> {
    let mut out = section(building.display_name(tier), '`');
    if let Some(text) = building.tooltip_text.as_deref() {
        out.push_str(tooltip(text));
        out.push_str("\n\n");
    }

    let columns = cost_columns(building, registry)?;
    let costs = cost_rows(&columns);
    let image = resolver.resolve(building, Some(tier), registry)?;

    let image_width = image.len();
    let costs_width = costs[0].len();
    let border = format!(
        "+-{}-+-{}-+\n",
        "-".repeat(image_width),
        "-".repeat(costs_width)
    );
    let blank = " ".repeat(image_width);

    out.push_str(&border);
    for (i, line) in costs.iter().enumerate() {
        let first = if i == 0 { image.as_str() } else { blank.as_str() };
        out.push_str(&format!("| {} | {} |\n", first, line));
    }
    // The leading space keeps the substitution from being read as a column edge.
    if let Some(token) = production::annotate(building, registry) {
        let cell = format!(" {}", token);
        out.push_str(&format!(
            "| {} | {:<width$} |\n",
            blank,
            cell,
            width = costs_width
        ));
    }
    out.push_str(&border);
    out.push('\n');

    debug!(
        building = building.id,
        tier = %tier,
        columns = columns.len(),
        "table formatted"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{ActionSetRef, AssetSet, ComponentKind, ProductionLine, Quantity};

    fn asset_sets() -> HashMap<String, AssetSet> {
        let mut set = AssetSet::default();
        set.add_frame("idle", 45, "content/gfx/as_farm/idle/45/0.png");
        HashMap::from([("as_farm".to_string(), set)])
    }

    fn farm() -> Building {
        Building {
            id: 20,
            name: "Farm".to_string(),
            tier_names: None,
            tooltip_text: None,
            costs: BTreeMap::from([(2, Quantity::Int(50)), (3, Quantity::Int(20))]),
            running_costs: 5,
            running_costs_inactive: 1,
            size: (3, 4),
            action_sets: BTreeMap::from([(Tier::SETTLERS, vec![ActionSetRef::new("as_farm", 1)])]),
            components: Vec::new(),
        }
    }

    fn table_lines(table: &str) -> Vec<&str> {
        table.lines().filter(|line| line.starts_with(['+', '|'])).collect()
    }

    #[test]
    fn pseudo_resources_are_injected_and_sorted() {
        let mut registry = IconRegistry::new("http://x/");
        let columns = cost_columns(&farm(), &mut registry).unwrap();
        assert_eq!(
            columns,
            vec![(-99, 5), (-98, 1), (2, 50), (3, 20), (980, 3), (981, 4)]
        );
        assert_eq!(registry.used_ids().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn costs_under_pseudo_ids_are_replaced() {
        let mut registry = IconRegistry::new("http://x/");
        let mut b = farm();
        b.costs = BTreeMap::from([(980, Quantity::Int(7)), (-99, Quantity::Int(11))]);

        let columns = cost_columns(&b, &mut registry).unwrap();

        assert_eq!(columns, vec![(-99, 5), (-98, 1), (980, 3), (981, 4)]);
        assert!(registry.used_ids().is_empty());
    }

    #[test]
    fn cost_rows_layout() {
        let rows = cost_rows(&[(-99, 5), (2, 50)]);
        assert_eq!(
            rows,
            vec![
                "+--------+--------+",
                "| |r-99| | |r002| |",
                "+--------+--------+",
                "|      5 |     50 |",
                "+--------+--------+",
            ]
        );
    }

    #[test]
    fn wide_values_widen_their_column() {
        let rows = cost_rows(&[(1, 1_234_567), (1_000_001, 2)]);
        let width = rows[0].len();
        assert!(rows.iter().all(|row| row.len() == width));
        assert!(rows[3].contains("1234567"));
        assert!(rows[1].contains("|r1000001|"));
    }

    #[test]
    fn farm_table_matches_layout() {
        let sets = asset_sets();
        let resolver = AssetResolver::new(&sets);
        let mut registry = IconRegistry::new("http://x/");

        let table = format_table(&farm(), Tier::SETTLERS, &resolver, &mut registry).unwrap();

        let expected = "\
Farm
````
+----------+---------------------------------------------------------+
| |b2x020| | +--------+--------+--------+--------+--------+--------+ |
|          | | |r-99| | |r-98| | |r002| | |r003| | |r980| | |r981| | |
|          | +--------+--------+--------+--------+--------+--------+ |
|          | |      5 |      1 |     50 |     20 |      3 |      4 | |
|          | +--------+--------+--------+--------+--------+--------+ |
+----------+---------------------------------------------------------+

";
        assert_eq!(table, expected);
        assert!(
            registry
                .footer_lines()
                .any(|line| line == ".. |b2x020| image:: http://x/content/gfx/as_farm/idle/45/0.png\n")
        );
    }

    #[test]
    fn every_row_has_the_same_width() {
        let sets = asset_sets();
        let resolver = AssetResolver::new(&sets);
        let mut registry = IconRegistry::new("http://x/");
        let mut b = farm();
        b.components = vec![ComponentKind::from_name(
            "ProducerComponent",
            vec![ProductionLine {
                id: 1,
                produces: vec![(10, 1)],
            }],
        )];

        let table = format_table(&b, Tier::SETTLERS, &resolver, &mut registry).unwrap();

        let lines = table_lines(&table);
        assert_eq!(lines.len(), 8);
        let width = lines[0].len();
        assert!(lines.iter().all(|line| line.len() == width), "{table}");
        assert!(lines[6].starts_with("|          |  |produces_b020| "));
        assert!(registry.used_ids().contains(&10));
    }

    #[test]
    fn tooltip_marker_is_stripped() {
        let sets = asset_sets();
        let resolver = AssetResolver::new(&sets);
        let mut registry = IconRegistry::new("http://x/");
        let mut b = farm();
        b.tooltip_text = Some("_ Grows wheat.".to_string());
        b.tier_names = Some(BTreeMap::from([(Tier::SETTLERS, "Wheat Field".to_string())]));

        let table = format_table(&b, Tier::SETTLERS, &resolver, &mut registry).unwrap();

        assert!(table.starts_with("Wheat Field\n```````````\nGrows wheat.\n\n+---"));
        assert_eq!(tooltip("Plain"), "Plain");
    }

    #[test]
    fn malformed_cost_is_reported() {
        let mut registry = IconRegistry::new("http://x/");
        let mut b = farm();
        b.costs.insert(4, Quantity::Text("plenty".to_string()));
        let err = cost_columns(&b, &mut registry).unwrap_err();
        assert!(matches!(
            err,
            OverviewError::MalformedCost {
                building: 20,
                resource: 4,
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_real_cost_is_reported() {
        let mut registry = IconRegistry::new("http://x/");
        let mut b = farm();
        b.costs.insert(2, Quantity::Real(1e300));
        let err = cost_columns(&b, &mut registry).unwrap_err();
        assert!(matches!(
            err,
            OverviewError::MalformedCost { resource: 2, .. }
        ));
    }

    #[test]
    fn section_underline_counts_characters() {
        assert_eq!(section("Bäckerei", '`'), "Bäckerei\n````````\n");
    }
}
