//! Sample catalog for trying the generator without game content

use std::collections::BTreeMap;

use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::models::{ActionSetRef, Building, ComponentKind, ProductionLine, Quantity, Tier};

const TIER_NAMES: &[(Tier, &str)] = &[
    (Tier::SAILORS, "Sailors"),
    (Tier::PIONEERS, "Pioneers"),
    (Tier::SETTLERS, "Settlers"),
    (Tier::CITIZENS, "Citizens"),
    (Tier::MERCHANTS, "Merchants"),
    (Tier::ARISTOCRATS, "Aristocrats"),
];

// resource ids
const GOLD: i64 = 1;
const BOARDS: i64 = 4;
const FOOD: i64 = 5;
const TOOLS: i64 = 6;
const BRICKS: i64 = 7;
const FISH: i64 = 28;

fn costs(entries: &[(i64, i64)]) -> BTreeMap<i64, Quantity> {
    entries
        .iter()
        .map(|&(resource, amount)| (resource, Quantity::Int(amount)))
        .collect()
}

fn producer(lines: &[(i64, i64)]) -> ComponentKind {
    ComponentKind::from_name(
        "ProducerComponent",
        lines
            .iter()
            .map(|&(id, resource)| ProductionLine {
                id,
                produces: vec![(resource, 1)],
            })
            .collect(),
    )
}

fn single_set(tier: Tier, id: &str) -> (Tier, Vec<ActionSetRef>) {
    (tier, vec![ActionSetRef::new(id, 1)])
}

/// Sample buildings, one per typical shape of data
pub fn buildings() -> Vec<Building> {
    vec![
        Building {
            id: 1,
            name: "Warehouse".to_string(),
            tier_names: None,
            tooltip_text: Some("_ Stores goods for the whole settlement.".to_string()),
            costs: costs(&[(GOLD, 250), (BOARDS, 8), (TOOLS, 2)]),
            running_costs: 10,
            running_costs_inactive: 5,
            size: (3, 3),
            action_sets: BTreeMap::from([single_set(Tier::SAILORS, "as_warehouse0")]),
            components: vec![ComponentKind::from_name("StorageComponent", vec![])],
        },
        Building {
            id: 3,
            name: "Residential".to_string(),
            tier_names: Some(BTreeMap::from([
                (Tier::SAILORS, "Tent".to_string()),
                (Tier::PIONEERS, "Hut".to_string()),
                (Tier::SETTLERS, "House".to_string()),
                (Tier::CITIZENS, "Stone House".to_string()),
            ])),
            tooltip_text: Some("Houses your inhabitants.".to_string()),
            costs: costs(&[(BOARDS, 1)]),
            running_costs: 0,
            running_costs_inactive: 0,
            size: (2, 2),
            action_sets: BTreeMap::from([
                single_set(Tier::SAILORS, "as_tent0"),
                single_set(Tier::PIONEERS, "as_hut0"),
                single_set(Tier::SETTLERS, "as_house0"),
                (
                    Tier::CITIZENS,
                    vec![
                        ActionSetRef::new("as_stonehouse_hidden", 0),
                        ActionSetRef::new("as_stonehouse0", 1),
                    ],
                ),
            ]),
            components: Vec::new(),
        },
        Building {
            id: 8,
            name: "Lumberjack".to_string(),
            tier_names: None,
            tooltip_text: Some("_ Chops down trees and turns them into boards.".to_string()),
            costs: costs(&[(GOLD, 100), (BOARDS, 3)]),
            running_costs: 5,
            running_costs_inactive: 2,
            size: (2, 2),
            action_sets: BTreeMap::from([single_set(Tier::SAILORS, "as_lumberjack0")]),
            components: vec![producer(&[(1, BOARDS)])],
        },
        Building {
            id: 11,
            name: "Fisher".to_string(),
            tier_names: None,
            tooltip_text: None,
            costs: costs(&[(GOLD, 150), (BOARDS, 5), (TOOLS, 3)]),
            running_costs: 10,
            running_costs_inactive: 5,
            size: (3, 3),
            action_sets: BTreeMap::from([single_set(Tier::SAILORS, "as_fisher0")]),
            components: vec![producer(&[(1, FISH), (2, FOOD)])],
        },
        Building {
            id: 24,
            name: "Brickyard".to_string(),
            tier_names: None,
            tooltip_text: None,
            costs: costs(&[(GOLD, 500), (BOARDS, 6), (TOOLS, 4), (BRICKS, 2)]),
            running_costs: 15,
            running_costs_inactive: 5,
            size: (3, 4),
            action_sets: BTreeMap::from([single_set(Tier::SETTLERS, "as_brickyard0")]),
            components: vec![producer(&[(1, BRICKS)])],
        },
    ]
}

/// Frames for every action set used by [`buildings`]
pub fn frames() -> Vec<(String, &'static str, u16, String)> {
    let mut frames = Vec::new();
    for set in [
        "as_warehouse0",
        "as_tent0",
        "as_hut0",
        "as_house0",
        "as_stonehouse_hidden",
        "as_stonehouse0",
        "as_lumberjack0",
        "as_fisher0",
        "as_brickyard0",
    ] {
        let state = if set == "as_lumberjack0" { "work" } else { "idle" };
        for rotation in [45, 135, 225, 315] {
            let path = format!("content/gfx/buildings/{}/{}/{}/0.png", set, state, rotation);
            frames.push((set.to_string(), state, rotation, path));
        }
    }
    frames
}

/// Load sample data for testing without extracted content
pub fn load_sample_data(conn: &Connection) -> Result<usize> {
    db::clear_buildings(conn)?;
    db::clear_frames(conn)?;

    for (tier, name) in TIER_NAMES {
        db::upsert_tier(conn, *tier, name)?;
    }
    let buildings = buildings();
    for building in &buildings {
        db::upsert_building(conn, building)?;
    }
    for (set, state, rotation, path) in frames() {
        db::insert_frame(conn, &set, state, rotation, 0, &path)?;
    }
    Ok(buildings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overview;

    fn loaded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        assert_eq!(load_sample_data(&conn).unwrap(), 5);
        conn
    }

    #[test]
    fn sample_catalog_renders() {
        let conn = loaded();
        let catalog = db::load_catalog(&conn).unwrap();
        assert_eq!(catalog.buildings, buildings());

        let doc = overview::render(&catalog, "http://x/").unwrap();

        for heading in ["Sailors\n'''''''", "Pioneers\n''''''''", "Settlers\n''''''''", "Citizens\n''''''''"] {
            assert_eq!(doc.matches(heading).count(), 1, "{heading}");
        }
        assert!(!doc.contains("Merchants"));
        assert!(doc.contains("Stone House\n"));
        assert!(doc.contains("Stores goods for the whole settlement.\n"));
        assert!(!doc.contains("_ Stores"));
        assert!(doc.contains(".. |b3x003| image:: http://x/content/gfx/buildings/as_stonehouse0/idle/45/0.png\n"));
        assert!(doc.contains(".. |b0x008| image:: http://x/content/gfx/buildings/as_lumberjack0/work/45/0.png\n"));
        assert!(doc.contains("|produces_b011|"));
    }

    #[test]
    fn reloading_replaces_previous_sample() {
        let conn = loaded();
        load_sample_data(&conn).unwrap();
        let catalog = db::load_catalog(&conn).unwrap();
        assert_eq!(catalog.buildings.len(), 5);
        assert_eq!(catalog.tier_names.len(), 6);
        assert_eq!(catalog.asset_sets.len(), 9);
    }
}
