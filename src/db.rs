//! Catalog database schema and operations

use std::collections::{BTreeMap, HashMap};

use rusqlite::types::Value;
use rusqlite::{Connection, params};

use crate::error::{OverviewError, Result};
use crate::models::{
    ActionSetRef, AssetSet, Building, BuildingId, BuildingSummary, Catalog, ComponentKind,
    ProductionLine, Quantity, Tier,
};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Settler tiers and their display names
        CREATE TABLE IF NOT EXISTS tier (
            level INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- Building definitions
        CREATE TABLE IF NOT EXISTS buildings (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            tooltip_text TEXT,
            running_costs INTEGER NOT NULL DEFAULT 0,
            running_costs_inactive INTEGER NOT NULL DEFAULT 0,
            size_x INTEGER NOT NULL,
            size_y INTEGER NOT NULL
        );

        -- Names that differ per tier (e.g. Tent -> Hut)
        CREATE TABLE IF NOT EXISTS building_names (
            building_id INTEGER,
            tier INTEGER,
            name TEXT NOT NULL,
            PRIMARY KEY (building_id, tier)
        );

        -- Construction costs; amount keeps SQLite's dynamic typing
        CREATE TABLE IF NOT EXISTS building_costs (
            building_id INTEGER,
            resource_id INTEGER,
            amount,
            PRIMARY KEY (building_id, resource_id)
        );

        -- Action sets per tier, in listing order
        CREATE TABLE IF NOT EXISTS building_action_sets (
            building_id INTEGER,
            tier INTEGER,
            position INTEGER,
            action_set_id TEXT NOT NULL,
            weight INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (building_id, tier, position)
        );

        CREATE TABLE IF NOT EXISTS building_components (
            building_id INTEGER,
            position INTEGER,
            kind TEXT NOT NULL,
            PRIMARY KEY (building_id, position)
        );

        CREATE TABLE IF NOT EXISTS production_lines (
            building_id INTEGER,
            component_position INTEGER,
            line_id INTEGER,
            PRIMARY KEY (building_id, component_position, line_id)
        );

        CREATE TABLE IF NOT EXISTS production_line_outputs (
            building_id INTEGER,
            component_position INTEGER,
            line_id INTEGER,
            position INTEGER,
            resource_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            PRIMARY KEY (building_id, component_position, line_id, position)
        );

        -- Animation frames discovered in the content directory
        CREATE TABLE IF NOT EXISTS action_set_frames (
            action_set_id TEXT,
            state TEXT,
            rotation INTEGER,
            position INTEGER,
            path TEXT NOT NULL,
            PRIMARY KEY (action_set_id, state, rotation, position)
        );

        CREATE INDEX IF NOT EXISTS idx_building_costs_building ON building_costs(building_id);
        CREATE INDEX IF NOT EXISTS idx_action_sets_building ON building_action_sets(building_id);
        CREATE INDEX IF NOT EXISTS idx_outputs_building ON production_line_outputs(building_id);
        "#,
    )?;
    Ok(())
}

/// Clear all building data (for reloading)
pub fn clear_buildings(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM production_line_outputs;
        DELETE FROM production_lines;
        DELETE FROM building_components;
        DELETE FROM building_action_sets;
        DELETE FROM building_costs;
        DELETE FROM building_names;
        DELETE FROM buildings;
        DELETE FROM tier;
        "#,
    )?;
    Ok(())
}

/// Clear discovered action set frames (for re-extraction)
pub fn clear_frames(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM action_set_frames", [])?;
    Ok(())
}

/// Insert or replace a tier name
pub fn upsert_tier(conn: &Connection, tier: Tier, name: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO tier (level, name) VALUES (?1, ?2)",
        params![tier.0, name],
    )?;
    Ok(())
}

fn quantity_value(quantity: &Quantity) -> Value {
    match quantity {
        Quantity::Int(v) => Value::Integer(*v),
        Quantity::Real(v) => Value::Real(*v),
        Quantity::Text(s) => Value::Text(s.clone()),
    }
}

fn value_quantity(value: Value) -> Result<Quantity> {
    match value {
        Value::Integer(v) => Ok(Quantity::Int(v)),
        Value::Real(v) => Ok(Quantity::Real(v)),
        Value::Text(s) => Ok(Quantity::Text(s)),
        Value::Null => Ok(Quantity::Text(String::new())),
        Value::Blob(_) => Err(OverviewError::InvalidCatalog(
            "binary cost amount".to_string(),
        )),
    }
}

/// Insert or replace a building together with its names, costs, action sets
/// and components
pub fn upsert_building(conn: &Connection, building: &Building) -> Result<()> {
    for table in [
        "production_line_outputs",
        "production_lines",
        "building_components",
        "building_action_sets",
        "building_costs",
        "building_names",
    ] {
        conn.execute(
            &format!("DELETE FROM {} WHERE building_id = ?1", table),
            [building.id],
        )?;
    }

    conn.execute(
        "INSERT OR REPLACE INTO buildings (id, name, tooltip_text, running_costs, running_costs_inactive, size_x, size_y)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            building.id,
            building.name,
            building.tooltip_text,
            building.running_costs,
            building.running_costs_inactive,
            building.size.0,
            building.size.1,
        ],
    )?;

    if let Some(names) = &building.tier_names {
        for (tier, name) in names {
            conn.execute(
                "INSERT INTO building_names (building_id, tier, name) VALUES (?1, ?2, ?3)",
                params![building.id, tier.0, name],
            )?;
        }
    }

    for (resource, amount) in &building.costs {
        conn.execute(
            "INSERT INTO building_costs (building_id, resource_id, amount) VALUES (?1, ?2, ?3)",
            params![building.id, resource, quantity_value(amount)],
        )?;
    }

    for (tier, sets) in &building.action_sets {
        for (position, set) in sets.iter().enumerate() {
            conn.execute(
                "INSERT INTO building_action_sets (building_id, tier, position, action_set_id, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![building.id, tier.0, position as i64, set.id, set.weight],
            )?;
        }
    }

    for (position, component) in building.components.iter().enumerate() {
        conn.execute(
            "INSERT INTO building_components (building_id, position, kind) VALUES (?1, ?2, ?3)",
            params![building.id, position as i64, component.name()],
        )?;
        for line in component.production_lines() {
            conn.execute(
                "INSERT INTO production_lines (building_id, component_position, line_id)
                 VALUES (?1, ?2, ?3)",
                params![building.id, position as i64, line.id],
            )?;
            for (output_position, (resource, amount)) in line.produces.iter().enumerate() {
                conn.execute(
                    "INSERT INTO production_line_outputs
                     (building_id, component_position, line_id, position, resource_id, amount)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        building.id,
                        position as i64,
                        line.id,
                        output_position as i64,
                        resource,
                        amount
                    ],
                )?;
            }
        }
    }
    Ok(())
}

/// Insert one animation frame of an action set
pub fn insert_frame(
    conn: &Connection,
    action_set: &str,
    state: &str,
    rotation: u16,
    position: usize,
    path: &str,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO action_set_frames (action_set_id, state, rotation, position, path)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![action_set, state, rotation, position as i64, path],
    )?;
    Ok(())
}

/// Load the tier name table
pub fn load_tier_names(conn: &Connection) -> Result<BTreeMap<Tier, String>> {
    let mut stmt = conn.prepare("SELECT level, name FROM tier")?;
    let rows = stmt.query_map([], |row| Ok((Tier(row.get(0)?), row.get::<_, String>(1)?)))?;

    let mut results = BTreeMap::new();
    for row in rows {
        let (tier, name) = row?;
        results.insert(tier, name);
    }
    Ok(results)
}

/// Load all action sets with their frames
pub fn load_asset_sets(conn: &Connection) -> Result<HashMap<String, AssetSet>> {
    let mut stmt = conn.prepare(
        "SELECT action_set_id, state, rotation, path FROM action_set_frames
         ORDER BY action_set_id, state, rotation, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u16>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut results: HashMap<String, AssetSet> = HashMap::new();
    for row in rows {
        let (set, state, rotation, path) = row?;
        results.entry(set).or_default().add_frame(&state, rotation, path);
    }
    Ok(results)
}

fn load_tier_specific_names(conn: &Connection, id: BuildingId) -> Result<Option<BTreeMap<Tier, String>>> {
    let mut stmt = conn.prepare("SELECT tier, name FROM building_names WHERE building_id = ?1")?;
    let rows = stmt.query_map([id], |row| Ok((Tier(row.get(0)?), row.get::<_, String>(1)?)))?;

    let mut names = BTreeMap::new();
    for row in rows {
        let (tier, name) = row?;
        names.insert(tier, name);
    }
    Ok(if names.is_empty() { None } else { Some(names) })
}

fn load_costs(conn: &Connection, id: BuildingId) -> Result<BTreeMap<i64, Quantity>> {
    let mut stmt = conn.prepare("SELECT resource_id, amount FROM building_costs WHERE building_id = ?1")?;
    let rows = stmt.query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Value>(1)?)))?;

    let mut costs = BTreeMap::new();
    for row in rows {
        let (resource, amount) = row?;
        costs.insert(resource, value_quantity(amount)?);
    }
    Ok(costs)
}

fn load_action_sets(conn: &Connection, id: BuildingId) -> Result<BTreeMap<Tier, Vec<ActionSetRef>>> {
    let mut stmt = conn.prepare(
        "SELECT tier, action_set_id, weight FROM building_action_sets
         WHERE building_id = ?1 ORDER BY tier, position",
    )?;
    let rows = stmt.query_map([id], |row| {
        Ok((Tier(row.get(0)?), ActionSetRef::new(row.get::<_, String>(1)?, row.get(2)?)))
    })?;

    let mut sets: BTreeMap<Tier, Vec<ActionSetRef>> = BTreeMap::new();
    for row in rows {
        let (tier, set) = row?;
        sets.entry(tier).or_default().push(set);
    }
    Ok(sets)
}

fn load_components(conn: &Connection, id: BuildingId) -> Result<Vec<ComponentKind>> {
    let mut stmt = conn.prepare(
        "SELECT position, kind FROM building_components WHERE building_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
    let declared = rows.collect::<rusqlite::Result<Vec<_>>>()?;

    let mut lines_stmt = conn.prepare(
        "SELECT line_id FROM production_lines
         WHERE building_id = ?1 AND component_position = ?2 ORDER BY line_id",
    )?;
    let mut outputs_stmt = conn.prepare(
        "SELECT resource_id, amount FROM production_line_outputs
         WHERE building_id = ?1 AND component_position = ?2 AND line_id = ?3 ORDER BY position",
    )?;

    let mut components = Vec::with_capacity(declared.len());
    for (position, kind) in declared {
        let line_ids = lines_stmt
            .query_map(params![id, position], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut lines = Vec::with_capacity(line_ids.len());
        for line_id in line_ids {
            let produces = outputs_stmt
                .query_map(params![id, position, line_id], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            lines.push(ProductionLine {
                id: line_id,
                produces,
            });
        }
        components.push(ComponentKind::from_name(&kind, lines));
    }
    Ok(components)
}

/// Load all buildings, ordered by id
pub fn load_buildings(conn: &Connection) -> Result<Vec<Building>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, tooltip_text, running_costs, running_costs_inactive, size_x, size_y
         FROM buildings ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Building {
            id: row.get(0)?,
            name: row.get(1)?,
            tier_names: None,
            tooltip_text: row.get(2)?,
            costs: BTreeMap::new(),
            running_costs: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
            running_costs_inactive: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
            size: (row.get(5)?, row.get(6)?),
            action_sets: BTreeMap::new(),
            components: Vec::new(),
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        let mut building = row?;
        building.tier_names = load_tier_specific_names(conn, building.id)?;
        building.costs = load_costs(conn, building.id)?;
        building.action_sets = load_action_sets(conn, building.id)?;
        building.components = load_components(conn, building.id)?;
        results.push(building);
    }
    Ok(results)
}

/// Load everything the overview needs in one go
pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    Ok(Catalog {
        buildings: load_buildings(conn)?,
        tier_names: load_tier_names(conn)?,
        asset_sets: load_asset_sets(conn)?,
    })
}

/// List all buildings with the tiers they appear in
pub fn list_buildings(conn: &Connection) -> Result<Vec<BuildingSummary>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name, GROUP_CONCAT(DISTINCT a.tier)
         FROM buildings b
         LEFT JOIN building_action_sets a ON b.id = a.building_id
         GROUP BY b.id ORDER BY b.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, name, tiers) = row?;
        let mut tiers = tiers
            .unwrap_or_default()
            .split(',')
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse()
                    .map(Tier)
                    .map_err(|_| OverviewError::InvalidCatalog(format!("tier {:?}", t)))
            })
            .collect::<Result<Vec<_>>>()?;
        tiers.sort();
        results.push(BuildingSummary { id, name, tiers });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn lumberjack() -> Building {
        Building {
            id: 8,
            name: "Lumberjack's Hut".to_string(),
            tier_names: Some(BTreeMap::from([(Tier::PIONEERS, "Woodcutter".to_string())])),
            tooltip_text: Some("_ Chops down trees.".to_string()),
            costs: BTreeMap::from([(1, Quantity::Int(100)), (4, Quantity::Int(3))]),
            running_costs: 10,
            running_costs_inactive: 5,
            size: (2, 2),
            action_sets: BTreeMap::from([
                (Tier::SAILORS, vec![ActionSetRef::new("as_lumberjack0", 1)]),
                (
                    Tier::PIONEERS,
                    vec![
                        ActionSetRef::new("as_lumberjack1", 0),
                        ActionSetRef::new("as_lumberjack2", 1),
                    ],
                ),
            ]),
            components: vec![
                ComponentKind::from_name("StorageComponent", vec![]),
                ComponentKind::from_name(
                    "ProducerComponent",
                    vec![
                        ProductionLine {
                            id: 4,
                            produces: vec![(4, 1)],
                        },
                        ProductionLine {
                            id: 9,
                            produces: vec![(8, 2), (2, 1)],
                        },
                    ],
                ),
            ],
        }
    }

    #[test]
    fn building_survives_store_and_load() {
        let conn = conn();
        let building = lumberjack();
        upsert_building(&conn, &building).unwrap();
        // upserting again replaces the child rows
        upsert_building(&conn, &building).unwrap();

        let loaded = load_buildings(&conn).unwrap();
        assert_eq!(loaded, vec![building]);
    }

    #[test]
    fn buildings_without_overrides_have_no_tier_names() {
        let conn = conn();
        let mut building = lumberjack();
        building.tier_names = None;
        upsert_building(&conn, &building).unwrap();
        assert_eq!(load_buildings(&conn).unwrap()[0].tier_names, None);
    }

    #[test]
    fn text_costs_load_as_text() {
        let conn = conn();
        upsert_building(&conn, &lumberjack()).unwrap();
        conn.execute(
            "UPDATE building_costs SET amount = 'many' WHERE resource_id = 4",
            [],
        )
        .unwrap();

        let loaded = load_buildings(&conn).unwrap();
        assert_eq!(loaded[0].costs[&4], Quantity::Text("many".to_string()));
        assert_eq!(loaded[0].costs[&1], Quantity::Int(100));
    }

    #[test]
    fn catalog_includes_tiers_and_frames() {
        let conn = conn();
        upsert_tier(&conn, Tier::SAILORS, "Sailors").unwrap();
        upsert_tier(&conn, Tier::PIONEERS, "Pioneers").unwrap();
        insert_frame(&conn, "as_tent", "idle", 45, 1, "content/gfx/as_tent/idle/45/1.png").unwrap();
        insert_frame(&conn, "as_tent", "idle", 45, 0, "content/gfx/as_tent/idle/45/0.png").unwrap();
        insert_frame(&conn, "as_tent", "idle", 135, 0, "content/gfx/as_tent/idle/135/0.png").unwrap();

        let catalog = load_catalog(&conn).unwrap();
        assert_eq!(catalog.tier_names[&Tier::PIONEERS], "Pioneers");
        let idle = &catalog.asset_sets["as_tent"].states["idle"];
        assert_eq!(
            idle[&45],
            vec!["content/gfx/as_tent/idle/45/0.png", "content/gfx/as_tent/idle/45/1.png"]
        );
        assert_eq!(idle.len(), 2);

        clear_frames(&conn).unwrap();
        assert!(load_asset_sets(&conn).unwrap().is_empty());
    }

    #[test]
    fn list_buildings_reports_tiers() {
        let conn = conn();
        upsert_building(&conn, &lumberjack()).unwrap();
        let summaries = list_buildings(&conn).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].tiers, vec![Tier::SAILORS, Tier::PIONEERS]);

        clear_buildings(&conn).unwrap();
        assert!(list_buildings(&conn).unwrap().is_empty());
    }
}
