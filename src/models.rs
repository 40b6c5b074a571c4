//! Data models for buildings, tiers, resources and action sets

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Resource identifier. Negative and very large ids are pseudo-resources.
pub type ResourceId = i64;

pub type BuildingId = i64;

/// Settlement tier a building variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tier(pub i64);

impl Tier {
    pub const SAILORS: Tier = Tier(0);
    pub const PIONEERS: Tier = Tier(1);
    pub const SETTLERS: Tier = Tier(2);
    pub const CITIZENS: Tier = Tier(3);
    pub const MERCHANTS: Tier = Tier(4);
    pub const ARISTOCRATS: Tier = Tier(5);
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A quantity as stored upstream. Only integral values render in cost tables.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Int(i64),
    Real(f64),
    Text(String),
}

impl Quantity {
    /// Integer value, if this quantity coerces cleanly.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Quantity::Int(v) => Some(*v),
            Quantity::Real(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            Quantity::Real(_) => None,
            Quantity::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Int(v) => write!(f, "{}", v),
            Quantity::Real(v) => write!(f, "{}", v),
            Quantity::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// One entry of a building's per-tier action-set list.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSetRef {
    pub id: String,
    pub weight: i64,
}

impl ActionSetRef {
    pub fn new(id: impl Into<String>, weight: i64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Animation frames of one action set: state -> rotation -> frame paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetSet {
    pub states: HashMap<String, BTreeMap<u16, Vec<String>>>,
}

impl AssetSet {
    pub fn add_frame(&mut self, state: &str, rotation: u16, path: impl Into<String>) {
        self.states
            .entry(state.to_string())
            .or_default()
            .entry(rotation)
            .or_default()
            .push(path.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionLine {
    pub id: i64,
    pub produces: Vec<(ResourceId, i64)>,
}

/// Kind of a declared building component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Producer {
        name: String,
        lines: Vec<ProductionLine>,
    },
    Other(String),
}

/// Component names that declare production lines.
const PRODUCER_KINDS: &[&str] = &[
    "ProducerComponent",
    "UnitProducerComponent",
    "ShipProducerComponent",
    "GroundUnitProducerComponent",
];

impl ComponentKind {
    pub fn from_name(name: &str, lines: Vec<ProductionLine>) -> Self {
        if PRODUCER_KINDS.contains(&name) {
            ComponentKind::Producer {
                name: name.to_string(),
                lines,
            }
        } else {
            ComponentKind::Other(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ComponentKind::Producer { name, .. } => name,
            ComponentKind::Other(name) => name,
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, ComponentKind::Producer { .. })
    }

    pub fn production_lines(&self) -> &[ProductionLine] {
        match self {
            ComponentKind::Producer { lines, .. } => lines,
            ComponentKind::Other(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    /// Display names overriding `name` for particular tiers.
    pub tier_names: Option<BTreeMap<Tier, String>>,
    pub tooltip_text: Option<String>,
    pub costs: BTreeMap<ResourceId, Quantity>,
    pub running_costs: i64,
    pub running_costs_inactive: i64,
    pub size: (i64, i64),
    pub action_sets: BTreeMap<Tier, Vec<ActionSetRef>>,
    pub components: Vec<ComponentKind>,
}

impl Building {
    /// Display name for `tier`: the tier's own name, else the first
    /// tier-specific name, else the default name.
    pub fn display_name(&self, tier: Tier) -> &str {
        match &self.tier_names {
            Some(names) => names
                .get(&tier)
                .or_else(|| names.values().next())
                .map(String::as_str)
                .unwrap_or(self.name.as_str()),
            None => &self.name,
        }
    }
}

/// Everything the document pipeline reads, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub buildings: Vec<Building>,
    pub tier_names: BTreeMap<Tier, String>,
    pub asset_sets: HashMap<String, AssetSet>,
}

/// Short summary row used by `list-buildings`
#[derive(Debug, Clone)]
pub struct BuildingSummary {
    pub id: BuildingId,
    pub name: String,
    pub tiers: Vec<Tier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building(tier_names: Option<BTreeMap<Tier, String>>) -> Building {
        Building {
            id: 1,
            name: "Tent".to_string(),
            tier_names,
            tooltip_text: None,
            costs: BTreeMap::new(),
            running_costs: 0,
            running_costs_inactive: 0,
            size: (1, 1),
            action_sets: BTreeMap::new(),
            components: Vec::new(),
        }
    }

    #[test]
    fn display_name_prefers_tier_specific_name() {
        let names = BTreeMap::from([
            (Tier::SAILORS, "Tent".to_string()),
            (Tier::PIONEERS, "Hut".to_string()),
        ]);
        let b = building(Some(names));
        assert_eq!(b.display_name(Tier::PIONEERS), "Hut");
        // unknown tier falls back to the first override
        assert_eq!(b.display_name(Tier::CITIZENS), "Tent");
    }

    #[test]
    fn display_name_without_overrides() {
        let b = building(None);
        assert_eq!(b.display_name(Tier::SETTLERS), "Tent");
        let b = building(Some(BTreeMap::new()));
        assert_eq!(b.display_name(Tier::SETTLERS), "Tent");
    }

    #[test]
    fn quantity_coercion() {
        assert_eq!(Quantity::Int(5).as_int(), Some(5));
        assert_eq!(Quantity::Real(4.0).as_int(), Some(4));
        assert_eq!(Quantity::Real(4.5).as_int(), None);
        assert_eq!(Quantity::Real(1e300).as_int(), None);
        assert_eq!(Quantity::Real(-1e300).as_int(), None);
        assert_eq!(Quantity::Real(f64::INFINITY).as_int(), None);
        assert_eq!(Quantity::Real(f64::NAN).as_int(), None);
        assert_eq!(Quantity::Text(" 12 ".into()).as_int(), Some(12));
        assert_eq!(Quantity::Text("lots".into()).as_int(), None);
    }

    #[test]
    fn producer_kinds_are_typed() {
        assert!(ComponentKind::from_name("ProducerComponent", vec![]).is_producer());
        assert!(ComponentKind::from_name("UnitProducerComponent", vec![]).is_producer());
        let storage = ComponentKind::from_name("StorageComponent", vec![]);
        assert!(!storage.is_producer());
        assert!(storage.production_lines().is_empty());
        assert_eq!(storage.name(), "StorageComponent");
    }
}
