//! Representative illustration lookup for a building variant

use std::collections::HashMap;

use tracing::debug;

use crate::error::{OverviewError, Result};
use crate::icons::IconRegistry;
use crate::models::{ActionSetRef, AssetSet, Building, BuildingId, Tier};

/// Animation states probed in order of preference.
const STATE_PRIORITY: &[&str] = &["idle_full", "idle", "work", "abc", "abd"];

/// Rotation whose first frame illustrates the building.
const ROTATION: u16 = 45;

/// Variants whose first action set has weight 0 and never renders.
/// Maps (building, tier) to the index of the action set to use instead.
const ACTION_SET_OVERRIDES: &[(BuildingId, Tier, usize)] = &[(3, Tier::CITIZENS, 1)];

fn override_index(building: BuildingId, tier: Tier) -> Option<usize> {
    ACTION_SET_OVERRIDES
        .iter()
        .find(|(b, t, _)| *b == building && *t == tier)
        .map(|(_, _, index)| *index)
}

/// Inline token for the illustration of `building` at `tier`.
pub fn image_token(tier: Tier, building: BuildingId) -> String {
    format!("|{}|", image_name(tier, building))
}

fn image_name(tier: Tier, building: BuildingId) -> String {
    format!("b{}x{:03}", tier, building)
}

pub struct AssetResolver<'a> {
    asset_sets: &'a HashMap<String, AssetSet>,
}

impl<'a> AssetResolver<'a> {
    pub fn new(asset_sets: &'a HashMap<String, AssetSet>) -> Self {
        Self { asset_sets }
    }

    /// Pick the action set used to illustrate `building`. Without a tier the
    /// first set of the building's first tier is used.
    fn select_action_set<'b>(
        &self,
        building: &'b Building,
        tier: Option<Tier>,
    ) -> Result<&'b ActionSetRef> {
        let (tier, sets) = match tier {
            Some(tier) => (tier, building.action_sets.get(&tier)),
            None => (Tier::default(), building.action_sets.values().next()),
        };
        let sets = sets
            .filter(|sets| !sets.is_empty())
            .ok_or_else(|| OverviewError::missing_asset(building.id, tier, "no action sets"))?;

        let index = override_index(building.id, tier).unwrap_or(0);
        if index != 0 {
            debug!(
                building = building.id,
                tier = %tier,
                skipped = %sets[0].id,
                weight = sets[0].weight,
                "using alternate action set"
            );
        }
        sets.get(index).ok_or_else(|| {
            OverviewError::missing_asset(
                building.id,
                tier,
                format!("action set index {} out of range", index),
            )
        })
    }

    /// Path of the image illustrating `building` at `tier`, relative to the
    /// repository root.
    pub fn resolve_path(&self, building: &Building, tier: Option<Tier>) -> Result<&'a str> {
        let token_tier = tier.unwrap_or_default();
        let set_ref = self.select_action_set(building, tier)?;
        let set = self.asset_sets.get(&set_ref.id).ok_or_else(|| {
            OverviewError::missing_asset(
                building.id,
                token_tier,
                format!("action set {} not in catalog", set_ref.id),
            )
        })?;

        let rotations = STATE_PRIORITY
            .iter()
            .find_map(|state| set.states.get(*state))
            .ok_or_else(|| {
                OverviewError::missing_asset(
                    building.id,
                    token_tier,
                    format!("action set {} has no usable animation state", set_ref.id),
                )
            })?;

        rotations
            .get(&ROTATION)
            .and_then(|frames| frames.first())
            .map(String::as_str)
            .ok_or_else(|| {
                OverviewError::missing_asset(
                    building.id,
                    token_tier,
                    format!("action set {} has no frame at rotation {}", set_ref.id, ROTATION),
                )
            })
    }

    /// Resolve the illustration, register its image substitution in the
    /// footer and return the inline token.
    pub fn resolve(
        &self,
        building: &Building,
        tier: Option<Tier>,
        registry: &mut IconRegistry,
    ) -> Result<String> {
        let path = self.resolve_path(building, tier)?;
        let tier = tier.unwrap_or_default();
        registry.add_image(&image_name(tier, building.id), path);
        Ok(image_token(tier, building.id))
    }
}
