//! Icon registry: collects referenced resource ids and footer definitions
//!
//! Both sets only grow while the document body is rendered. The footer is
//! emitted once, after the body, in sorted order.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::debug;

use crate::models::ResourceId;

/// Pseudo-resource carrying the active running cost.
pub const RUNNING_COSTS: ResourceId = -99;
/// Pseudo-resource carrying the inactive running cost.
pub const RUNNING_COSTS_INACTIVE: ResourceId = -98;
/// Pseudo-resource carrying the building width.
pub const SIZE_X: ResourceId = 980;
/// Pseudo-resource carrying the building height.
pub const SIZE_Y: ResourceId = 981;

/// Ids reserved for the pseudo-resources above.
pub const PSEUDO_RESOURCES: [ResourceId; 4] = [RUNNING_COSTS, RUNNING_COSTS_INACTIVE, SIZE_X, SIZE_Y];

/// Ids at or above this are units disguised as resources.
pub const UNIT_ID_OFFSET: ResourceId = 1_000_000;
/// Highest id that still has a resource icon.
const MAX_RESOURCE_ICON_ID: ResourceId = 900;

const RESOURCE_ICON_PATH: &str = "content/gui/icons/resources/32/";
const UNIT_THUMBNAIL_PATH: &str = "content/gui/icons/units/thumbnails/";
const RUNNING_COSTS_ICON: &str = "content/gui/icons/resources/negative32.png";
const RUNNING_COSTS_INACTIVE_ICON: &str = "content/gui/icons/resources/zzz32.png";

/// Inline token referencing the icon of a resource.
pub fn resource_token(id: ResourceId) -> String {
    format!("|r{:03}|", id)
}

#[derive(Debug)]
pub struct IconRegistry {
    base_url: String,
    used_ids: BTreeSet<ResourceId>,
    footer: BTreeSet<String>,
}

impl IconRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            used_ids: BTreeSet::new(),
            footer: BTreeSet::new(),
        }
    }

    pub fn mark_used(&mut self, id: ResourceId) {
        self.used_ids.insert(id);
    }

    pub fn used_ids(&self) -> &BTreeSet<ResourceId> {
        &self.used_ids
    }

    /// Add a footer definition. Identical lines are stored once.
    pub fn add_footer(&mut self, line: impl Into<String>) {
        self.footer.insert(line.into());
    }

    /// Add an image substitution `|name|` pointing at `path` below the base url.
    pub fn add_image(&mut self, name: &str, path: &str) {
        let line = format!(".. |{}| image:: {}{}\n", name, self.base_url, path);
        self.add_footer(line);
    }

    #[cfg(test)]
    pub fn footer_lines(&self) -> impl Iterator<Item = &str> {
        self.footer.iter().map(String::as_str)
    }

    /// Icon url for a resource id, or `None` for pseudo-resources.
    pub fn resolve_icon_path(&self, id: ResourceId) -> Option<String> {
        if id >= UNIT_ID_OFFSET {
            Some(format!("{}{}{}.png", self.base_url, UNIT_THUMBNAIL_PATH, id))
        } else if id < 0 || id > MAX_RESOURCE_ICON_ID {
            None
        } else {
            Some(format!("{}{}{:03}.png", self.base_url, RESOURCE_ICON_PATH, id))
        }
    }

    /// Register the icon definitions for all used ids plus the fixed
    /// pseudo-resource definitions, then write the whole footer sorted.
    pub fn emit_footer<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        let icons: Vec<String> = self
            .used_ids
            .iter()
            .filter_map(|&id| {
                self.resolve_icon_path(id)
                    .map(|path| format!(".. |r{:03}| image:: {}\n", id, path))
            })
            .collect();
        for line in icons {
            self.add_footer(line);
        }

        self.add_image(&format!("r{}", RUNNING_COSTS), RUNNING_COSTS_ICON);
        self.add_image(
            &format!("r{}", RUNNING_COSTS_INACTIVE),
            RUNNING_COSTS_INACTIVE_ICON,
        );
        self.add_footer(format!(".. |r{}| replace:: x\n", SIZE_X));
        self.add_footer(format!(".. |r{}| replace:: y\n", SIZE_Y));

        debug!(
            used_ids = self.used_ids.len(),
            lines = self.footer.len(),
            "writing footer"
        );
        for line in &self.footer {
            out.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}
