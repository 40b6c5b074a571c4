//! Buildings overview document assembly
//!
//! One linear pass: header, one section per tier holding a table per
//! building variant, a separator, then the sorted footer of substitution
//! definitions collected while the body was written.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::assets::AssetResolver;
use crate::error::{OverviewError, Result};
use crate::icons::IconRegistry;
use crate::models::{Building, Catalog, Tier};
use crate::table::{format_table, section};

const TITLE: &str = "Buildings Overview";

/// Blank lines between the body and the footer.
const FOOTER_SEPARATOR: &str = "\n\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    BodyEmission,
    FooterEmission,
    Done,
}

/// Every (building, tier) variant, ordered by tier. Buildings keep their
/// catalog order within a tier.
pub fn variants(buildings: &[Building]) -> Vec<(&Building, Tier)> {
    let mut pairs: Vec<(&Building, Tier)> = buildings
        .iter()
        .flat_map(|b| b.action_sets.keys().map(move |&tier| (b, tier)))
        .collect();
    pairs.sort_by_key(|(_, tier)| *tier);
    pairs
}

pub struct DocumentAssembler<'a, W: Write> {
    catalog: &'a Catalog,
    resolver: AssetResolver<'a>,
    registry: IconRegistry,
    out: W,
    stage: Stage,
}

impl<'a, W: Write> DocumentAssembler<'a, W> {
    pub fn new(catalog: &'a Catalog, base_url: &str, out: W) -> Self {
        Self {
            catalog,
            resolver: AssetResolver::new(&catalog.asset_sets),
            registry: IconRegistry::new(base_url),
            out,
            stage: Stage::Init,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
    }

    fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn tier_name(&self, tier: Tier) -> Result<&'a str> {
        self.catalog
            .tier_names
            .get(&tier)
            .map(String::as_str)
            .ok_or(OverviewError::MissingTierName(tier))
    }

    fn emit_body(&mut self) -> Result<usize> {
        self.advance(Stage::BodyEmission);
        self.write(&section(TITLE, '='))?;
        self.write("\n")?;

        let catalog = self.catalog;
        let mut current: Option<Tier> = None;
        let mut tables = 0;
        for (building, tier) in variants(&catalog.buildings) {
            if current != Some(tier) {
                let name = self.tier_name(tier)?;
                self.write(&section(name, '\''))?;
                current = Some(tier);
            }
            let table = format_table(building, tier, &self.resolver, &mut self.registry)?;
            self.write(&table)?;
            tables += 1;
        }
        Ok(tables)
    }

    fn emit_footer(&mut self) -> Result<()> {
        self.advance(Stage::FooterEmission);
        self.write(FOOTER_SEPARATOR)?;
        self.registry.emit_footer(&mut self.out)?;
        Ok(())
    }

    /// Write the whole document and hand back the writer.
    pub fn run(mut self) -> Result<W> {
        let tables = self.emit_body()?;
        self.emit_footer()?;
        self.out.flush()?;
        self.advance(Stage::Done);
        info!(
            tables,
            icons = self.registry.used_ids().len(),
            "overview assembled"
        );
        Ok(self.out)
    }
}

/// Render the overview into memory.
pub fn render(catalog: &Catalog, base_url: &str) -> Result<String> {
    let bytes = DocumentAssembler::new(catalog, base_url, Vec::new()).run()?;
    String::from_utf8(bytes).map_err(|e| OverviewError::InvalidCatalog(e.to_string()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the overview to `path`. The document goes to a temporary file that
/// replaces `path` only once it is complete; on failure `path` is untouched.
#[instrument(skip(catalog), fields(buildings = catalog.buildings.len()))]
pub fn write_overview(catalog: &Catalog, base_url: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| OverviewError::io(parent, e))?;
        }
    }

    let tmp = temp_path(path);
    let result = write_to(catalog, base_url, &tmp).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| OverviewError::io(path, e))
    });
    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "could not remove partial output");
        }
    }
    result?;

    info!(path = %path.display(), "overview written");
    Ok(())
}

fn write_to(catalog: &Catalog, base_url: &str, tmp: &Path) -> Result<()> {
    let file = File::create(tmp).map_err(|e| OverviewError::io(tmp, e))?;
    let writer = DocumentAssembler::new(catalog, base_url, BufWriter::new(file))
        .run()
        .map_err(|e| match e {
            OverviewError::Write(source) => OverviewError::io(tmp, source),
            other => other,
        })?;
    let file = writer
        .into_inner()
        .map_err(|e| OverviewError::io(tmp, e.into_error()))?;
    file.sync_all().map_err(|e| OverviewError::io(tmp, e))?;
    Ok(())
}
