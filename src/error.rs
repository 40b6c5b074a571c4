//! Error types for overview generation

use std::path::PathBuf;

use crate::models::{BuildingId, ResourceId, Tier};

#[derive(Debug, thiserror::Error)]
pub enum OverviewError {
    /// No usable action set, animation state or rotation for a building variant.
    #[error("no usable asset for building {building} at tier {tier}: {reason}")]
    MissingAsset {
        building: BuildingId,
        tier: Tier,
        reason: String,
    },

    #[error("tier {0} has no entry in the tier name table")]
    MissingTierName(Tier),

    #[error("building {building}: cost of resource {resource} is not an integer ({value})")]
    MalformedCost {
        building: BuildingId,
        resource: ResourceId,
        value: String,
    },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write document: {0}")]
    Write(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid catalog data: {0}")]
    InvalidCatalog(String),
}

pub type Result<T> = std::result::Result<T, OverviewError>;

impl OverviewError {
    pub fn missing_asset(building: BuildingId, tier: Tier, reason: impl Into<String>) -> Self {
        Self::MissingAsset {
            building,
            tier,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = OverviewError::missing_asset(3, Tier::CITIZENS, "no rotation 45");
        assert_eq!(
            err.to_string(),
            "no usable asset for building 3 at tier 3: no rotation 45"
        );

        let err = OverviewError::MissingTierName(Tier(7));
        assert!(err.to_string().contains("tier 7"));

        let err = OverviewError::from(regex::Regex::new("(").unwrap_err());
        assert!(err.to_string().starts_with("invalid pattern: "));
    }
}
