//! Action set discovery in a content directory
//!
//! Action sets are directories named `as_*` holding one directory per
//! animation state, one directory per rotation inside that and the frame
//! images inside those:
//!
//! `content/gfx/buildings/sailors/tent/as_tent0/idle/45/0.png`

use std::path::Path;

use regex::Regex;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::db;
use crate::error::{OverviewError, Result};

/// One image frame found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub action_set: String,
    pub state: String,
    pub rotation: u16,
    pub path: String,
}

fn frame_pattern() -> Result<Regex> {
    Ok(Regex::new(r"(?:^|/)(as_[^/]+)/([^/]+)/(\d+)/[^/]+\.png$")?)
}

/// Find all action set frames below `content_dir`. Paths are recorded relative
/// to the directory containing `content_dir`, with `/` separators, in file
/// name order. `content_dir` is canonicalized first, so `.` or `..`
/// segments never reach the recorded paths.
pub fn find_frames(content_dir: &Path) -> Result<(Vec<Frame>, usize)> {
    let pattern = frame_pattern()?;
    let content_dir = content_dir
        .canonicalize()
        .map_err(|e| OverviewError::io(content_dir, e))?;
    let root = content_dir.parent().unwrap_or(Path::new(""));
    let mut frames = Vec::new();
    let mut skipped = 0;

    for entry in WalkDir::new(&content_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable content entry");
                None
            }
        })
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let Some(cap) = pattern.captures(&relative) else {
            skipped += 1;
            continue;
        };
        let Ok(rotation) = cap[3].parse::<u16>() else {
            debug!(path = %relative, "rotation out of range");
            skipped += 1;
            continue;
        };
        frames.push(Frame {
            action_set: cap[1].to_string(),
            state: cap[2].to_string(),
            rotation,
            path: relative.clone(),
        });
    }

    Ok((frames, skipped))
}

/// Scan `content_dir` and store every discovered frame in the database
pub fn extract_to_database(conn: &Connection, content_dir: &Path) -> Result<ExtractStats> {
    info!(dir = %content_dir.display(), "scanning for action sets");
    let (frames, skipped) = find_frames(content_dir)?;

    let mut stats = ExtractStats {
        skipped,
        ..ExtractStats::default()
    };
    let mut previous: Option<(&str, &str, u16)> = None;
    let mut position = 0;
    for frame in &frames {
        let key = (frame.action_set.as_str(), frame.state.as_str(), frame.rotation);
        if previous.map(|(set, _, _)| set) != Some(key.0) {
            stats.sets += 1;
        }
        position = if previous == Some(key) { position + 1 } else { 0 };
        previous = Some(key);

        db::insert_frame(conn, key.0, key.1, key.2, position, &frame.path)?;
        stats.frames += 1;
    }

    info!(sets = stats.sets, frames = stats.frames, "action sets extracted");
    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ExtractStats {
    pub sets: usize,
    pub frames: usize,
    pub skipped: usize,
}

impl std::fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Extracted {} action sets ({} frames). Skipped: {}",
            self.sets, self.frames, self.skipped
        )
    }
}
