//! Data directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StatsError;

/// Locations of the current and archived snapshot directories.
///
/// Downstream tooling relies on this layout: the latest snapshot per
/// dimension lives in `current/`, displaced runs in timestamp-named
/// directories under `archive/`.
#[derive(Clone, Debug)]
pub struct DataPaths {
    /// Directory holding the latest snapshot files
    pub current: PathBuf,
    /// Root directory of the archive slots
    pub archive: PathBuf,
}

impl DataPaths {
    /// Return the layout rooted at a data directory.
    pub fn new(root: &Path) -> Self {
        DataPaths {
            current: root.join("current"),
            archive: root.join("archive"),
        }
    }

    /// Create the current and archive directories if absent. Idempotent.
    pub fn ensure(&self) -> Result<(), StatsError> {
        fs::create_dir_all(&self.current)?;
        fs::create_dir_all(&self.archive)?;
        Ok(())
    }

    /// Default path of the summary manifest.
    pub fn summary(&self) -> PathBuf {
        self.current.join("stats_summary.json")
    }
}
