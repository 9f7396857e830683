//! Snapshot archival.
//!
//! Two distinct policies with different guarantees:
//!
//! * [archive_current] moves everything out of the current directory into a
//!   second-granularity archive slot before a run overwrites it.
//! * [archive_retention] copies the current directory into a day-granularity
//!   slot, records a `state.json` generation marker and gzip-compresses the
//!   slot for long-term retention.
//!
//! They are separate named operations because conflating them risks silently
//! moving instead of copying, or skipping compression.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use tracing::info;

use crate::error::StatsError;
use crate::paths::DataPaths;

/// Move existing files from the current directory into a timestamped archive
/// slot.
///
/// Returns the slot path, or `None` when the current directory is empty.
/// Creates the current and archive directories if absent.
pub fn archive_current(paths: &DataPaths) -> Result<Option<PathBuf>, StatsError> {
    archive_current_at(paths, &Local::now().format("%Y-%m-%d_%H-%M-%S").to_string())
}

fn archive_current_at(paths: &DataPaths, timestamp: &str) -> Result<Option<PathBuf>, StatsError> {
    paths.ensure()?;
    let contents = dir_entries(&paths.current)?;
    if contents.is_empty() {
        info!("{} is empty, nothing to archive.", paths.current.display());
        return Ok(None);
    }

    let slot = paths.archive.join(timestamp);
    fs::create_dir(&slot)?;
    for path in &contents {
        let name = entry_name(path)?;
        fs::rename(path, slot.join(name))?;
    }

    info!("Archived {} files to {}", contents.len(), slot.display());
    Ok(Some(slot))
}

/// Copy current snapshots into a day-granularity retention slot and compress
/// them.
///
/// The slot is named by the unpadded local date (e.g. `2026-8-30`). A
/// `state.json` marker recording the generation label is written into the
/// slot, then every `.csv` and `.json` file in the slot (the marker included)
/// is replaced by its gzip-compressed form.
pub fn archive_retention(paths: &DataPaths) -> Result<PathBuf, StatsError> {
    archive_retention_at(paths, &Local::now().format("%Y-%-m-%-d").to_string())
}

fn archive_retention_at(paths: &DataPaths, label: &str) -> Result<PathBuf, StatsError> {
    paths.ensure()?;
    let slot = paths.archive.join(label);
    fs::create_dir_all(&slot)?;

    for path in dir_entries(&paths.current)? {
        let name = entry_name(&path)?;
        fs::copy(&path, slot.join(name))?;
    }

    let state = File::create(slot.join("state.json"))?;
    serde_json::to_writer(state, &json!({"generated": label}))?;

    for path in dir_entries(&slot)? {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") | Some("json") => compress_file(&path)?,
            _ => (),
        }
    }

    info!("Retained current snapshots in {}", slot.display());
    Ok(slot)
}

/// Replace a file with its gzip-compressed form at `<file>.gz`.
fn compress_file(path: &Path) -> Result<(), StatsError> {
    let contents = fs::read(path)?;
    let mut gz_path = path.to_path_buf().into_os_string();
    gz_path.push(".gz");
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::best());
    encoder.write_all(&contents)?;
    encoder.finish()?;
    fs::remove_file(path)?;
    Ok(())
}

fn dir_entries(dir: &Path) -> Result<Vec<PathBuf>, StatsError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

fn entry_name(path: &Path) -> Result<&std::ffi::OsStr, StatsError> {
    path.file_name().ok_or_else(|| {
        StatsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("directory entry {} has no file name", path.display()),
        ))
    })
}
