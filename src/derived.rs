//! Derived statistics.
//!
//! Secondary statistics computed purely from already-written primary
//! snapshots, never by re-querying the backend. This keeps the derived
//! numbers reproducible from the committed snapshot files alone.
//!
//! Each builder returns a success flag rather than an error: a missing or
//! unusable source snapshot only marks the derived stat as failed in the run
//! manifest and does not affect the rest of the run.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use lazy_static::lazy_static;
use tracing::warn;

use crate::models::GroupedCount;
use crate::paths::DataPaths;
use crate::snapshot;

lazy_static! {
    /// Static rollup table from macroregion name to continent name.
    static ref CONTINENTS: HashMap<&'static str, &'static str> = HashMap::from([
        ("Western Europe", "Europe"),
        ("Northern America", "North America"),
        ("Australia and New Zealand", "Australia"),
        ("Northern Europe", "Europe"),
        ("Southern Europe", "Europe"),
        ("Eastern Europe", "Europe"),
        ("South America", "South America"),
        ("South-eastern Asia", "Asia"),
        ("Southern Asia", "Asia"),
        ("Eastern Asia", "Asia"),
        ("Central America", "North America"),
        ("Western Asia", "Asia"),
        ("Antarctica", "Antarctica"),
        ("Central Asia", "Asia"),
        ("Northern Africa", "Africa"),
        ("Western Africa", "Africa"),
        ("Eastern Africa", "Africa"),
        ("Caribbean", "North America"),
        ("Melanesia", "Australia"),
        ("Polynesia", "Australia"),
        ("Micronesia", "Australia"),
        ("Southern Africa", "Africa"),
        ("Middle Africa", "Africa"),
    ]);
}

/// Derive continent-level counts from the macroregion snapshot.
///
/// Re-aggregates the macroregion counts through the static [struct@CONTINENTS]
/// table and writes a `stats_continents` snapshot. Macroregions absent from
/// the table contribute nothing. Returns false when the macroregion snapshot
/// is missing or the rollup yields no results.
pub fn build_continent_stats(paths: &DataPaths) -> bool {
    let macro_path = paths.current.join("stats_macroregions.json");
    let Some(macroregions) = read_grouped(&macro_path) else {
        return false;
    };

    let results = rollup_continents(&macroregions);
    if results.is_empty() {
        warn!("No continent mappings produced results.");
        return false;
    }

    write_derived(paths, "stats_continents", &results)
}

/// Derive total source and dataset counts from the per-source snapshot.
///
/// `sources` is the number of distinct source keys, `datasets` the sum of
/// their counts. Returns false when the source snapshot is missing.
pub fn build_totals_stats(paths: &DataPaths) -> bool {
    let sources_path = paths.current.join("stats_sources.json");
    let Some(sources) = read_grouped(&sources_path) else {
        return false;
    };

    let mut totals = GroupedCount::new();
    totals.insert("sources".to_string(), sources.len() as u64);
    totals.insert("datasets".to_string(), sources.values().sum());
    write_derived(paths, "stats_totals", &totals)
}

/// Compute the continent rollup of a macroregion count mapping.
///
/// Exposed separately from [build_continent_stats] so the rollup can be
/// tested without touching the filesystem.
pub fn rollup_continents(macroregions: &GroupedCount) -> GroupedCount {
    let mut results = GroupedCount::new();
    for (region, count) in macroregions {
        if let Some(continent) = CONTINENTS.get(region.as_str()) {
            *results.entry((*continent).to_string()).or_insert(0) += count;
        }
    }
    results
}

fn read_grouped(path: &Path) -> Option<GroupedCount> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            warn!("Cannot generate derived stats: {}: {}", path.display(), error);
            return None;
        }
    };
    match serde_json::from_reader(file) {
        Ok(counts) => Some(counts),
        Err(error) => {
            warn!("Cannot parse {}: {}", path.display(), error);
            None
        }
    }
}

fn write_derived(paths: &DataPaths, stem: &str, counts: &GroupedCount) -> bool {
    match snapshot::write_grouped(paths, stem, counts) {
        Ok(()) => true,
        Err(error) => {
            warn!("Failed to write {} snapshot: {}", stem, error);
            false
        }
    }
}
