//! Run orchestration.
//!
//! Sequences one full pipeline run: archive the previous snapshots, issue one
//! aggregation per catalog dimension in a fixed order, write the snapshot
//! files, build the derived statistics from them and save the summary
//! manifest. Strictly sequential; the first backend failure aborts the run
//! before any manifest is written, leaving the previous run preserved in its
//! archive slot.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::archive;
use crate::backend::Backend;
use crate::catalog::{Shape, CATALOG};
use crate::derived;
use crate::error::StatsError;
use crate::filter::parse_filters;
use crate::models::{CustomStats, GroupedCount, Summary};
use crate::paths::DataPaths;
use crate::snapshot;

/// Run the full aggregation-to-snapshot pipeline and return the summary.
///
/// # Arguments
///
/// * `backend`: Aggregation backend to query
/// * `paths`: Data directory layout
/// * `index`: Name of the index being queried, recorded in the manifest
/// * `raw_filters`: Optional raw filter expression
/// * `output`: Optional override for the summary manifest path
/// * `cap`: Upper bound on distinct groups per aggregation
pub async fn build_stats(
    backend: &dyn Backend,
    paths: &DataPaths,
    index: &str,
    raw_filters: Option<&str>,
    output: Option<&Path>,
    cap: usize,
) -> Result<Summary, StatsError> {
    paths.ensure()?;
    archive::archive_current(paths)?;

    let filter = parse_filters(raw_filters);
    info!("Running aggregations against index '{}'", index);

    let mut stats = serde_json::Map::new();
    let mut missing_dimensions = Vec::new();
    let mut truncated_dimensions = Vec::new();

    for dimension in CATALOG {
        let stem = dimension.output_stem();
        let entry = match &dimension.shape {
            Shape::Scalar | Shape::Array => {
                let unwind = dimension.shape == Shape::Array;
                let counts = backend
                    .group_counts(dimension.field, unwind, &filter, cap)
                    .await?;
                if counts.is_empty() {
                    // An empty dimension still appears in the manifest, as an
                    // empty list; only the snapshot files are skipped.
                    missing_dimensions.push(dimension.name.to_string());
                    Value::Array(Vec::new())
                } else {
                    if counts.len() >= cap {
                        truncated_dimensions.push(dimension.name.to_string());
                    }
                    snapshot::write_grouped(paths, &stem, &counts)?;
                    grouped_entries(&counts)
                }
            }
            Shape::CrossTab(cross) => {
                let rows = backend
                    .cross_tab(dimension.field, cross, &filter, cap)
                    .await?;
                if rows.is_empty() {
                    missing_dimensions.push(dimension.name.to_string());
                    Value::Array(Vec::new())
                } else {
                    if rows.len() >= cap {
                        truncated_dimensions.push(dimension.name.to_string());
                    }
                    snapshot::write_cross_tab(paths, &stem, cross.name_a, cross.name_b, &rows)?;
                    Value::Array(snapshot::cross_tab_records(cross.name_a, cross.name_b, &rows))
                }
            }
            Shape::Distinct => {
                let values = backend.distinct_values(dimension.field, &filter, cap).await?;
                if values.is_empty() {
                    missing_dimensions.push(dimension.name.to_string());
                    Value::Array(Vec::new())
                } else {
                    if values.len() >= cap {
                        truncated_dimensions.push(dimension.name.to_string());
                    }
                    snapshot::write_list(paths, &stem, &values)?;
                    json!(values)
                }
            }
        };
        stats.insert(dimension.name.to_string(), entry);
    }

    // Derived stats read the snapshot files written above; they never query
    // the backend.
    let custom_stats = CustomStats {
        continents: derived::build_continent_stats(paths),
        totals: derived::build_totals_stats(paths),
    };

    let summary = Summary {
        index: index.to_string(),
        filters: raw_filters.map(str::to_string),
        stats,
        missing_dimensions,
        truncated_dimensions,
        custom_stats,
    };

    let output = output.map(Path::to_path_buf).unwrap_or_else(|| paths.summary());
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(&output)?);
    serde_json::to_writer_pretty(file, &summary)?;
    info!("Saved summary to {}", output.display());

    Ok(summary)
}

/// Render a grouped count as the manifest's list of value/count entries.
fn grouped_entries(counts: &GroupedCount) -> Value {
    Value::Array(
        counts
            .iter()
            .map(|(value, count)| json!({"value": value, "count": count}))
            .collect(),
    )
}
