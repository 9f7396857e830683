//! Snapshot serialisation.
//!
//! Each dimension's result is persisted twice under the current directory: a
//! JSON file preserving the aggregation's own ordering, and a CSV table
//! sorted by count descending for direct human or spreadsheet consumption.
//! Existing files are overwritten; callers must archive before writing.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tracing::info;

use crate::error::StatsError;
use crate::models::{CrossTabRow, GroupedCount};
use crate::paths::DataPaths;

/// Persist a grouped count as JSON and CSV snapshot files.
///
/// The JSON mapping keeps the aggregation's insertion order. CSV rows carry a
/// `name,count` header and are sorted by count descending; the sort is
/// stable, so ties keep the aggregation's order.
pub fn write_grouped(
    paths: &DataPaths,
    stem: &str,
    counts: &GroupedCount,
) -> Result<(), StatsError> {
    write_json(paths, stem, counts)?;

    let mut rows: Vec<(&String, &u64)> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));

    let mut writer = csv::Writer::from_path(csv_path(paths, stem))?;
    writer.write_record(["name", "count"])?;
    for (name, count) in rows {
        writer.write_record([name.as_str(), count.to_string().as_str()])?;
    }
    writer.flush()?;

    log_written(paths, stem);
    Ok(())
}

/// Persist a cross-tabulation as JSON and CSV snapshot files.
///
/// The key is composite, so the JSON form is a list of records rather than a
/// flat mapping. CSV columns are the two sub-key names followed by `count`.
pub fn write_cross_tab(
    paths: &DataPaths,
    stem: &str,
    name_a: &str,
    name_b: &str,
    rows: &[CrossTabRow],
) -> Result<(), StatsError> {
    write_json(paths, stem, &cross_tab_records(name_a, name_b, rows))?;

    let mut sorted: Vec<&CrossTabRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    let mut writer = csv::Writer::from_path(csv_path(paths, stem))?;
    writer.write_record([name_a, name_b, "count"])?;
    for row in sorted {
        writer.write_record([
            row.key_a.as_str(),
            row.key_b.as_str(),
            row.count.to_string().as_str(),
        ])?;
    }
    writer.flush()?;

    log_written(paths, stem);
    Ok(())
}

/// Persist a plain list of values as JSON and CSV snapshot files.
///
/// The JSON form is the raw array; the CSV has a single `value` column. Both
/// keep the order the values were returned in.
pub fn write_list(paths: &DataPaths, stem: &str, values: &[String]) -> Result<(), StatsError> {
    write_json(paths, stem, values)?;

    let mut writer = csv::Writer::from_path(csv_path(paths, stem))?;
    writer.write_record(["value"])?;
    for value in values {
        writer.write_record([value.as_str()])?;
    }
    writer.flush()?;

    log_written(paths, stem);
    Ok(())
}

/// Render a cross-tabulation as a list of JSON records using the dimension's
/// sub-key names.
pub fn cross_tab_records(
    name_a: &str,
    name_b: &str,
    rows: &[CrossTabRow],
) -> Vec<serde_json::Value> {
    rows.iter()
        .map(|row| {
            let mut record = serde_json::Map::new();
            record.insert(name_a.to_string(), row.key_a.clone().into());
            record.insert(name_b.to_string(), row.key_b.clone().into());
            record.insert("count".to_string(), row.count.into());
            serde_json::Value::Object(record)
        })
        .collect()
}

fn json_path(paths: &DataPaths, stem: &str) -> PathBuf {
    paths.current.join(format!("{}.json", stem))
}

fn csv_path(paths: &DataPaths, stem: &str) -> PathBuf {
    paths.current.join(format!("{}.csv", stem))
}

fn write_json<T: serde::Serialize + ?Sized>(
    paths: &DataPaths,
    stem: &str,
    value: &T,
) -> Result<(), StatsError> {
    let file = BufWriter::new(File::create(json_path(paths, stem))?);
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn log_written(paths: &DataPaths, stem: &str) {
    info!(
        "Wrote {} and {}",
        json_path(paths, stem).display(),
        csv_path(paths, stem).display()
    );
}
