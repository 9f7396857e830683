//! Utilities for use in tests.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::catalog::CrossTab;
use crate::error::StatsError;
use crate::filter::FilterClauses;
use crate::models::{CrossTabRow, GroupedCount};

/// In-memory aggregation backend over a list of JSON records.
///
/// Implements the unwind semantics the real index applies to array fields:
/// every array encountered along a field path is flattened. Scalar grouping
/// takes at most one value per record, unwind grouping takes them all.
pub struct MockBackend {
    records: Vec<Value>,
    fail: bool,
}

impl MockBackend {
    /// Return a backend over the given records.
    pub fn new(records: Vec<Value>) -> Self {
        MockBackend {
            records,
            fail: false,
        }
    }

    /// Return a backend whose every query fails.
    pub fn failing() -> Self {
        MockBackend {
            records: Vec::new(),
            fail: true,
        }
    }

    fn check_failure(&self) -> Result<(), StatsError> {
        if self.fail {
            Err(StatsError::BackendStatus {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "mock backend failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn matching_records<'a>(&'a self, filter: &'a FilterClauses) -> impl Iterator<Item = &'a Value> {
        self.records.iter().filter(|record| matches(record, filter))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn group_counts(
        &self,
        field: &str,
        unwind: bool,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<GroupedCount, StatsError> {
        self.check_failure()?;
        let mut counts = GroupedCount::new();
        for record in self.matching_records(filter) {
            for value in record_values(record, field, unwind) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        counts.truncate(cap);
        Ok(counts)
    }

    async fn cross_tab(
        &self,
        field_a: &str,
        cross: &CrossTab,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<Vec<CrossTabRow>, StatsError> {
        self.check_failure()?;
        let mut counts: indexmap::IndexMap<(String, String), u64> = indexmap::IndexMap::new();
        for record in self.matching_records(filter) {
            let values_a = record_values(record, field_a, cross.unwind_a);
            let values_b = record_values(record, cross.field_b, cross.unwind_b);
            for value_a in &values_a {
                for value_b in &values_b {
                    *counts
                        .entry((value_a.clone(), value_b.clone()))
                        .or_insert(0) += 1;
                }
            }
        }
        counts.truncate(cap);
        Ok(counts
            .into_iter()
            .map(|((key_a, key_b), count)| CrossTabRow {
                key_a,
                key_b,
                count,
            })
            .collect())
    }

    async fn distinct_values(
        &self,
        field: &str,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<Vec<String>, StatsError> {
        self.check_failure()?;
        let mut values = Vec::new();
        for record in self.matching_records(filter) {
            for value in record_values(record, field, true) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        values.truncate(cap);
        Ok(values)
    }
}

/// Values of a field within one record.
///
/// Arrays along the path are always traversed; `unwind` controls whether
/// every element counts (array semantics) or only the first found value does
/// (scalar semantics).
fn record_values(record: &Value, field: &str, unwind: bool) -> Vec<String> {
    let segments: Vec<&str> = field.split('.').collect();
    let mut found = Vec::new();
    collect_leaves(record, &segments, &mut found);
    if !unwind {
        found.truncate(1);
    }
    found
}

fn collect_leaves(value: &Value, segments: &[&str], out: &mut Vec<String>) {
    if let Value::Array(items) = value {
        for item in items {
            collect_leaves(item, segments, out);
        }
        return;
    }
    match segments.split_first() {
        None => match value {
            Value::Null => (),
            Value::String(text) => out.push(text.clone()),
            other => out.push(other.to_string()),
        },
        Some((head, rest)) => {
            if let Some(child) = value.get(head) {
                collect_leaves(child, rest, out);
            }
        }
    }
}

fn matches(record: &Value, filter: &FilterClauses) -> bool {
    filter
        .clauses()
        .iter()
        .all(|clause| record_values(record, &clause.field, true).contains(&clause.value))
}

/// Three catalog records across two sources, exercising every shape in the
/// dimension catalog except `datatypes`, which is deliberately absent.
pub fn records() -> Vec<Value> {
    vec![
        json!({
            "source": {
                "uid": "src-a",
                "catalog_type": "CKAN",
                "owner_type": "Government",
                "schema": "dcat",
                "countries": [{"name": "Germany"}],
                "macroregions": [{"name": "Western Europe"}],
                "subregions": [{"name": "Western Europe"}],
                "langs": [{"name": "German"}],
                "software": [{"name": "CKAN"}],
            },
            "dataset": {
                "license_id": "cc-by",
                "formats": ["CSV", "JSON"],
                "topics": ["environment"],
                "geotopics": ["water"],
            },
            "resources": [{"d_mime": "text/csv", "mimetype": "text/csv", "format": "CSV", "d_ext": "csv"}],
        }),
        json!({
            "source": {
                "uid": "src-a",
                "catalog_type": "CKAN",
                "owner_type": "Government",
                "schema": "dcat",
                "countries": [{"name": "Germany"}],
                "macroregions": [{"name": "Western Europe"}],
                "subregions": [{"name": "Western Europe"}],
                "langs": [{"name": "German"}],
                "software": [{"name": "CKAN"}],
            },
            "dataset": {
                "license_id": "cc-by",
                "formats": ["CSV"],
                "topics": ["health"],
                "geotopics": ["land"],
            },
            "resources": [{"d_mime": "application/json", "mimetype": "application/json", "format": "JSON", "d_ext": "json"}],
        }),
        json!({
            "source": {
                "uid": "src-b",
                "catalog_type": "Geoportal",
                "owner_type": "Local government",
                "schema": "custom",
                "countries": [{"name": "France"}],
                "macroregions": [{"name": "Caribbean"}],
                "subregions": [{"name": "Caribbean"}],
                "langs": [{"name": "French"}],
                "software": [{"name": "GeoNetwork"}],
            },
            "dataset": {
                "license_id": "cc0",
                "formats": ["SHP"],
                "topics": ["maps"],
                "geotopics": ["boundaries"],
            },
            "resources": [{"d_mime": "application/zip", "mimetype": "application/zip", "format": "SHP", "d_ext": "zip"}],
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filters;

    #[tokio::test]
    async fn scalar_counts_sum_to_record_count() {
        let backend = MockBackend::new(records());
        let counts = backend
            .group_counts("source.catalog_type", false, &FilterClauses::default(), 100)
            .await
            .unwrap();
        // Each record contributes to exactly one group.
        let total: u64 = counts.values().sum();
        assert_eq!(total, 3);
        assert_eq!(counts["CKAN"], 2);
        assert_eq!(counts["Geoportal"], 1);
    }

    #[tokio::test]
    async fn unwind_counts_per_array_entry() {
        let backend = MockBackend::new(records());
        let counts = backend
            .group_counts("dataset.formats", true, &FilterClauses::default(), 100)
            .await
            .unwrap();
        // A record with N entries contributes N increments, so the total is
        // not bounded by the record count.
        let total: u64 = counts.values().sum();
        assert_eq!(total, 4);
        assert_eq!(counts["CSV"], 2);
        assert_eq!(counts["JSON"], 1);
        assert_eq!(counts["SHP"], 1);
    }

    #[tokio::test]
    async fn cross_tab_pairs() {
        let backend = MockBackend::new(records());
        let cross = CrossTab {
            field_b: "source.catalog_type",
            name_a: "country",
            name_b: "catalog_type",
            unwind_a: true,
            unwind_b: false,
        };
        let rows = backend
            .cross_tab(
                "source.countries.name",
                &cross,
                &FilterClauses::default(),
                100,
            )
            .await
            .unwrap();
        assert!(rows.contains(&CrossTabRow {
            key_a: "Germany".to_string(),
            key_b: "CKAN".to_string(),
            count: 2,
        }));
        assert!(rows.contains(&CrossTabRow {
            key_a: "France".to_string(),
            key_b: "Geoportal".to_string(),
            count: 1,
        }));
    }

    #[tokio::test]
    async fn distinct_values_deduplicate() {
        let backend = MockBackend::new(records());
        let values = backend
            .distinct_values("source.uid", &FilterClauses::default(), 100)
            .await
            .unwrap();
        assert_eq!(values, ["src-a", "src-b"]);
    }

    #[tokio::test]
    async fn filter_restricts_matching() {
        let backend = MockBackend::new(records());
        let filter = parse_filters(Some("source.countries.name=France"));
        let counts = backend
            .group_counts("source.catalog_type", false, &filter, 100)
            .await
            .unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Geoportal"], 1);
    }
}
