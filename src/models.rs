//! Data types and associated functions and methods

use indexmap::IndexMap;
use serde::Serialize;

/// Result of one grouping aggregation.
///
/// Maps a group key to the number of records in that group. Insertion order is
/// the order the backend returned the groups in, and is preserved through JSON
/// (de)serialisation.
///
/// Group keys are always strings; a null group key is represented by the
/// literal string `"null"`.
pub type GroupedCount = IndexMap<String, u64>;

/// One row of a two-field cross-tabulation.
///
/// The names of the two sub-keys are carried by the owning
/// [Dimension](crate::catalog::Dimension), not by the row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrossTabRow {
    /// Value of the first grouping field
    pub key_a: String,
    /// Value of the second grouping field
    pub key_b: String,
    /// Number of records matching both values
    pub count: u64,
}

/// Whether each derived statistic was generated successfully.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CustomStats {
    /// Continent rollup derived from the macroregion snapshot
    pub continents: bool,
    /// Source/dataset totals derived from the per-source snapshot
    pub totals: bool,
}

/// Summary manifest describing one pipeline run.
///
/// Serialised to `stats_summary.json` in the current snapshot directory, and
/// echoed to stdout.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// Name of the search index the aggregations ran against
    pub index: String,
    /// The raw filter expression applied, if any
    pub filters: Option<String>,
    /// Full stats payload, one entry per non-empty dimension
    pub stats: serde_json::Map<String, serde_json::Value>,
    /// Dimensions whose aggregation returned zero groups
    pub missing_dimensions: Vec<String>,
    /// Dimensions that returned exactly the group cap and may be truncated
    pub truncated_dimensions: Vec<String>,
    /// Flags for the derived statistics
    pub custom_stats: CustomStats,
}
