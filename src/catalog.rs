//! The dimension catalog.
//!
//! Each statistic the pipeline produces is described by a [Dimension]: a
//! logical name, a field path into the catalog records, an aggregation
//! [Shape] and an output file stem. The catalog is a static, curated table;
//! adding a statistic is a one-line entry here.

/// A two-field cross-tabulation specification.
///
/// The first field is the owning dimension's `field`; this struct carries the
/// second field and the names used for the two sub-keys in the output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrossTab {
    /// Field path of the second grouping field
    pub field_b: &'static str,
    /// Output name for the first sub-key
    pub name_a: &'static str,
    /// Output name for the second sub-key
    pub name_b: &'static str,
    /// Whether the first field's parent array must be flattened
    pub unwind_a: bool,
    /// Whether the second field's parent array must be flattened
    pub unwind_b: bool,
}

/// Aggregation shape of a dimension.
///
/// The shape determines how the backend query is constructed. It is a closed
/// set; there is exactly one query-construction strategy per variant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Shape {
    /// Group directly on the field; each record lands in exactly one group.
    Scalar,
    /// Flatten the parent array, then group; a record with N entries
    /// contributes N unit increments.
    Array,
    /// Group on an ordered pair of fields.
    CrossTab(CrossTab),
    /// Raw distinct values of the field, no counting.
    Distinct,
}

/// One named statistic produced from a backend field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dimension {
    /// Unique logical name of the statistic
    pub name: &'static str,
    /// Dotted path of the (first) grouping field
    pub field: &'static str,
    /// Aggregation shape
    pub shape: Shape,
    /// Explicit output file stem, if the default does not apply
    stem: Option<&'static str>,
}

impl Dimension {
    const fn scalar(name: &'static str, field: &'static str, stem: Option<&'static str>) -> Self {
        Dimension {
            name,
            field,
            shape: Shape::Scalar,
            stem,
        }
    }

    const fn array(name: &'static str, field: &'static str) -> Self {
        Dimension {
            name,
            field,
            shape: Shape::Array,
            stem: None,
        }
    }

    /// Return the output file stem for this dimension.
    ///
    /// Falls back to `stats_<name>` so that every dimension always maps to a
    /// file.
    pub fn output_stem(&self) -> String {
        match self.stem {
            Some(stem) => stem.to_string(),
            None => format!("stats_{}", self.name),
        }
    }
}

/// The full dimension catalog, in run order.
pub const CATALOG: &[Dimension] = &[
    Dimension::scalar("catalog_type", "source.catalog_type", Some("stats_type")),
    Dimension::scalar("owner_type", "source.owner_type", Some("stats_owner")),
    Dimension::scalar("schemas", "source.schema", None),
    Dimension::scalar("license", "dataset.license_id", None),
    Dimension::scalar("sources", "source.uid", None),
    Dimension::array("formats", "dataset.formats"),
    Dimension::array("topics", "dataset.topics"),
    Dimension::array("datatypes", "dataset.datatypes"),
    Dimension::array("geotopics", "dataset.geotopics"),
    Dimension::array("macroregions", "source.macroregions.name"),
    Dimension::array("subregions", "source.subregions.name"),
    Dimension::array("countries", "source.countries.name"),
    Dimension::array("langs", "source.langs.name"),
    Dimension::array("software", "source.software.name"),
    Dimension::array("res_d_mime", "resources.d_mime"),
    Dimension::array("res_mimetypes", "resources.mimetype"),
    Dimension::array("res_formats", "resources.format"),
    Dimension::array("res_d_ext", "resources.d_ext"),
    Dimension {
        name: "country_type",
        field: "source.countries.name",
        shape: Shape::CrossTab(CrossTab {
            field_b: "source.catalog_type",
            name_a: "country",
            name_b: "catalog_type",
            unwind_a: true,
            unwind_b: false,
        }),
        stem: None,
    },
    Dimension {
        name: "country_software",
        field: "source.countries.name",
        shape: Shape::CrossTab(CrossTab {
            field_b: "source.software.name",
            name_a: "country",
            name_b: "software",
            unwind_a: true,
            unwind_b: true,
        }),
        stem: None,
    },
    Dimension {
        name: "country_owner",
        field: "source.countries.name",
        shape: Shape::CrossTab(CrossTab {
            field_b: "source.owner_type",
            name_a: "country",
            name_b: "owner_type",
            unwind_a: true,
            unwind_b: false,
        }),
        stem: None,
    },
    Dimension {
        name: "crawledsources",
        field: "source.uid",
        shape: Shape::Distinct,
        stem: Some("crawledsources"),
    },
];

/// Look up a dimension by name.
pub fn dimension(name: &str) -> Option<&'static Dimension> {
    CATALOG.iter().find(|dimension| dimension.name == name)
}

/// Return the path to flatten when grouping an array field.
///
/// The array lives at the field path with the last segment stripped. A path
/// with no separator has no array ancestor; flattening it is a no-op, so the
/// field path itself is returned and grouping degenerates to scalar.
pub fn unwind_path(field: &str) -> &str {
    match field.rsplit_once('.') {
        Some((parent, _)) => parent,
        None => field,
    }
}
