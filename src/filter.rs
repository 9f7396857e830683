//! Filter expression parsing.
//!
//! A filter expression is a `;`-separated list of `field=value` clauses, e.g.
//! `source.catalog_type=Geoportal;"source.owner_type"="Local government"`.
//! Fields and values may be double-quoted; quotes are stripped before use.
//! Malformed clauses are dropped with a warning rather than aborting the run.

use serde_json::{json, Value};
use tracing::warn;

/// A single exact-match clause.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterClause {
    /// Field path to match on
    pub field: String,
    /// Value the field must equal
    pub value: String,
}

/// A conjunction of exact-match clauses ("must all equal").
///
/// The same clause list is rendered both as the query filter and as the
/// post-filter of a search request, so that prefilter and postfilter
/// semantics agree.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterClauses(Vec<FilterClause>);

impl FilterClauses {
    /// Whether no clauses were supplied (match everything).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The parsed clauses.
    pub fn clauses(&self) -> &[FilterClause] {
        &self.0
    }

    /// Render the clauses as a list of exact-match term queries.
    pub fn term_clauses(&self) -> Vec<Value> {
        self.0
            .iter()
            .map(|clause| json!({"term": {clause.field.clone(): {"value": clause.value.clone()}}}))
            .collect()
    }

    /// Render the clauses as a post-filter, or `None` when empty.
    pub fn post_filter(&self) -> Option<Value> {
        if self.is_empty() {
            None
        } else {
            Some(json!({"bool": {"must": self.term_clauses()}}))
        }
    }
}

/// Parse a raw filter expression into a clause list.
///
/// An empty or absent expression yields no filter, and empty parts are
/// ignored. A clause is split on the first `=`; a clause with no `=` is
/// skipped with a warning and the remaining clauses are kept.
pub fn parse_filters(raw: Option<&str>) -> FilterClauses {
    let Some(raw) = raw else {
        return FilterClauses::default();
    };
    let mut clauses = Vec::new();
    for part in raw.split(';') {
        if part.trim().is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((field, value)) => clauses.push(FilterClause {
                field: field.trim_matches('"').to_string(),
                value: value.trim_matches('"').to_string(),
            }),
            None => warn!("Skipping malformed filter expression: {}", part),
        }
    }
    FilterClauses(clauses)
}
