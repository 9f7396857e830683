//! A simplified search backend client that supports grouping aggregations.
//! It hides the details of the search engine's query DSL behind a small trait.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::catalog::CrossTab;
use crate::error::StatsError;
use crate::filter::FilterClauses;
use crate::models::{CrossTabRow, GroupedCount};

/// Name under which the single aggregation is requested and read back.
const AGG_NAME: &str = "counts";

/// The aggregation capability the pipeline needs from a backend.
///
/// This forms the contract between the run orchestrator and the search
/// engine. Implementations issue one blocking query per call; any retry
/// policy is their own concern.
#[async_trait]
pub trait Backend {
    /// Count records grouped by a single field.
    ///
    /// When `unwind` is set, each element of the field's parent array counts
    /// as a separate unit, so counts are not bounded by the record count.
    ///
    /// # Arguments
    ///
    /// * `field`: Dotted path of the grouping field
    /// * `unwind`: Whether the field's parent array must be flattened first
    /// * `filter`: Exact-match clauses restricting the counted records
    /// * `cap`: Upper bound on the number of groups returned
    async fn group_counts(
        &self,
        field: &str,
        unwind: bool,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<GroupedCount, StatsError>;

    /// Count records grouped by an ordered pair of fields.
    ///
    /// # Arguments
    ///
    /// * `field_a`: Dotted path of the first grouping field
    /// * `cross`: Second field and sub-key names
    /// * `filter`: Exact-match clauses restricting the counted records
    /// * `cap`: Upper bound on the number of groups returned
    async fn cross_tab(
        &self,
        field_a: &str,
        cross: &CrossTab,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<Vec<CrossTabRow>, StatsError>;

    /// Return every distinct value of a field, with no counting.
    async fn distinct_values(
        &self,
        field: &str,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<Vec<String>, StatsError>;
}

/// Search backend client backed by an HTTP search API.
///
/// Issues `_search` requests with a single named aggregation and `size: 0`,
/// authenticated with an API key.
pub struct SearchBackend {
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Base URL of the search API
    url: Url,
    /// API key sent in the Authorization header
    api_key: String,
    /// Name of the index to query
    index: String,
}

impl SearchBackend {
    /// Creates a SearchBackend object
    ///
    /// # Arguments
    ///
    /// * `url`: Search API base URL
    /// * `api_key`: API key for the search API
    /// * `index`: Name of the index to query
    pub fn new(url: Url, api_key: &str, index: &str) -> Self {
        SearchBackend {
            http: reqwest::Client::new(),
            url,
            api_key: api_key.to_string(),
            index: index.to_string(),
        }
    }

    /// Issue a search request carrying a single aggregation and return the
    /// response payload.
    async fn search(&self, aggs: Value, filter: &FilterClauses) -> Result<Value, StatsError> {
        let url = self.url.join(&format!("{}/_search", self.index))?;
        let body = search_body(aggs, filter);
        debug!("Search request to {}: {}", url, body);
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("ApiKey {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatsError::BackendStatus { status, body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Backend for SearchBackend {
    async fn group_counts(
        &self,
        field: &str,
        _unwind: bool,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<GroupedCount, StatsError> {
        // The search index flattens array fields natively, so an unwind
        // grouping is the same terms aggregation as a scalar one.
        let aggs = json!({AGG_NAME: {"terms": {"field": field, "size": cap}}});
        let payload = self.search(aggs, filter).await?;
        let mut counts = GroupedCount::new();
        for bucket in buckets(&payload)? {
            counts.insert(bucket_key_string(key(bucket)?), doc_count(bucket)?);
        }
        Ok(counts)
    }

    async fn cross_tab(
        &self,
        field_a: &str,
        cross: &CrossTab,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<Vec<CrossTabRow>, StatsError> {
        let aggs = json!({AGG_NAME: {"multi_terms": {
            "terms": [{"field": field_a}, {"field": cross.field_b}],
            "size": cap,
        }}});
        let payload = self.search(aggs, filter).await?;
        let mut rows = Vec::new();
        for bucket in buckets(&payload)? {
            let pair = key(bucket)?
                .as_array()
                .filter(|pair| pair.len() == 2)
                .ok_or(StatsError::MalformedResponse {
                    context: "a two-element bucket key",
                })?;
            rows.push(CrossTabRow {
                key_a: bucket_key_string(&pair[0]),
                key_b: bucket_key_string(&pair[1]),
                count: doc_count(bucket)?,
            });
        }
        Ok(rows)
    }

    async fn distinct_values(
        &self,
        field: &str,
        filter: &FilterClauses,
        cap: usize,
    ) -> Result<Vec<String>, StatsError> {
        let aggs = json!({AGG_NAME: {"terms": {"field": field, "size": cap}}});
        let payload = self.search(aggs, filter).await?;
        let mut values = Vec::new();
        for bucket in buckets(&payload)? {
            values.push(bucket_key_string(key(bucket)?));
        }
        Ok(values)
    }
}

/// Build a search request body from an aggregation and a filter.
///
/// The same clause list is used for the query filter and the post-filter. An
/// empty filter degenerates to a match-all query with no post-filter.
fn search_body(aggs: Value, filter: &FilterClauses) -> Value {
    let mut body = json!({"size": 0, "aggs": aggs});
    match filter.post_filter() {
        Some(post_filter) => {
            body["query"] = json!({"bool": {"filter": filter.term_clauses()}});
            body["post_filter"] = post_filter;
        }
        None => {
            body["query"] = json!({"match_all": {}});
        }
    }
    body
}

/// Extract the aggregation buckets from a search response payload.
fn buckets(payload: &Value) -> Result<&Vec<Value>, StatsError> {
    payload
        .pointer(&format!("/aggregations/{}/buckets", AGG_NAME))
        .and_then(Value::as_array)
        .ok_or(StatsError::MalformedResponse {
            context: "aggregation buckets",
        })
}

/// Extract the key of one bucket.
fn key(bucket: &Value) -> Result<&Value, StatsError> {
    bucket.get("key").ok_or(StatsError::MalformedResponse {
        context: "a bucket key",
    })
}

/// Extract the document count of one bucket.
fn doc_count(bucket: &Value) -> Result<u64, StatsError> {
    bucket
        .get("doc_count")
        .and_then(Value::as_u64)
        .ok_or(StatsError::MalformedResponse {
            context: "a bucket document count",
        })
}

/// Render a bucket key as a group key string.
///
/// Keys are usually strings; numeric and boolean keys use their JSON
/// rendering and a null key round-trips as the literal string `"null"`.
fn bucket_key_string(key: &Value) -> String {
    match key {
        Value::String(value) => value.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
