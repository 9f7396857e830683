//! This crate builds aggregated statistics for a dataset catalog search
//! index. It runs one grouping aggregation per curated dimension, writes each
//! result as a JSON/CSV snapshot pair, derives secondary statistics from the
//! written snapshots and records a summary manifest, archiving the previous
//! run's snapshots first so every run is preserved.
//!
//! The snapshots are stable, diffable artifacts consumed by downstream
//! dashboards and static pages; this is a reporting pipeline, not a query
//! engine.
//!
//! The pipeline is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Serde](serde) performs (de)serialisation of search requests, snapshot
//!   files and the summary manifest.
//! * [reqwest] is used to talk to the search backend's HTTP API.
//! * [IndexMap](indexmap) provides the insertion-ordered mappings that keep
//!   snapshot files stable between runs.
//! * [csv] writes the tabular snapshot form.
//! * [flate2] compresses long-term retention archives.

pub mod archive;
pub mod backend;
pub mod catalog;
pub mod cli;
pub mod derived;
pub mod error;
pub mod filter;
pub mod models;
pub mod paths;
pub mod run;
pub mod snapshot;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
