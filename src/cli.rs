//! Command Line Interface (CLI) arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

/// Catalog statistics command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// API key used to authenticate against the search backend
    #[arg(long, env = "CDIAPI_ELASTIC_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Name of the search index holding the catalog records
    #[arg(long, env = "CDIAPI_ELASTIC_INDEX")]
    pub index: Option<String>,
    /// Base URL of the search backend
    #[arg(long, default_value = "https://es.dateno.io", env = "CDI_ELASTIC_HOST")]
    pub host: Url,
    /// Root of the data directory holding current and archived snapshots
    #[arg(long, default_value = "data", env = "CDI_STATS_DATA_DIR")]
    pub data_dir: PathBuf,
    /// Upper bound on the number of distinct groups returned per aggregation
    #[arg(long, default_value_t = 10_000, env = "CDI_STATS_AGG_SIZE")]
    pub agg_size: usize,
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Archive the previous snapshots, run all aggregations and write new ones
    Build {
        /// Optional filters in form field=value;another.field=value
        #[arg(long, short)]
        filters: Option<String>,
        /// Path to store the aggregated statistics JSON summary
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Copy current snapshots into a compressed day-granularity archive slot
    Retain,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
