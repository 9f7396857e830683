//! This file defines the catalog-stats binary entry point.

use std::error::Error;

use catalog_stats::archive;
use catalog_stats::backend::SearchBackend;
use catalog_stats::cli;
use catalog_stats::error::StatsError;
use catalog_stats::paths::DataPaths;
use catalog_stats::run;
use catalog_stats::tracing;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    if let Err(error) = execute(&args).await {
        report(&error);
        std::process::exit(error.exit_code());
    }
}

/// Run the selected subcommand.
async fn execute(args: &cli::CommandLineArgs) -> Result<(), StatsError> {
    let paths = DataPaths::new(&args.data_dir);
    match &args.command {
        cli::Command::Build { filters, output } => {
            let api_key = args.api_key.as_deref().ok_or(StatsError::MissingConfig {
                name: "CDIAPI_ELASTIC_KEY",
            })?;
            let index = args.index.as_deref().ok_or(StatsError::MissingConfig {
                name: "CDIAPI_ELASTIC_INDEX",
            })?;
            let backend = SearchBackend::new(args.host.clone(), api_key, index);
            let summary = run::build_stats(
                &backend,
                &paths,
                index,
                filters.as_deref(),
                output.as_deref(),
                args.agg_size,
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        cli::Command::Retain => {
            archive::archive_retention(&paths)?;
        }
    }
    Ok(())
}

/// Print a fatal error and its cause chain to the error stream.
fn report(error: &StatsError) {
    eprintln!("Error: {}", error);
    let mut current = error.source();
    while let Some(source) = current {
        eprintln!("Caused by: {}", source);
        current = source.source();
    }
}
