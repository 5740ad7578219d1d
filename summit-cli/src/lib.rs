//! Command-line interface for the summit finder.
//!
//! `summit query` runs the interactive prompt loop; `summit find` answers a
//! single query from flags. Both load the OSM extract and postal tables
//! named by layered configuration (flags, `SUMMIT_*` environment variables
//! and configuration files).
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use summit_core::QueryPipeline;

mod dataset;
mod error;
mod find;
mod format;
mod params;
mod prompt;

use dataset::{Dataset, DatasetConfig, DatasetEnv};
pub use error::{CliError, ParameterError};
use find::FindArgs;
pub use format::OutputFormat;

const ARG_OSM_PBF: &str = "osm-pbf";
const ARG_POSTAL_DIR: &str = "postal-dir";
const ARG_PRELOAD_SEGMENTS: &str = "preload-segments";
const ARG_COUNTRY: &str = "country";
const ARG_POSTAL_CODE: &str = "postal-code";
const ARG_MIN_ELEVATION: &str = "min-elevation";
const ARG_CROSS_ONLY: &str = "cross-only";
const ARG_DOMINANCE: &str = "dominance";
const ARG_VIA_FERRATA: &str = "via-ferrata";
const ARG_THRESHOLD_M: &str = "threshold-m";
const ARG_MAX_DIFFICULTY: &str = "max-difficulty";
const ARG_FORMAT: &str = "format";
const ENV_QUERY_OSM_PBF: &str = "SUMMIT_CMDS_QUERY_OSM_PBF";
const ENV_QUERY_POSTAL_DIR: &str = "SUMMIT_CMDS_QUERY_POSTAL_DIR";
const ENV_FIND_OSM_PBF: &str = "SUMMIT_CMDS_FIND_OSM_PBF";
const ENV_FIND_POSTAL_DIR: &str = "SUMMIT_CMDS_FIND_POSTAL_DIR";
const ENV_FIND_COUNTRY: &str = "SUMMIT_CMDS_FIND_COUNTRY";
const ENV_FIND_POSTAL_CODE: &str = "SUMMIT_CMDS_FIND_POSTAL_CODE";
const ENV_FIND_THRESHOLD_M: &str = "SUMMIT_CMDS_FIND_THRESHOLD_M";
const ENV_FIND_MAX_DIFFICULTY: &str = "SUMMIT_CMDS_FIND_MAX_DIFFICULTY";

const QUERY_ENV: DatasetEnv = DatasetEnv {
    osm_pbf: ENV_QUERY_OSM_PBF,
    postal_dir: ENV_QUERY_POSTAL_DIR,
};

/// Run the summit CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when configuration is incomplete, the dataset cannot
/// be loaded or a query fails irrecoverably.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Query(args) => run_query(args),
        Command::Find(args) => find::run_find(args),
    }
}

fn run_query(args: QueryArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let dataset = Dataset::open(&config)?;
    let pipeline = QueryPipeline::new(&dataset.store);
    prompt::run_session(
        std::io::stdin().lock(),
        std::io::stdout().lock(),
        &pipeline,
        &dataset.resolver,
    )
}

#[derive(Debug, Parser)]
#[command(
    name = "summit",
    about = "Find mountain summits near a postal code in OpenStreetMap data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer summit queries interactively until input ends.
    Query(QueryArgs),
    /// Answer a single summit query given as flags.
    Find(FindArgs),
}

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load an OSM extract once, then prompt for queries. Paths \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Answer summit queries interactively"
)]
#[ortho_config(prefix = "SUMMIT")]
struct QueryArgs {
    /// Path to the OpenStreetMap PBF extract.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    osm_pbf: Option<Utf8PathBuf>,
    /// Directory holding GeoNames postal-code tables (`AT.txt`, ...).
    #[arg(long = ARG_POSTAL_DIR, value_name = "dir")]
    #[serde(default)]
    postal_dir: Option<Utf8PathBuf>,
    /// Load via ferrata segments at startup instead of on first use.
    #[arg(
        long = ARG_PRELOAD_SEGMENTS,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    preload_segments: Option<bool>,
}

impl QueryArgs {
    fn into_config(self) -> Result<DatasetConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DatasetConfig::try_from(merged)
    }
}

impl TryFrom<QueryArgs> for DatasetConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        Self::from_options(
            args.osm_pbf,
            args.postal_dir,
            args.preload_segments,
            QUERY_ENV,
        )
    }
}

#[cfg(test)]
fn query_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<DatasetConfig, CliError> {
    let merged = QueryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    DatasetConfig::try_from(merged)
}

#[cfg(test)]
mod tests;
