//! Non-interactive `find` command: one query, then exit.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use summit_core::{
    PostalCodeResolver, QueryParameters, QueryPipeline, RouteSegmentSource, SummitFilter,
};

use crate::dataset::{Dataset, DatasetConfig, DatasetEnv};
use crate::format::{OutputFormat, write_ranking};
use crate::params::{check_min_elevation, parse_country, parse_postal_code, reachability};
use crate::{
    ARG_COUNTRY, ARG_CROSS_ONLY, ARG_DOMINANCE, ARG_FORMAT, ARG_MAX_DIFFICULTY, ARG_MIN_ELEVATION,
    ARG_OSM_PBF, ARG_POSTAL_CODE, ARG_POSTAL_DIR, ARG_THRESHOLD_M, ARG_VIA_FERRATA, CliError,
    ENV_FIND_COUNTRY, ENV_FIND_MAX_DIFFICULTY, ENV_FIND_OSM_PBF, ENV_FIND_POSTAL_CODE,
    ENV_FIND_POSTAL_DIR, ENV_FIND_THRESHOLD_M,
};

const FIND_ENV: DatasetEnv = DatasetEnv {
    osm_pbf: ENV_FIND_OSM_PBF,
    postal_dir: ENV_FIND_POSTAL_DIR,
};

/// CLI arguments for the `find` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank the summits near a postal code once and print the \
                 result. Every option can also come from configuration \
                 files or SUMMIT_CMDS_FIND_* environment variables.",
    about = "Run a single summit query"
)]
#[ortho_config(prefix = "SUMMIT")]
pub(crate) struct FindArgs {
    /// Path to the OpenStreetMap PBF extract.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Directory holding GeoNames postal-code tables (`AT.txt`, ...).
    #[arg(long = ARG_POSTAL_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) postal_dir: Option<Utf8PathBuf>,
    /// ISO country code of the start, e.g. `AT`.
    #[arg(long = ARG_COUNTRY, value_name = "code")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Postal code of the start.
    #[arg(long = ARG_POSTAL_CODE, value_name = "code")]
    #[serde(default)]
    pub(crate) postal_code: Option<String>,
    /// Minimum summit elevation in metres (default 0).
    #[arg(long = ARG_MIN_ELEVATION, value_name = "metres")]
    #[serde(default)]
    pub(crate) min_elevation: Option<f64>,
    /// Keep only summits with a cross.
    #[arg(
        long = ARG_CROSS_ONLY,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) cross_only: Option<bool>,
    /// Rank the nearest summits by dominance.
    #[arg(
        long = ARG_DOMINANCE,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) dominance: Option<bool>,
    /// Keep only summits near an acceptable via ferrata.
    #[arg(
        long = ARG_VIA_FERRATA,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) via_ferrata: Option<bool>,
    /// Maximum summit-to-via-ferrata distance in metres.
    #[arg(long = ARG_THRESHOLD_M, value_name = "metres")]
    #[serde(default)]
    pub(crate) threshold_m: Option<f64>,
    /// Hardest acceptable `via_ferrata_scale` rating (0-6).
    #[arg(long = ARG_MAX_DIFFICULTY, value_name = "scale")]
    #[serde(default)]
    pub(crate) max_difficulty: Option<i32>,
    /// Output format.
    #[arg(long = ARG_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl FindArgs {
    pub(crate) fn into_config(self) -> Result<FindConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FindConfig::try_from(merged)
    }
}

/// Resolved `find` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FindConfig {
    pub(crate) dataset: DatasetConfig,
    pub(crate) params: QueryParameters,
    pub(crate) format: OutputFormat,
}

impl TryFrom<FindArgs> for FindConfig {
    type Error = CliError;

    fn try_from(args: FindArgs) -> Result<Self, Self::Error> {
        let dataset = DatasetConfig::from_options(args.osm_pbf, args.postal_dir, None, FIND_ENV)?;
        let country = args.country.ok_or(CliError::MissingArgument {
            field: ARG_COUNTRY,
            env: ENV_FIND_COUNTRY,
        })?;
        let postal_code = args.postal_code.ok_or(CliError::MissingArgument {
            field: ARG_POSTAL_CODE,
            env: ENV_FIND_POSTAL_CODE,
        })?;
        let min_elevation = args.min_elevation.map_or(Ok(0.0), check_min_elevation)?;
        let constraints = if args.via_ferrata.unwrap_or(false) {
            let threshold_m = args.threshold_m.ok_or(CliError::MissingArgument {
                field: ARG_THRESHOLD_M,
                env: ENV_FIND_THRESHOLD_M,
            })?;
            let max_difficulty = args.max_difficulty.ok_or(CliError::MissingArgument {
                field: ARG_MAX_DIFFICULTY,
                env: ENV_FIND_MAX_DIFFICULTY,
            })?;
            Some(reachability(threshold_m, max_difficulty)?)
        } else {
            None
        };
        Ok(Self {
            dataset,
            params: QueryParameters {
                country: parse_country(&country)?,
                postal_code: parse_postal_code(&postal_code)?,
                filter: SummitFilter {
                    min_elevation,
                    cross_only: args.cross_only.unwrap_or(false),
                    dominance: args.dominance.unwrap_or(false),
                },
                reachability: constraints,
            },
            format: args.format.unwrap_or_default(),
        })
    }
}

pub(crate) fn run_find(args: FindArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.dataset.validate_sources()?;
    let dataset = Dataset::open(&config.dataset)?;
    let pipeline = QueryPipeline::new(&dataset.store);
    let mut stdout = std::io::stdout().lock();
    execute_find(
        &pipeline,
        &dataset.resolver,
        &config.params,
        config.format,
        &mut stdout,
    )
}

/// Run one query and write its ranking; every query error is fatal here.
pub(crate) fn execute_find<S, P>(
    pipeline: &QueryPipeline<'_, S>,
    resolver: &P,
    params: &QueryParameters,
    format: OutputFormat,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RouteSegmentSource,
    P: PostalCodeResolver + ?Sized,
{
    let ranking = pipeline.execute(params, resolver)?;
    write_ranking(writer, &ranking, format)
}

#[cfg(test)]
pub(crate) fn find_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FindConfig, CliError> {
    let merged = FindArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FindConfig::try_from(merged)
}
