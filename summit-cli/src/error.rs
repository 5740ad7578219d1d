//! Error types emitted by the summit CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use summit_core::{QueryError, ReachabilityFilterError};
use summit_data::{OsmLoadError, PostalLookupError};
use thiserror::Error;

/// Errors emitted by the summit CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but has the wrong kind.
    #[error("{field} path {path:?} exists but is not a {expected}")]
    SourcePathWrongKind {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Expected kind, `file` or `directory`.
        expected: &'static str,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Loading summits from the map data failed.
    #[error("failed to load summits: {0}")]
    LoadSummits(#[source] OsmLoadError),
    /// Preloading via ferrata segments failed.
    #[error("failed to preload via ferrata segments: {0}")]
    PreloadSegments(#[source] OsmLoadError),
    /// The postal code directory could not be opened.
    #[error(transparent)]
    OpenPostalTables(#[from] PostalLookupError),
    /// A query failed.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// A query parameter was invalid.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// Serialising JSON output failed.
    #[error("failed to serialise ranking: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Io(#[source] std::io::Error),
    /// Reading an answer from the prompt input failed.
    #[error("failed to read input: {0}")]
    ReadInput(#[source] std::io::Error),
}

/// A query parameter that could not be used.
///
/// Raised both by the interactive prompts and by `find` flags. The field
/// name is the prompt label or flag that supplied the value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// The value did not parse as the expected type.
    #[error("invalid {field}: {value:?} is not {expected}")]
    Unparsable {
        /// Parameter that failed.
        field: &'static str,
        /// Raw input.
        value: String,
        /// Human-readable description of the accepted input.
        expected: &'static str,
    },
    /// The value parsed but lies outside the accepted range.
    #[error("invalid {field}: {source}")]
    OutOfRange {
        /// Parameter that failed.
        field: &'static str,
        /// Validation error from the query engine.
        #[source]
        source: ReachabilityFilterError,
    },
    /// A required text field was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Parameter that failed.
        field: &'static str,
    },
}
