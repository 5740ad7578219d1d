//! Dataset configuration shared by every subcommand.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::info;
use summit_core::DatasetStore;
use summit_data::{GeoNamesPostalResolver, OsmPbfSource};

use crate::{ARG_OSM_PBF, ARG_POSTAL_DIR, CliError};

/// Environment variables that can supply the dataset paths of one subcommand.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DatasetEnv {
    pub(crate) osm_pbf: &'static str,
    pub(crate) postal_dir: &'static str,
}

/// Resolved map and postal data locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DatasetConfig {
    /// OSM PBF extract holding summits and via ferratas.
    pub(crate) osm_pbf: Utf8PathBuf,
    /// Directory of GeoNames `<CC>.txt` postal tables.
    pub(crate) postal_dir: Utf8PathBuf,
    /// Load via ferrata segments at startup instead of on first use.
    pub(crate) preload_segments: bool,
}

impl DatasetConfig {
    pub(crate) fn from_options(
        osm_pbf: Option<Utf8PathBuf>,
        postal_dir: Option<Utf8PathBuf>,
        preload_segments: Option<bool>,
        env: DatasetEnv,
    ) -> Result<Self, CliError> {
        Ok(Self {
            osm_pbf: osm_pbf.ok_or(CliError::MissingArgument {
                field: ARG_OSM_PBF,
                env: env.osm_pbf,
            })?,
            postal_dir: postal_dir.ok_or(CliError::MissingArgument {
                field: ARG_POSTAL_DIR,
                env: env.postal_dir,
            })?,
            preload_segments: preload_segments.unwrap_or(false),
        })
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.osm_pbf, ARG_OSM_PBF, SourceKind::File)?;
        require_existing(&self.postal_dir, ARG_POSTAL_DIR, SourceKind::Directory)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    File,
    Directory,
}

impl SourceKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }

    fn matches(self, metadata: &fs_utf8::Metadata) -> bool {
        match self {
            Self::File => metadata.is_file(),
            Self::Directory => metadata.is_dir(),
        }
    }
}

fn require_existing(
    path: &Utf8Path,
    field: &'static str,
    kind: SourceKind,
) -> Result<(), CliError> {
    match inspect(path) {
        Ok(metadata) if kind.matches(&metadata) => Ok(()),
        Ok(_) => Err(CliError::SourcePathWrongKind {
            field,
            path: path.to_path_buf(),
            expected: kind.as_str(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Metadata for `path`, read through a capability handle on its parent.
fn inspect(path: &Utf8Path) -> io::Result<fs_utf8::Metadata> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should name a file or directory"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name)
}

/// Loaded summits plus the postal-code resolver.
#[derive(Debug)]
pub(crate) struct Dataset {
    pub(crate) store: DatasetStore<OsmPbfSource>,
    pub(crate) resolver: GeoNamesPostalResolver,
}

impl Dataset {
    /// Open the postal tables, then load summits and optionally segments.
    ///
    /// Any failure here is fatal: without summits there is nothing to query.
    pub(crate) fn open(config: &DatasetConfig) -> Result<Self, CliError> {
        let resolver = GeoNamesPostalResolver::open(&config.postal_dir)?;
        let source = OsmPbfSource::new(config.osm_pbf.as_std_path());
        let store = DatasetStore::load(&source, source.clone()).map_err(CliError::LoadSummits)?;
        if config.preload_segments {
            let count = store
                .preload_route_segments()
                .map_err(CliError::PreloadSegments)?;
            info!("Preloaded {count} via ferrata segments");
        }
        Ok(Self { store, resolver })
    }
}
