//! Summit and via ferrata extraction from OSM PBF extracts.

use std::path::{Path, PathBuf};

use geo::Coord;
use log::{info, warn};
use osmpbf::{Element, ElementReader};
use summit_core::{RouteSegment, RouteSegmentSource, Summit, SummitSource, is_valid_location};
use thiserror::Error;

mod ids;
mod segments;
mod summits;
mod tags;

use segments::SegmentAccumulator;
use summits::SummitAccumulator;

/// Raw OSM element counts seen while scanning a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OsmScanSummary {
    /// Number of nodes, including dense-node entries.
    pub nodes: u64,
    /// Number of ways.
    pub ways: u64,
}

impl OsmScanSummary {
    fn combine(self, other: Self) -> Self {
        Self {
            nodes: self.nodes + other.nodes,
            ways: self.ways + other.ways,
        }
    }

    fn record_node(&mut self) {
        self.nodes += 1;
    }

    fn record_way(&mut self) {
        self.ways += 1;
    }
}

/// Outcome of a summit extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct SummitReport {
    /// Element counts.
    pub summary: OsmScanSummary,
    /// Extracted summits ordered by id.
    pub summits: Vec<Summit>,
    /// Peaks dropped for a missing or non-numeric `ele` tag.
    pub missing_elevation: u64,
    /// Peaks dropped for an invalid position.
    pub invalid_location: u64,
    /// Peaks dropped because their OSM id cannot be encoded.
    pub invalid_id: u64,
}

/// Outcome of a via ferrata extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegmentReport {
    /// Element counts.
    pub summary: OsmScanSummary,
    /// Extracted segments ordered by id.
    pub segments: Vec<RouteSegment>,
    /// Via ferrata ways without a single resolvable vertex.
    pub dropped_ways: u64,
    /// Node references that never resolved to a coordinate.
    pub unresolved_nodes: usize,
}

/// Errors returned when reading an OSM PBF file.
#[derive(Debug, Error)]
pub enum OsmLoadError {
    /// The file could not be opened.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        /// Underlying reader error.
        #[source]
        source: osmpbf::Error,
        /// Offending path.
        path: PathBuf,
    },
    /// The file could not be decoded.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        /// Underlying decoder error.
        #[source]
        source: osmpbf::Error,
        /// Offending path.
        path: PathBuf,
    },
}

type FileReader = ElementReader<std::io::BufReader<std::fs::File>>;

fn open_reader(path: &Path) -> Result<FileReader, OsmLoadError> {
    ElementReader::from_path(path).map_err(|source| OsmLoadError::Open {
        source,
        path: path.to_path_buf(),
    })
}

/// Extract every `natural=peak` node with a numeric elevation.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use summit_data::load_summits_from_pbf;
///
/// # fn main() -> Result<(), summit_data::OsmLoadError> {
/// let report = load_summits_from_pbf(Path::new("alps.osm.pbf"))?;
/// println!("Loaded {} summits", report.summits.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`OsmLoadError`] when the file cannot be opened or decoded.
pub fn load_summits_from_pbf(path: &Path) -> Result<SummitReport, OsmLoadError> {
    let reader = open_reader(path)?;
    let accumulator = reader
        .par_map_reduce(
            |element| {
                let mut accumulator = SummitAccumulator::default();
                accumulator.process_element(element);
                accumulator
            },
            SummitAccumulator::default,
            SummitAccumulator::combine,
        )
        .map_err(|source| OsmLoadError::Decode {
            source,
            path: path.to_path_buf(),
        })?;
    let report = accumulator.into_report();
    if report.missing_elevation > 0 {
        warn!(
            "Skipped {} peaks without a numeric elevation",
            report.missing_elevation
        );
    }
    if report.invalid_id > 0 {
        warn!("Skipped {} peaks with unencodable ids", report.invalid_id);
    }
    Ok(report)
}

/// Extract every `highway=via_ferrata` way with at least one resolved vertex.
///
/// The file is read twice: a parallel pass collects the ways and a second
/// pass resolves their node coordinates.
///
/// # Errors
///
/// Returns [`OsmLoadError`] when the file cannot be opened or decoded.
pub fn load_route_segments_from_pbf(path: &Path) -> Result<RouteSegmentReport, OsmLoadError> {
    let reader = open_reader(path)?;
    let accumulator = reader
        .par_map_reduce(
            |element| {
                let mut accumulator = SegmentAccumulator::default();
                accumulator.process_element(element);
                accumulator
            },
            SegmentAccumulator::default,
            SegmentAccumulator::combine,
        )
        .map_err(|source| OsmLoadError::Decode {
            source,
            path: path.to_path_buf(),
        })?;

    let mut resolver = accumulator.into_node_resolver();
    if resolver.has_pending_nodes() {
        open_reader(path)?
            .for_each(|element| match element {
                Element::Node(node) => {
                    resolver.resolve(node.id(), node.lon(), node.lat());
                }
                Element::DenseNode(node) => {
                    resolver.resolve(node.id(), node.lon(), node.lat());
                }
                Element::Way(_) | Element::Relation(_) => {}
            })
            .map_err(|source| OsmLoadError::Decode {
                source,
                path: path.to_path_buf(),
            })?;
        if resolver.has_pending_nodes() {
            warn!(
                "Skipped {} via ferrata node references without coordinates",
                resolver.pending_node_count()
            );
        }
    }

    Ok(resolver.into_report())
}

/// Summit and route-segment source backed by a PBF file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsmPbfSource {
    path: PathBuf,
}

impl OsmPbfSource {
    /// Read from the extract at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The extract this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SummitSource for OsmPbfSource {
    type Error = OsmLoadError;

    fn load_summits(&self) -> Result<Vec<Summit>, Self::Error> {
        info!("Loading summits from {}", self.path.display());
        let report = load_summits_from_pbf(&self.path)?;
        info!(
            "Loaded {} summits from {} nodes",
            report.summits.len(),
            report.summary.nodes
        );
        Ok(report.summits)
    }
}

impl RouteSegmentSource for OsmPbfSource {
    type Error = OsmLoadError;

    fn load_route_segments(&self) -> Result<Vec<RouteSegment>, Self::Error> {
        info!("Loading via ferrata segments from {}", self.path.display());
        let report = load_route_segments_from_pbf(&self.path)?;
        info!(
            "Loaded {} via ferrata segments from {} ways",
            report.segments.len(),
            report.summary.ways
        );
        Ok(report.segments)
    }
}

fn validated_coord(lon: f64, lat: f64) -> Option<Coord<f64>> {
    Some(Coord { x: lon, y: lat }).filter(|location| is_valid_location(*location))
}
