//! Map and postal-code data access for the summit finder.
//!
//! Responsibilities:
//! - Extract summits and via ferrata segments from OSM PBF extracts.
//! - Resolve postal codes from local GeoNames tables.
//!
//! Boundaries:
//! - Query rules live in `summit-core`; this crate only implements its
//!   source and resolver traits.

mod osm;
mod postal;

pub use osm::{
    OsmLoadError, OsmPbfSource, OsmScanSummary, RouteSegmentReport, SummitReport,
    load_route_segments_from_pbf, load_summits_from_pbf,
};
pub use postal::{GeoNamesPostalResolver, PostalLookupError};
