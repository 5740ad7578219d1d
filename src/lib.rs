//! Facade crate for the summit finder.
//!
//! This crate re-exports the query engine and, behind the `osm` feature, the
//! OSM PBF loader and GeoNames postal-code resolver.

#![forbid(unsafe_code)]

pub use summit_core::{
    DOMINANCE_LIMIT, DatasetStore, MAX_VIA_FERRATA_SCALE, NEAREST_LIMIT, PostalCodeResolver,
    QueryError, QueryParameters, QueryPipeline, RankedResult, Ranking, RankingOrder,
    ReachabilityFilter, RouteSegment, RouteSegmentSource, StartPoint, Summit, SummitFilter,
    SummitSource,
};

#[cfg(feature = "osm")]
pub use summit_data::{GeoNamesPostalResolver, OsmLoadError, OsmPbfSource, PostalLookupError};
