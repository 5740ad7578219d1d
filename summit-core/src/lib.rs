//! Core domain types and query logic for the summit finder.
//!
//! The crate models summits and via ferrata segments, measures geodesic
//! distances, and ranks summits around a start point. Map extraction and
//! postal code lookup live in `summit-data`; everything here works on
//! in-memory collections behind the [`SummitSource`],
//! [`RouteSegmentSource`] and [`PostalCodeResolver`] seams.

mod dataset;
pub mod distance;
mod dominance;
mod query;
mod reachability;
mod segment;
mod summit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use dataset::{DatasetStore, RouteSegmentSource, SegmentCache, SegmentSet, SummitSource};
pub use dominance::{dominance_km, dominance_m};
pub use query::{
    CollaboratorError, DOMINANCE_LIMIT, NEAREST_LIMIT, PostalCodeResolver, QueryError,
    QueryParameters, QueryPipeline, RankedResult, Ranking, RankingOrder, StageCounts, StartPoint,
    SummitFilter, base_filter, filter_reachable, rank_by_proximity,
};
pub use reachability::{
    MAX_VIA_FERRATA_SCALE, ReachabilityFilter, ReachabilityFilterError, SegmentVertexIndex,
    is_reachable,
};
pub use segment::{RouteSegment, RouteSegmentError};
pub use summit::{Summit, SummitError, UNNAMED_SUMMIT, is_valid_location};
