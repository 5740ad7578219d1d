//! Decide whether a summit lies near a via ferrata of acceptable difficulty.
//!
//! Proximity is tested against segment vertices only. A summit counts as
//! reachable when any vertex of a qualifying segment lies within the
//! threshold; the test does not project onto the lines between vertices.
//! This vertex sampling is the intended approximation.

use geo::Coord;
use rstar::{AABB, RTree, RTreeObject};
use thiserror::Error;

use crate::distance::distance_m;
use crate::segment::rating_is_passable;
use crate::{RouteSegment, Summit};

/// Highest rating on the OSM `via_ferrata_scale`.
pub const MAX_VIA_FERRATA_SCALE: i32 = 6;

/// Reachability constraints for a single query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachabilityFilter {
    /// Maximum summit-to-vertex distance in metres.
    pub threshold_m: f64,
    /// Hardest acceptable `via_ferrata_scale` rating.
    pub max_difficulty: i32,
}

/// Errors returned by [`ReachabilityFilter::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReachabilityFilterError {
    /// The distance threshold was negative or not finite.
    #[error("distance threshold must be a non-negative number of metres, got {threshold_m}")]
    InvalidThreshold {
        /// Rejected threshold.
        threshold_m: f64,
    },
    /// The difficulty lies outside the `via_ferrata_scale`.
    #[error(
        "maximum difficulty must be between 0 and {MAX_VIA_FERRATA_SCALE}, got {max_difficulty}"
    )]
    DifficultyOutOfRange {
        /// Rejected difficulty.
        max_difficulty: i32,
    },
}

impl ReachabilityFilter {
    /// Validates and constructs a [`ReachabilityFilter`].
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite thresholds and difficulties outside
    /// `0..=6`.
    pub fn new(threshold_m: f64, max_difficulty: i32) -> Result<Self, ReachabilityFilterError> {
        if !threshold_m.is_finite() || threshold_m < 0.0 {
            return Err(ReachabilityFilterError::InvalidThreshold { threshold_m });
        }
        if !(0..=MAX_VIA_FERRATA_SCALE).contains(&max_difficulty) {
            return Err(ReachabilityFilterError::DifficultyOutOfRange {
                max_difficulty,
            });
        }
        Ok(Self {
            threshold_m,
            max_difficulty,
        })
    }
}

/// Linear reachability test over every segment and vertex.
///
/// Returns true on the first vertex of a passable segment within
/// `threshold_m` metres of the summit.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use summit_core::{RouteSegment, Summit, is_reachable};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let summit = Summit::new(1, Coord { x: 11.0, y: 47.0 }, 2000.0)?;
/// let segment = RouteSegment::new(2, vec![Coord { x: 11.0, y: 47.0005 }], Some(3))?;
/// assert!(is_reachable(&summit, &[segment.clone()], 3, 100.0));
/// assert!(!is_reachable(&summit, &[segment], 2, 100.0));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn is_reachable(
    summit: &Summit,
    segments: &[RouteSegment],
    max_difficulty: i32,
    threshold_m: f64,
) -> bool {
    segments
        .iter()
        .filter(|segment| segment.is_passable(max_difficulty))
        .any(|segment| {
            segment
                .points
                .iter()
                .any(|vertex| distance_m(summit.location, *vertex) <= threshold_m)
        })
}

#[derive(Debug, Clone, Copy)]
struct IndexedVertex {
    location: Coord<f64>,
    difficulty: Option<i32>,
}

impl IndexedVertex {
    fn qualifies(&self, origin: Coord<f64>, filter: &ReachabilityFilter) -> bool {
        rating_is_passable(self.difficulty, filter.max_difficulty)
            && distance_m(origin, self.location) <= filter.threshold_m
    }
}

impl RTreeObject for IndexedVertex {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}

/// R\*-tree over every segment vertex, tagged with its segment's rating.
///
/// [`SegmentVertexIndex::is_reachable`] answers exactly what
/// [`is_reachable`] answers. The tree only prunes vertices that cannot lie
/// within the threshold; survivors go through the same geodesic test.
#[derive(Debug)]
pub struct SegmentVertexIndex {
    tree: RTree<IndexedVertex>,
}

impl SegmentVertexIndex {
    /// Bulk-load every vertex of `segments`.
    #[must_use]
    pub fn build(segments: &[RouteSegment]) -> Self {
        let vertices = segments
            .iter()
            .flat_map(|segment| {
                segment.points.iter().map(|location| IndexedVertex {
                    location: *location,
                    difficulty: segment.difficulty,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(vertices),
        }
    }

    /// Number of indexed vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true when no vertex was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indexed equivalent of [`is_reachable`] for `summit`.
    #[must_use]
    pub fn is_reachable(&self, summit: &Summit, filter: &ReachabilityFilter) -> bool {
        let origin = summit.location;
        match search_envelope(origin, filter.threshold_m) {
            Some(envelope) => self
                .tree
                .locate_in_envelope_intersecting(&envelope)
                .any(|vertex| vertex.qualifies(origin, filter)),
            None => self
                .tree
                .iter()
                .any(|vertex| vertex.qualifies(origin, filter)),
        }
    }
}

/// WGS84 equatorial radius; the smallest prime-vertical radius of curvature.
const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;
/// Meridional radius of curvature at the equator, rounded down.
const WGS84_EQUATORIAL_MERIDIONAL_M: f64 = 6_335_439.0;
/// Relative padding applied to the envelope half-widths.
const ENVELOPE_PADDING: f64 = 1.000_001;

/// Lon/lat box containing every point within `threshold_m` of `origin`.
///
/// Returns `None` when the box would touch a pole or cross the antimeridian;
/// callers then fall back to a full scan.
#[expect(
    clippy::float_arithmetic,
    reason = "envelope bounds derive from ellipsoid radii"
)]
fn search_envelope(origin: Coord<f64>, threshold_m: f64) -> Option<AABB<[f64; 2]>> {
    // A path of length d spans at most d / M radians of latitude, and at most
    // d / (N cos φ) radians of longitude at the path's highest latitude φ.
    let half_lat = (threshold_m / WGS84_EQUATORIAL_MERIDIONAL_M).to_degrees() * ENVELOPE_PADDING;
    let max_lat = origin.y.abs() + half_lat;
    if max_lat >= 90.0 {
        return None;
    }
    let cos_max_lat = max_lat.to_radians().cos();
    let half_lon =
        (threshold_m / (WGS84_SEMI_MAJOR_M * cos_max_lat)).to_degrees() * ENVELOPE_PADDING;
    let min_lon = origin.x - half_lon;
    let max_lon = origin.x + half_lon;
    if !half_lon.is_finite() || min_lon < -180.0 || max_lon > 180.0 {
        return None;
    }
    Some(AABB::from_corners(
        [min_lon, origin.y - half_lat],
        [max_lon, origin.y + half_lat],
    ))
}
