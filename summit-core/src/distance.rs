//! Geodesic distances on the WGS84 ellipsoid.
//!
//! Ranking, dominance and reachability all measure through these helpers so
//! that thresholds and rankings share one model.

use geo::{Coord, Distance, Geodesic, Point};

/// Metres in one kilometre.
pub const METRES_PER_KM: f64 = 1_000.0;

/// Geodesic distance between two WGS84 coordinates in metres.
///
/// Symmetric and zero for identical points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use summit_core::distance::distance_m;
///
/// let a = Coord { x: 11.0, y: 47.0 };
/// assert_eq!(distance_m(a, a), 0.0);
/// ```
#[must_use]
pub fn distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Geodesic.distance(Point::from(a), Point::from(b))
}

/// Geodesic distance between two WGS84 coordinates in kilometres.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "unit conversion from metres to kilometres"
)]
pub fn distance_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    distance_m(a, b) / METRES_PER_KM
}
