//! Topographic isolation ("dominance") of a summit.

use crate::Summit;
use crate::distance::{METRES_PER_KM, distance_m};

/// Distance in metres from `summit` to the nearest strictly higher summit.
///
/// `all` must be the complete dataset: isolation is a property of the
/// terrain, not of the current query's candidates. Equal elevations never
/// count as higher. Returns `f64::INFINITY` when nothing is higher.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use summit_core::{Summit, dominance_m};
///
/// # fn main() -> Result<(), summit_core::SummitError> {
/// let low = Summit::new(1, Coord { x: 11.0, y: 47.0 }, 2000.0)?;
/// let high = Summit::new(2, Coord { x: 11.1, y: 47.0 }, 2500.0)?;
/// let all = [low.clone(), high.clone()];
/// assert!(dominance_m(&low, &all).is_finite());
/// assert_eq!(dominance_m(&high, &all), f64::INFINITY);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn dominance_m(summit: &Summit, all: &[Summit]) -> f64 {
    all.iter()
        .filter(|other| other.elevation > summit.elevation)
        .map(|other| distance_m(summit.location, other.location))
        .fold(f64::INFINITY, f64::min)
}

/// [`dominance_m`] expressed in kilometres.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "unit conversion from metres to kilometres"
)]
pub fn dominance_km(summit: &Summit, all: &[Summit]) -> f64 {
    dominance_m(summit, all) / METRES_PER_KM
}
