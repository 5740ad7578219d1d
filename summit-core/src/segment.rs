//! Climbing-route (via ferrata) segments.

use geo::Coord;
use thiserror::Error;

/// An OSM way tagged as a via ferrata, reduced to its resolved vertices.
///
/// `difficulty` mirrors the `via_ferrata_scale` tag. A segment without a
/// usable rating is passable at every requested maximum difficulty.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use summit_core::RouteSegment;
///
/// # fn main() -> Result<(), summit_core::RouteSegmentError> {
/// let segment = RouteSegment::new(1, vec![Coord { x: 11.0, y: 47.0 }], Some(3))?;
/// assert!(!segment.is_passable(2));
/// assert!(segment.is_passable(3));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSegment {
    /// Encoded OSM element identifier.
    pub id: u64,
    /// Ordered vertices, never empty.
    pub points: Vec<Coord<f64>>,
    /// Difficulty on the `via_ferrata_scale`, when tagged.
    pub difficulty: Option<i32>,
}

/// Errors returned by [`RouteSegment::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteSegmentError {
    /// No vertices were supplied.
    #[error("route segment {id} has no valid coordinates")]
    Empty {
        /// Identifier of the rejected segment.
        id: u64,
    },
}

impl RouteSegment {
    /// Validates and constructs a [`RouteSegment`].
    ///
    /// # Errors
    ///
    /// Returns [`RouteSegmentError::Empty`] when `points` is empty.
    pub fn new(
        id: u64,
        points: Vec<Coord<f64>>,
        difficulty: Option<i32>,
    ) -> Result<Self, RouteSegmentError> {
        if points.is_empty() {
            return Err(RouteSegmentError::Empty { id });
        }
        Ok(Self {
            id,
            points,
            difficulty,
        })
    }

    /// Returns true when the segment may be used at `max_difficulty`.
    ///
    /// Untagged segments always qualify.
    #[must_use]
    pub fn is_passable(&self, max_difficulty: i32) -> bool {
        rating_is_passable(self.difficulty, max_difficulty)
    }
}

/// Returns true when a rating of `difficulty` is acceptable at
/// `max_difficulty`. A missing rating is always acceptable.
pub(crate) fn rating_is_passable(difficulty: Option<i32>, max_difficulty: i32) -> bool {
    difficulty.is_none_or(|rating| rating <= max_difficulty)
}
