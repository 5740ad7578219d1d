//! Mountain summits extracted from map data.

use geo::Coord;
use thiserror::Error;

/// Display name used when a summit carries no `name` tag.
pub const UNNAMED_SUMMIT: &str = "<unnamed>";

/// A mountain peak with a known elevation.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Every
/// summit built through [`Summit::new`] has a finite elevation and a position
/// inside the valid longitude/latitude ranges.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use summit_core::Summit;
///
/// # fn main() -> Result<(), summit_core::SummitError> {
/// let summit = Summit::new(1, Coord { x: 11.39, y: 47.07 }, 2334.0)?
///     .with_name("Serles")
///     .with_cross(true);
/// assert_eq!(summit.name, "Serles");
/// assert!(summit.has_cross);
/// assert_eq!(summit.prominence, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summit {
    /// Encoded OSM element identifier.
    pub id: u64,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Elevation above sea level in metres.
    pub elevation: f64,
    /// Display name, [`UNNAMED_SUMMIT`] when untagged.
    pub name: String,
    /// Whether a summit cross is mapped on the peak.
    pub has_cross: bool,
    /// Topographic prominence in metres, when tagged.
    pub prominence: Option<f64>,
}

/// Errors returned by [`Summit::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummitError {
    /// The elevation was NaN or infinite.
    #[error("summit elevation must be a finite number, got {elevation}")]
    InvalidElevation {
        /// Rejected elevation value.
        elevation: f64,
    },
    /// The position lies outside the WGS84 coordinate ranges.
    #[error("summit position ({lon}, {lat}) is not a valid WGS84 coordinate")]
    InvalidLocation {
        /// Rejected longitude.
        lon: f64,
        /// Rejected latitude.
        lat: f64,
    },
}

impl Summit {
    /// Validates and constructs an unnamed summit without a cross.
    ///
    /// # Errors
    ///
    /// Returns [`SummitError::InvalidElevation`] for non-finite elevations
    /// and [`SummitError::InvalidLocation`] for coordinates outside
    /// `[-180, 180] x [-90, 90]`.
    pub fn new(id: u64, location: Coord<f64>, elevation: f64) -> Result<Self, SummitError> {
        if !elevation.is_finite() {
            return Err(SummitError::InvalidElevation { elevation });
        }
        if !is_valid_location(location) {
            return Err(SummitError::InvalidLocation {
                lon: location.x,
                lat: location.y,
            });
        }
        Ok(Self {
            id,
            location,
            elevation,
            name: UNNAMED_SUMMIT.to_owned(),
            has_cross: false,
            prominence: None,
        })
    }

    /// Replace the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set whether the summit carries a cross.
    #[must_use]
    pub const fn with_cross(mut self, has_cross: bool) -> Self {
        self.has_cross = has_cross;
        self
    }

    /// Attach a prominence value in metres.
    #[must_use]
    pub const fn with_prominence(mut self, prominence: Option<f64>) -> Self {
        self.prominence = prominence;
        self
    }
}

/// Returns true when `location` is finite and inside the WGS84 ranges.
#[must_use]
pub fn is_valid_location(location: Coord<f64>) -> bool {
    location.x.is_finite()
        && location.y.is_finite()
        && (-180.0..=180.0).contains(&location.x)
        && (-90.0..=90.0).contains(&location.y)
}
