//! Test helpers shared by unit tests and dependent crates.
//!
//! Enabled for this crate's tests and, for downstream crates, through the
//! `test-support` feature.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::{Coord, Destination, Geodesic, Point};
use thiserror::Error;

use crate::{PostalCodeResolver, RouteSegment, RouteSegmentSource, StartPoint, Summit};

/// Build a valid summit at `(lon, lat)`.
///
/// # Panics
///
/// Panics when the coordinates or elevation are invalid.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper with known-good inputs")]
pub fn summit(id: u64, lon: f64, lat: f64, elevation: f64) -> Summit {
    Summit::new(id, Coord { x: lon, y: lat }, elevation).expect("valid test summit")
}

/// Build a segment from `(lon, lat)` pairs.
///
/// # Panics
///
/// Panics when `points` is empty.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper with known-good inputs")]
pub fn segment(id: u64, points: &[(f64, f64)], difficulty: Option<i32>) -> RouteSegment {
    let coords = points.iter().map(|&(x, y)| Coord { x, y }).collect();
    RouteSegment::new(id, coords, difficulty).expect("non-empty test segment")
}

/// The point `metres` due north of `origin` along the ellipsoid.
#[must_use]
pub fn offset_north(origin: Coord<f64>, metres: f64) -> Coord<f64> {
    Geodesic
        .destination(Point::from(origin), 0.0, metres)
        .into()
}

/// Segment source that counts how often it is read.
#[derive(Debug, Default)]
pub struct CountingSegmentSource {
    segments: Vec<RouteSegment>,
    loads: AtomicUsize,
}

impl CountingSegmentSource {
    /// Serve `segments` on every load.
    #[must_use]
    pub const fn new(segments: Vec<RouteSegment>) -> Self {
        Self {
            segments,
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of completed loads.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl RouteSegmentSource for CountingSegmentSource {
    type Error = Infallible;

    fn load_route_segments(&self) -> Result<Vec<RouteSegment>, Self::Error> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.segments.clone())
    }
}

/// Error produced by [`FailingSegmentSource`].
#[derive(Debug, Error)]
#[error("segment source unavailable")]
pub struct SourceUnavailable;

/// Segment source whose every load fails.
#[derive(Debug, Default)]
pub struct FailingSegmentSource {
    attempts: AtomicUsize,
}

impl FailingSegmentSource {
    /// Number of attempted loads.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl RouteSegmentSource for FailingSegmentSource {
    type Error = SourceUnavailable;

    fn load_route_segments(&self) -> Result<Vec<RouteSegment>, Self::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SourceUnavailable)
    }
}

/// Resolver backed by an in-memory table.
#[derive(Debug, Default, Clone)]
pub struct FixedResolver {
    entries: HashMap<(String, String), StartPoint>,
}

impl FixedResolver {
    /// Register `start` for `postal_code` in `country`.
    #[must_use]
    pub fn with(mut self, country: &str, postal_code: &str, start: StartPoint) -> Self {
        self.entries
            .insert((country.to_owned(), postal_code.to_owned()), start);
        self
    }
}

impl PostalCodeResolver for FixedResolver {
    type Error = Infallible;

    fn resolve(&self, country: &str, postal_code: &str) -> Result<Option<StartPoint>, Self::Error> {
        Ok(self
            .entries
            .get(&(country.to_owned(), postal_code.to_owned()))
            .copied())
    }
}
